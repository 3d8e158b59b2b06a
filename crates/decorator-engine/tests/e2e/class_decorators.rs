//! Class decoration tests

use std::cell::Cell;
use std::rc::Rc;

use super::harness::*;

fn metadata_key() -> PropertyKey {
    PropertyKey::from(Symbol::metadata())
}

/// Decorator replacing the construct with a fresh one named `wrapper`
fn replacing(wrapper: &'static str, log: &Log) -> Value {
    let log = log.clone();
    decorator(wrapper, move |current, _| {
        let received = current.as_object().and_then(Object::name).unwrap_or_default();
        log.borrow_mut().push(format!("{} received {}", wrapper, received));
        Ok(Value::Object(Object::class(wrapper)))
    })
}

#[test]
fn test_class_decorators_replace_in_order() {
    let log = log();
    let class = Object::class("Widget");
    let decorated = apply(
        DecorationRequest::new(Value::Object(class.clone()))
            .class_decorator(replacing("W2", &log))
            .class_decorator(replacing("W1", &log)),
    );

    assert!(entries(&log).is_empty());
    let outcome = decorated.class().unwrap().unwrap();
    assert_eq!(entries(&log), vec!["W1 received Widget", "W2 received W1"]);
    assert_eq!(outcome.class.as_object().unwrap().name().as_deref(), Some("W2"));

    // metadata lands on the final construct only
    let carrier = outcome.class.get(metadata_key()).unwrap();
    assert_eq!(carrier, Value::Object(decorated.metadata().clone()));
    assert!(class.get_own_property(&metadata_key()).is_none());
}

#[test]
fn test_class_context_keeps_original_name() {
    let captured = captured();
    let log = log();
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Original")))
            .class_decorators(vec![capturing(&captured), replacing("Wrapper", &log)], false),
    );
    decorated.class().unwrap();

    let context = first(&captured);
    assert_eq!(ctx_str(&context, "kind"), "class");
    assert_eq!(ctx_str(&context, "name"), "Original");
    assert!(context.get("access").unwrap().is_undefined());
}

#[test]
fn test_decorator_returning_nothing_keeps_construct() {
    let log = log();
    let class = Object::class("Stable");
    let decorated = apply(
        DecorationRequest::new(Value::Object(class.clone())).class_decorator(recording("noop", &log)),
    );

    let outcome = decorated.class().unwrap().unwrap();
    assert_eq!(outcome.class, Value::Object(class.clone()));
    assert!(class.get_own_property(&metadata_key()).is_some());
}

#[test]
fn test_class_decoration_is_deferred_and_memoized() {
    let calls = Rc::new(Cell::new(0));
    let counted = calls.clone();
    let counting = decorator("counting", move |_, _| {
        counted.set(counted.get() + 1);
        Ok(Value::Undefined)
    });
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Lazy"))).class_decorator(counting),
    );

    assert_eq!(calls.get(), 0);
    let first_read = decorated.class().unwrap().unwrap();
    let second_read = decorated.class().unwrap().unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(first_read.class, second_read.class);
}

#[test]
fn test_no_class_decorators_attaches_metadata_eagerly() {
    let class = Object::class("Bare");
    let decorated = apply(DecorationRequest::new(Value::Object(class.clone())));

    assert!(decorated.class().unwrap().is_none());
    let descriptor = class.get_own_property(&metadata_key()).unwrap();
    assert_eq!(descriptor.value, Some(Value::Object(decorated.metadata().clone())));
    assert!(!descriptor.writable);
}

#[test]
fn test_class_initializers_run_against_final_construct() {
    let log = log();
    let registering = |label: &'static str| {
        let log = log.clone();
        decorator(label, move |_, context| {
            let log = log.clone();
            context.get("addInitializer")?.call(
                &Value::Undefined,
                &[Value::function("init", move |this, _| {
                    log.borrow_mut().push(format!("{} on {}", label, this.get("name")?));
                    Ok(Value::Undefined)
                })],
            )?;
            Ok(Value::Undefined)
        })
    };
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Service")))
            .class_decorators(
                vec![registering("outer"), replacing("Proxy", &log), registering("inner")],
                false,
            ),
    );

    let outcome = decorated.class().unwrap().unwrap();
    assert_eq!(entries(&log), vec!["Proxy received Service"]);
    outcome.initialize().unwrap();
    assert_eq!(
        entries(&log),
        vec!["Proxy received Service", "inner on Proxy", "outer on Proxy"]
    );
}

#[test]
fn test_class_add_initializer_after_return_fails() {
    let stash = captured();
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Late"))).class_decorator(capturing(&stash)),
    );
    decorated.class().unwrap();

    let add = first(&stash).get("addInitializer").unwrap();
    assert_eq!(
        add.call(&Value::Undefined, &[Value::function("cb", |_, _| Ok(Value::Undefined))]),
        Err(DecoratorError::LifecycleViolation("addInitializer".to_string()))
    );
}

#[test]
fn test_class_decorator_returning_non_function_fails() {
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Odd")))
            .class_decorator(decorator("bad", |_, _| Ok(Value::from("nope")))),
    );
    assert_eq!(
        decorated.class().unwrap_err(),
        DecoratorError::TypeMismatch("class decorators must return a function or void 0".to_string())
    );
}

#[test]
fn test_failed_class_decoration_is_not_cached() {
    let attempts = Rc::new(Cell::new(0));
    let counted = attempts.clone();
    let flaky = decorator("flaky", move |_, _| {
        counted.set(counted.get() + 1);
        if counted.get() == 1 {
            Err(DecoratorError::runtime("not yet"))
        } else {
            Ok(Value::Undefined)
        }
    });
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Flaky"))).class_decorator(flaky),
    );

    assert!(decorated.class().is_err());
    assert!(decorated.class().unwrap().is_some());
    assert_eq!(attempts.get(), 2);
}

#[test]
fn test_class_decorators_with_bound_receivers() {
    let receiver = Value::Object(Object::new());
    receiver.set("prefix", Value::from("Bound")).unwrap();
    let renaming = Value::function("renaming", |this, _| {
        Ok(Value::Object(Object::class(&this.get("prefix")?.to_string())))
    });
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Plain")))
            .class_decorators(vec![receiver, renaming], true),
    );

    let outcome = decorated.class().unwrap().unwrap();
    assert_eq!(outcome.class.as_object().unwrap().name().as_deref(), Some("Bound"));
}

#[test]
fn test_member_initializers_bound_before_class_decoration() {
    let log = log();
    let class = Object::class("Ordered");
    let decorated = apply(
        DecorationRequest::new(Value::Object(class))
            .member(MemberInstruction::new(MemberKind::Field, "x", recording("member", &log)))
            .class_decorator(recording("class", &log)),
    );
    assert_eq!(entries(&log), vec!["member"]);
    assert_eq!(decorated.elements().len(), 1);
    decorated.class().unwrap();
    assert_eq!(entries(&log), vec!["member", "class"]);
}

#[test]
fn test_non_object_target_rejected() {
    let err = apply_err(DecorationRequest::new(Value::from(1)));
    assert!(matches!(err, DecoratorError::TypeMismatch(_)));
}
