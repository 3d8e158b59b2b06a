//! Metadata propagation tests

use super::harness::*;

fn tagging(key: &'static str, value: &'static str) -> Value {
    decorator("tag", move |_, context| {
        context.get("metadata")?.set(key, Value::from(value))?;
        Ok(Value::Undefined)
    })
}

fn reading(key: &'static str, log: &Log) -> Value {
    let log = log.clone();
    decorator("read", move |_, context| {
        let seen = context.get("metadata")?.get(key)?;
        log.borrow_mut().push(seen.to_string());
        Ok(Value::Undefined)
    })
}

#[test]
fn test_contexts_share_one_carrier() {
    let log = log();
    let class = Object::class("Shared");
    let decorated = apply(
        DecorationRequest::new(Value::Object(class.clone()))
            .member(MemberInstruction::new(MemberKind::Field, "a", tagging("role", "model")))
            .member(MemberInstruction::new(MemberKind::Field, "b", reading("role", &log)))
            .class_decorator(reading("role", &log)),
    );
    decorated.class().unwrap();

    assert_eq!(entries(&log), vec!["model", "model"]);
    assert_eq!(decorated.metadata().get("role").unwrap(), Value::from("model"));
}

#[test]
fn test_child_carrier_falls_through_to_parent() {
    let parent = Object::class("Base");
    apply(
        DecorationRequest::new(Value::Object(parent.clone()))
            .member(MemberInstruction::new(MemberKind::Field, "id", tagging("table", "bases"))),
    );

    let log = log();
    let child = Object::class("Derived");
    let decorated = apply(
        DecorationRequest::new(Value::Object(child))
            .member(MemberInstruction::new(MemberKind::Field, "name", reading("table", &log)))
            .parent(Value::Object(parent.clone())),
    );

    assert_eq!(entries(&log), vec!["bases"]);
    let parent_carrier = parent
        .get(Symbol::metadata())
        .unwrap()
        .as_object()
        .cloned()
        .unwrap();
    assert!(decorated.metadata().prototype().unwrap().ptr_eq(&parent_carrier));
    assert!(decorated
        .metadata()
        .get_own_property(&PropertyKey::from("table"))
        .is_none());
}

#[test]
fn test_carrier_without_parent_never_falls_through() {
    let log = log();
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Root")))
            .member(MemberInstruction::new(MemberKind::Field, "id", reading("table", &log))),
    );
    assert_eq!(entries(&log), vec!["undefined"]);
    assert!(decorated.metadata().prototype().is_none());
}

#[test]
fn test_parent_without_metadata_gives_root_carrier() {
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Child")))
            .parent(Value::Object(Object::class("Undecorated"))),
    );
    assert!(decorated.metadata().prototype().is_none());
}

#[test]
fn test_child_writes_shadow_parent() {
    let parent = Object::class("Base");
    apply(
        DecorationRequest::new(Value::Object(parent.clone()))
            .member(MemberInstruction::new(MemberKind::Field, "id", tagging("table", "bases"))),
    );
    let decorated = apply(
        DecorationRequest::new(Value::Object(Object::class("Derived")))
            .member(MemberInstruction::new(MemberKind::Field, "id", tagging("table", "derived")))
            .parent(Value::Object(parent.clone())),
    );

    assert_eq!(decorated.metadata().get("table").unwrap(), Value::from("derived"));
    let parent_carrier = parent.get(Symbol::metadata()).unwrap();
    assert_eq!(parent_carrier.get("table").unwrap(), Value::from("bases"));
}

#[test]
fn test_legacy_metadata_key() {
    let class = Object::class("Legacy");
    let options = EngineOptions::default().with_native_metadata_symbol(false);
    let decorated = apply(DecorationRequest::new(Value::Object(class.clone())).options(options));

    let legacy = PropertyKey::from(Symbol::for_key("Symbol.metadata"));
    assert_eq!(
        class.get(legacy).unwrap(),
        Value::Object(decorated.metadata().clone())
    );
    assert!(class.get(Symbol::metadata()).unwrap().is_undefined());
}

#[test]
fn test_legacy_key_inheritance() {
    let options = EngineOptions::default().with_native_metadata_symbol(false);
    let parent = Object::class("LegacyBase");
    apply(
        DecorationRequest::new(Value::Object(parent.clone()))
            .member(MemberInstruction::new(MemberKind::Field, "id", tagging("table", "legacy")))
            .options(options.clone()),
    );

    let log = log();
    apply(
        DecorationRequest::new(Value::Object(Object::class("LegacyChild")))
            .member(MemberInstruction::new(MemberKind::Field, "id", reading("table", &log)))
            .parent(Value::Object(parent))
            .options(options),
    );
    assert_eq!(entries(&log), vec!["legacy"]);
}
