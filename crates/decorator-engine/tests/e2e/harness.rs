//! Test harness for end-to-end decoration passes
//!
//! Provides helpers for building constructs, instances and decorators, and
//! for recording the order decorators and initializers run in.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

pub use decorator_engine::{
    apply_decorators, arg, ClassDecoration, Decorated, DecorationRequest, DecoratorError,
    DecoratorResult, EngineOptions, MemberEntry, MemberInstruction, MemberKind, Object,
    PrivateImpl, PropertyDescriptor, PropertyKey, Symbol, Value,
};

/// Shared event log
pub type Log = Rc<RefCell<Vec<String>>>;

/// Create an empty log
pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Snapshot of a log
pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Decorator built from `(value, context) -> replacement`
pub fn decorator<F>(name: &str, body: F) -> Value
where
    F: Fn(&Value, &Value) -> DecoratorResult<Value> + 'static,
{
    Value::function(name, move |_, args| body(&arg(args, 0), &arg(args, 1)))
}

/// Decorator that only records `label` and returns nothing
pub fn recording(label: &str, log: &Log) -> Value {
    let label = label.to_string();
    let log = log.clone();
    decorator(&label.clone(), move |_, _| {
        log.borrow_mut().push(label.clone());
        Ok(Value::Undefined)
    })
}

/// Field decorator contributing an initializer that maps the running value
pub fn field_initializer<F>(label: &str, log: &Log, map: F) -> Value
where
    F: Fn(Value) -> Value + 'static,
{
    let label = label.to_string();
    let log = log.clone();
    let map = Rc::new(map);
    decorator(&label.clone(), move |_, _| {
        log.borrow_mut().push(format!("decorate {}", label));
        let map = map.clone();
        Ok(Value::function("init", move |_, args| Ok(map(arg(args, 0)))))
    })
}

/// String concatenation helper for initializer chains
pub fn append(value: &Value, suffix: &str) -> Value {
    Value::from(format!("{}{}", value, suffix))
}

/// Numeric payload, panicking on anything else
pub fn number(value: &Value) -> f64 {
    value
        .as_number()
        .unwrap_or_else(|| panic!("expected number, got {:?}", value))
}

/// Create a bare instance of `class`
pub fn instance_of(class: &Object) -> Value {
    class.call(&Value::Undefined, &[]).unwrap()
}

/// Prototype object of `class`
pub fn prototype_of(class: &Object) -> Object {
    class
        .get("prototype")
        .unwrap()
        .as_object()
        .cloned()
        .expect("construct has a prototype")
}

/// Install a method on the prototype of `class`
pub fn install_method<F>(class: &Object, name: &str, body: F)
where
    F: Fn(&Value, &[Value]) -> DecoratorResult<Value> + 'static,
{
    prototype_of(class)
        .define_property(name, PropertyDescriptor::method(Value::function(name, body)))
        .unwrap();
}

/// Install a getter/setter pair on `target` backed by the data property `storage`
pub fn install_accessor(target: &Object, name: &str, storage: &'static str) {
    let getter = Value::function("get", move |this, _| this.get(storage));
    let setter = Value::function("set", move |this, args| {
        this.set(storage, arg(args, 0))?;
        Ok(Value::Undefined)
    });
    target
        .define_property(name, PropertyDescriptor::accessor(Some(getter), Some(setter)))
        .unwrap();
}

/// Run a per-member initializer: `init(instance, value)`
pub fn run_init(init: &Value, instance: &Value, value: Value) -> Value {
    init.call(&Value::Undefined, &[instance.clone(), value])
        .unwrap()
}

/// Route engine logs to the test writer; filter with `RUST_LOG`
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Apply decorators, panicking on failure
pub fn apply(request: DecorationRequest) -> Decorated {
    init_logging();
    apply_decorators(request).unwrap()
}

/// Apply decorators, expecting failure
pub fn apply_err(request: DecorationRequest) -> DecoratorError {
    init_logging();
    match apply_decorators(request) {
        Ok(_) => panic!("expected decoration to fail"),
        Err(err) => err,
    }
}

/// Read a string property of a context object
pub fn ctx_str(context: &Value, key: &str) -> String {
    context.get(key).unwrap().to_string()
}

/// Private slot emulation: storage under a fresh symbol, brand by presence
pub struct PrivateSlot {
    pub key: Symbol,
}

impl PrivateSlot {
    pub fn new(name: &str) -> Self {
        Self {
            key: Symbol::new(name),
        }
    }

    /// Give `instance` the private slot with an initial value
    pub fn install(&self, instance: &Value, value: Value) {
        instance
            .as_object()
            .unwrap()
            .define_property(self.key.clone(), PropertyDescriptor::data(value))
            .unwrap();
    }

    /// Read the slot directly
    pub fn read(&self, instance: &Value) -> Value {
        instance
            .as_object()
            .unwrap()
            .get_own_property(&PropertyKey::from(self.key.clone()))
            .and_then(|descriptor| descriptor.value)
            .unwrap_or_default()
    }

    /// `(target) -> value`
    pub fn getter(&self) -> Value {
        let key = self.key.clone();
        Value::function("getSlot", move |_, args| arg(args, 0).get(key.clone()))
    }

    /// `(target, value)`
    pub fn setter(&self) -> Value {
        let key = self.key.clone();
        Value::function("setSlot", move |_, args| {
            arg(args, 0).set(key.clone(), arg(args, 1))?;
            Ok(Value::Undefined)
        })
    }

    /// Brand check: does the candidate carry the slot?
    pub fn brand(&self) -> impl Fn(&Value) -> DecoratorResult<bool> + 'static {
        let key = PropertyKey::from(self.key.clone());
        move |candidate: &Value| match candidate {
            Value::Object(object) => Ok(object.get_own_property(&key).is_some()),
            other => Err(DecoratorError::TypeMismatch(format!(
                "right-hand side of 'in' should be an object, got {}",
                other.type_of()
            ))),
        }
    }
}

/// Contexts seen by [`capturing`] decorators
pub type Captured = Rc<RefCell<Vec<Value>>>;

/// Create an empty capture list
pub fn captured() -> Captured {
    Rc::new(RefCell::new(Vec::new()))
}

/// Decorator that stores its context and returns nothing
pub fn capturing(captured: &Captured) -> Value {
    let captured = captured.clone();
    decorator("capture", move |_, context| {
        captured.borrow_mut().push(context.clone());
        Ok(Value::Undefined)
    })
}

/// First captured context
pub fn first(captured: &Captured) -> Value {
    captured.borrow()[0].clone()
}

/// Call `context.access[member](args...)`
pub fn access_call(context: &Value, member: &str, args: &[Value]) -> DecoratorResult<Value> {
    let access = context.get("access")?;
    access.get(member)?.call(&access, args)
}
