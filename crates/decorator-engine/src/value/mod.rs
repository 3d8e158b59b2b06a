//! Dynamic value model
//!
//! The engine operates on host values: constructs, prototypes, instances,
//! decorators and initializers are all [`Value`]s. Property installation
//! goes through explicit [`PropertyDescriptor`] tables rather than any
//! reflection API, so the surrounding runtime decides how descriptors are
//! materialised.

mod object;
mod symbol;

use std::fmt;
use std::rc::Rc;

pub use object::{NativeFn, Object, PropertyDescriptor};
pub use symbol::{Symbol, METADATA_SYMBOL_DESCRIPTION};

use crate::error::{DecoratorError, DecoratorResult};

/// Property key: a string name or a symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// String-named property
    String(Rc<str>),
    /// Symbol-keyed property
    Symbol(Symbol),
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::String(Rc::from(name))
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::String(Rc::from(name))
    }
}

impl From<Rc<str>> for PropertyKey {
    fn from(name: Rc<str>) -> Self {
        PropertyKey::String(name)
    }
}

impl From<&Rc<str>> for PropertyKey {
    fn from(name: &Rc<str>) -> Self {
        PropertyKey::String(name.clone())
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        PropertyKey::Symbol(symbol)
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(key: &PropertyKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(name) => f.write_str(name),
            PropertyKey::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// A host value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// `undefined` (also "no value" / void)
    #[default]
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// String
    String(Rc<str>),
    /// Symbol
    Symbol(Symbol),
    /// Object or function
    Object(Object),
}

impl Value {
    /// Create a native function value
    pub fn function<F>(name: &str, body: F) -> Value
    where
        F: Fn(&Value, &[Value]) -> DecoratorResult<Value> + 'static,
    {
        Value::Object(Object::function(name, body))
    }

    /// Check for `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check for `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Check if the value can be invoked
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Object(object) if object.is_callable())
    }

    /// Get the object handle
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Get the number payload
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Host `typeof` classification
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(object) if object.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }

    /// Read a property
    ///
    /// Reading from `undefined`/`null` fails; other primitives carry no
    /// properties and yield `undefined`.
    pub fn get(&self, key: impl Into<PropertyKey>) -> DecoratorResult<Value> {
        let key = key.into();
        match self {
            Value::Object(object) => object.get_with_receiver(&key, self),
            Value::Undefined | Value::Null => Err(DecoratorError::type_mismatch(format!(
                "Cannot read properties of {} (reading '{}')",
                self, key
            ))),
            _ => Ok(Value::Undefined),
        }
    }

    /// Assign a property
    ///
    /// Assigning on `undefined`/`null` fails; assignments to other
    /// primitives are dropped.
    pub fn set(&self, key: impl Into<PropertyKey>, value: Value) -> DecoratorResult<()> {
        let key = key.into();
        match self {
            Value::Object(object) => object.set(key, value),
            Value::Undefined | Value::Null => Err(DecoratorError::type_mismatch(format!(
                "Cannot set properties of {} (setting '{}')",
                self, key
            ))),
            _ => Ok(()),
        }
    }

    /// `key in value`; only objects can be searched
    pub fn has(&self, key: impl Into<PropertyKey>) -> DecoratorResult<bool> {
        let key = key.into();
        match self {
            Value::Object(object) => Ok(object.has(&key)),
            _ => Err(DecoratorError::type_mismatch(format!(
                "Cannot use 'in' operator to search for '{}' in {}",
                key, self
            ))),
        }
    }

    /// Invoke the value with `this` and `args`
    pub fn call(&self, this: &Value, args: &[Value]) -> DecoratorResult<Value> {
        match self {
            Value::Object(object) if object.is_callable() => object.call(this, args),
            _ => Err(DecoratorError::type_mismatch(format!(
                "{} is not a function",
                self
            ))),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Symbol(symbol) => write!(f, "{}", symbol),
            Value::Object(object) => write!(f, "{:?}", object),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Rc<str>> for Value {
    fn from(s: Rc<str>) -> Self {
        Value::String(s)
    }
}

impl From<Symbol> for Value {
    fn from(symbol: Symbol) -> Self {
        Value::Symbol(symbol)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

/// Positional argument, `undefined` when absent
pub fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}
