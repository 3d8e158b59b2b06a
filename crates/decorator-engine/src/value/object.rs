//! Object model
//!
//! Objects are shared handles over a descriptor table plus an optional
//! prototype (the delegation target for failed lookups) and an optional
//! native call slot. Callable objects are functions; a construct is a
//! callable object carrying a `prototype` object and a `name`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{PropertyKey, Value};
use crate::error::{DecoratorError, DecoratorResult};

/// Native function body: `(this, args) -> result`
pub type NativeFn = dyn Fn(&Value, &[Value]) -> DecoratorResult<Value>;

/// Property descriptor
///
/// A descriptor is an accessor descriptor when it carries a getter or a
/// setter, a data descriptor otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    /// Stored value (data descriptors)
    pub value: Option<Value>,
    /// Getter (accessor descriptors)
    pub get: Option<Value>,
    /// Setter (accessor descriptors)
    pub set: Option<Value>,
    /// Whether assignment may replace the value
    pub writable: bool,
    /// Whether the property shows up in enumeration
    pub enumerable: bool,
    /// Whether the property may be redefined
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// Data property as created by plain assignment
    pub fn data(value: Value) -> Self {
        Self {
            value: Some(value),
            get: None,
            set: None,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Data property as created by a method definition
    pub fn method(value: Value) -> Self {
        Self {
            enumerable: false,
            ..Self::data(value)
        }
    }

    /// Accessor property as created by a getter/setter definition
    pub fn accessor(get: Option<Value>, set: Option<Value>) -> Self {
        Self {
            value: None,
            get,
            set,
            writable: false,
            enumerable: false,
            configurable: true,
        }
    }

    /// Set writability
    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Set enumerability
    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    /// Set configurability
    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    /// Check if this is an accessor descriptor
    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }
}

#[derive(Default)]
struct ObjectData {
    properties: FxHashMap<PropertyKey, PropertyDescriptor>,
    /// Insertion order of `properties`
    keys: Vec<PropertyKey>,
    prototype: Option<Object>,
    call: Option<Rc<NativeFn>>,
}

/// Shared handle to a heap object
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl Object {
    /// Create an empty object with no prototype
    pub fn new() -> Self {
        Self::with_prototype(None)
    }

    /// Create an empty object delegating failed lookups to `prototype`
    pub fn with_prototype(prototype: Option<Object>) -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            prototype,
            ..ObjectData::default()
        })))
    }

    /// Create a native function object
    pub fn function<F>(name: &str, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> DecoratorResult<Value> + 'static,
    {
        let object = Self::new();
        object.0.borrow_mut().call = Some(Rc::new(body));
        object.insert(
            PropertyKey::from("name"),
            PropertyDescriptor::data(Value::from(name))
                .writable(false)
                .enumerable(false),
        );
        object
    }

    /// Create a construct: a callable object with a `prototype` object.
    ///
    /// Calling the construct produces a bare instance of it.
    pub fn class(name: &str) -> Self {
        let prototype = Object::new();
        let instance_prototype = prototype.clone();
        let class = Self::function(name, move |_, _| {
            Ok(Value::Object(Object::with_prototype(Some(
                instance_prototype.clone(),
            ))))
        });
        class.insert(
            PropertyKey::from("prototype"),
            PropertyDescriptor::data(Value::Object(prototype))
                .enumerable(false)
                .configurable(false),
        );
        class
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Check if the object is a function
    pub fn is_callable(&self) -> bool {
        self.0.borrow().call.is_some()
    }

    /// Get the delegation target
    pub fn prototype(&self) -> Option<Object> {
        self.0.borrow().prototype.clone()
    }

    /// Replace the delegation target
    pub fn set_prototype(&self, prototype: Option<Object>) {
        self.0.borrow_mut().prototype = prototype;
    }

    /// Own property keys in insertion order
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.0.borrow().keys.clone()
    }

    /// Get an own property descriptor
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.0.borrow().properties.get(key).cloned()
    }

    /// Define (or redefine) an own property
    ///
    /// Redefining a non-configurable property fails, as does a descriptor
    /// mixing accessors with a value or writability.
    pub fn define_property(
        &self,
        key: impl Into<PropertyKey>,
        descriptor: PropertyDescriptor,
    ) -> DecoratorResult<()> {
        if descriptor.is_accessor() && (descriptor.value.is_some() || descriptor.writable) {
            return Err(DecoratorError::type_mismatch(
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            ));
        }
        let key = key.into();
        if let Some(existing) = self.0.borrow().properties.get(&key) {
            if !existing.configurable {
                return Err(DecoratorError::type_mismatch(format!(
                    "Cannot redefine property: {}",
                    key
                )));
            }
        }
        self.insert(key, descriptor);
        Ok(())
    }

    fn insert(&self, key: PropertyKey, descriptor: PropertyDescriptor) {
        let mut data = self.0.borrow_mut();
        if data.properties.insert(key.clone(), descriptor).is_none() {
            data.keys.push(key);
        }
    }

    /// Walk the prototype chain for `key`
    fn find_property(&self, key: &PropertyKey) -> Option<(PropertyDescriptor, bool)> {
        let mut current = Some(self.clone());
        let mut own = true;
        while let Some(object) = current {
            let next = {
                let data = object.0.borrow();
                if let Some(descriptor) = data.properties.get(key) {
                    return Some((descriptor.clone(), own));
                }
                data.prototype.clone()
            };
            current = next;
            own = false;
        }
        None
    }

    /// `key in object`
    pub fn has(&self, key: &PropertyKey) -> bool {
        self.find_property(key).is_some()
    }

    /// Read a property, invoking getters with this object as receiver
    pub fn get(&self, key: impl Into<PropertyKey>) -> DecoratorResult<Value> {
        self.get_with_receiver(&key.into(), &Value::Object(self.clone()))
    }

    /// Read a property, invoking getters with `receiver`
    pub fn get_with_receiver(&self, key: &PropertyKey, receiver: &Value) -> DecoratorResult<Value> {
        match self.find_property(key) {
            None => Ok(Value::Undefined),
            Some((descriptor, _)) if descriptor.is_accessor() => match descriptor.get {
                Some(getter) => getter.call(receiver, &[]),
                None => Ok(Value::Undefined),
            },
            Some((descriptor, _)) => Ok(descriptor.value.unwrap_or_default()),
        }
    }

    /// Assign a property
    ///
    /// Inherited or own setters are invoked with this object as receiver;
    /// otherwise an own data property is created or overwritten.
    pub fn set(&self, key: impl Into<PropertyKey>, value: Value) -> DecoratorResult<()> {
        let key = key.into();
        match self.find_property(&key) {
            Some((descriptor, _)) if descriptor.is_accessor() => match descriptor.set {
                Some(setter) => {
                    setter.call(&Value::Object(self.clone()), &[value])?;
                    Ok(())
                }
                None => Err(DecoratorError::type_mismatch(format!(
                    "Cannot set property {} of object which has only a getter",
                    key
                ))),
            },
            Some((descriptor, _)) if !descriptor.writable => Err(DecoratorError::type_mismatch(
                format!("Cannot assign to read only property '{}' of object", key),
            )),
            Some((descriptor, true)) => {
                self.insert(
                    key,
                    PropertyDescriptor {
                        value: Some(value),
                        ..descriptor
                    },
                );
                Ok(())
            }
            _ => {
                self.insert(key, PropertyDescriptor::data(value));
                Ok(())
            }
        }
    }

    /// Invoke the object as a function
    pub fn call(&self, this: &Value, args: &[Value]) -> DecoratorResult<Value> {
        let body = self.0.borrow().call.clone();
        match body {
            Some(body) => body(this, args),
            None => Err(DecoratorError::type_mismatch("object is not a function")),
        }
    }

    /// The `name` property, when it is a string
    pub fn name(&self) -> Option<String> {
        self.get_own_property(&PropertyKey::from("name"))
            .and_then(|descriptor| descriptor.value)
            .and_then(|value| value.as_str().map(str::to_string))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(data) = self.0.try_borrow() else {
            return f.write_str("[object <borrowed>]");
        };
        if data.call.is_some() {
            drop(data);
            match self.name() {
                Some(name) if !name.is_empty() => write!(f, "[Function: {}]", name),
                _ => f.write_str("[Function (anonymous)]"),
            }
        } else {
            write!(f, "[object {{{} properties}}]", data.keys.len())
        }
    }
}
