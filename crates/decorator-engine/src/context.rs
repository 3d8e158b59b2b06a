//! Decoration contexts
//!
//! Every decorator receives a context object describing what it decorates:
//! `kind`, `name`, `static`, `private`, `metadata`, and depending on the
//! kind `addInitializer` and an `access` capability.
//!
//! `addInitializer` is only valid while its decorator call is running.
//! Each call gets a fresh [`FinishedFlag`]; the flag is flipped by a drop
//! guard so a decorator that fails still disables it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::error::DecoratorResult;
use crate::guards::{assert_callable, assert_instance_if_private, assert_not_finished, BrandCheck};
use crate::instruction::MemberKind;
use crate::value::{arg, Object, PropertyDescriptor, Value};

/// Tracks whether one decoration unit has finished
#[derive(Debug, Clone, Default)]
pub struct FinishedFlag(Rc<Cell<bool>>);

impl FinishedFlag {
    /// Create an unfinished flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the unit finished
    pub fn finish(&self) {
        self.0.set(true);
    }

    /// Check if the unit has finished
    pub fn is_finished(&self) -> bool {
        self.0.get()
    }

    /// Guard that finishes the unit when dropped
    pub(crate) fn guard(&self) -> FinishGuard {
        FinishGuard(self.clone())
    }
}

/// Finishes its flag on drop, whether the decorator returned or failed
pub(crate) struct FinishGuard(FinishedFlag);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Ordered list of initializers registered through `addInitializer`
#[derive(Debug, Clone, Default)]
pub struct Initializers(Rc<RefCell<Vec<Value>>>);

impl Initializers {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an initializer
    pub fn push(&self, initializer: Value) {
        self.0.borrow_mut().push(initializer);
    }

    /// Number of registered initializers
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Check if nothing was registered
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Registered initializers in registration order
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Run every initializer in registration order with `receiver` as `this`
    pub fn run_all(&self, receiver: &Value) -> DecoratorResult<()> {
        for initializer in self.snapshot() {
            trace!("running registered initializer");
            initializer.call(receiver, &[])?;
        }
        Ok(())
    }
}

/// Build the `addInitializer` function for one decorator call
fn add_initializer(initializers: &Initializers, flag: &FinishedFlag) -> Value {
    let initializers = initializers.clone();
    let flag = flag.clone();
    Value::function("addInitializer", move |_, args| {
        assert_not_finished(&flag, "addInitializer")?;
        let initializer = arg(args, 0);
        assert_callable(&initializer, "An initializer")?;
        initializers.push(initializer);
        Ok(Value::Undefined)
    })
}

/// Context handed to a class decorator
pub(crate) fn class_context(
    name: Value,
    metadata: &Object,
    initializers: &Initializers,
    flag: &FinishedFlag,
) -> DecoratorResult<Value> {
    let context = Object::new();
    context.set("kind", Value::from("class"))?;
    context.set("name", name)?;
    context.set("addInitializer", add_initializer(initializers, flag))?;
    context.set("metadata", Value::Object(metadata.clone()))?;
    Ok(Value::Object(context))
}

/// Descriptor shared between the member pipeline and the access
/// capabilities it hands out; capabilities read the final implementation
/// once decoration has written it back.
pub(crate) type SharedDescriptor = Rc<RefCell<PropertyDescriptor>>;

/// Everything needed to build contexts for one member decoration site
pub(crate) struct MemberSite {
    pub name: Rc<str>,
    pub kind: MemberKind,
    pub is_static: bool,
    pub is_private: bool,
    pub descriptor: SharedDescriptor,
    pub brand: BrandCheck,
    pub metadata: Object,
    pub initializers: Option<Initializers>,
}

impl MemberSite {
    /// Context for one decorator call
    pub(crate) fn context(&self, flag: &FinishedFlag) -> DecoratorResult<Value> {
        let context = Object::new();
        let name = if self.is_private {
            Value::from(format!("#{}", self.name))
        } else {
            Value::from(self.name.clone())
        };
        context.set("kind", Value::from(self.kind.as_str()))?;
        context.set("name", name)?;
        context.set("static", Value::from(self.is_static))?;
        context.set("private", Value::from(self.is_private))?;
        context.set("metadata", Value::Object(self.metadata.clone()))?;
        if self.kind != MemberKind::Field {
            if let Some(initializers) = &self.initializers {
                context.set("addInitializer", add_initializer(initializers, flag))?;
            }
        }
        context.set("access", self.access()?)?;
        Ok(Value::Object(context))
    }

    /// `{get?, set?, has}` capability for this member
    fn access(&self) -> DecoratorResult<Value> {
        let (get, set) = match (self.is_private, self.kind) {
            (false, MemberKind::Field | MemberKind::Method) => {
                let name = self.name.clone();
                let get = Value::function("get", move |_, args| arg(args, 0).get(&name));
                let set = (self.kind == MemberKind::Field).then(|| {
                    let name = self.name.clone();
                    Value::function("set", move |_, args| {
                        arg(args, 0).set(&name, arg(args, 1))?;
                        Ok(Value::Undefined)
                    })
                });
                (Some(get), set)
            }
            (true, MemberKind::Method) => {
                let brand = self.brand.clone();
                let descriptor = self.descriptor.clone();
                let get = Value::function("get", move |_, args| {
                    assert_instance_if_private(&brand, &arg(args, 0))?;
                    Ok(descriptor.borrow().value.clone().unwrap_or_default())
                });
                (Some(get), None)
            }
            (_, kind) => {
                let paired = matches!(kind, MemberKind::Field | MemberKind::Accessor);
                let get = (paired || kind == MemberKind::Getter).then(|| self.descriptor_getter());
                let set = (paired || kind == MemberKind::Setter).then(|| self.descriptor_setter());
                (get, set)
            }
        };

        let has = if self.is_private {
            let brand = self.brand.clone();
            Value::function("has", move |_, args| Ok(Value::from(brand(&arg(args, 0))?)))
        } else {
            let name = self.name.clone();
            Value::function("has", move |_, args| Ok(Value::from(arg(args, 0).has(&name)?)))
        };

        let access = Object::new();
        if let Some(get) = get {
            access.set("get", get)?;
        }
        if let Some(set) = set {
            access.set("set", set)?;
        }
        access.set("has", has)?;
        Ok(Value::Object(access))
    }

    fn private_brand(&self) -> Option<BrandCheck> {
        self.is_private.then(|| self.brand.clone())
    }

    fn descriptor_getter(&self) -> Value {
        let brand = self.private_brand();
        let descriptor = self.descriptor.clone();
        Value::function("get", move |_, args| {
            let target = arg(args, 0);
            if let Some(brand) = &brand {
                assert_instance_if_private(brand, &target)?;
            }
            let getter = descriptor.borrow().get.clone().unwrap_or_default();
            getter.call(&target, &[])
        })
    }

    fn descriptor_setter(&self) -> Value {
        let brand = self.private_brand();
        let descriptor = self.descriptor.clone();
        Value::function("set", move |_, args| {
            let target = arg(args, 0);
            if let Some(brand) = &brand {
                assert_instance_if_private(brand, &target)?;
            }
            let setter = descriptor.borrow().set.clone().unwrap_or_default();
            setter.call(&target, &[arg(args, 1)])?;
            Ok(Value::Undefined)
        })
    }
}
