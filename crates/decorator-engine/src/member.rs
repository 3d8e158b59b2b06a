//! Member decoration
//!
//! Applies the decorator chain of one member instruction:
//!
//! 1. Synthesize the starting descriptor (from the private implementations,
//!    or from the construct's own property for public non-fields).
//! 2. Invoke decorators last-to-first; each sees the previous replacement.
//! 3. Collect initializer contributions (field return values, accessor
//!    `init`s) and compose them into one per-member initializer.
//! 4. Write the final implementation back: onto the shared results list
//!    for private members, through `define_property` for public ones.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::context::{FinishedFlag, Initializers, MemberSite, SharedDescriptor};
use crate::error::{DecoratorError, DecoratorResult};
use crate::guards::{assert_valid_return_value, BrandCheck, DecorationTarget};
use crate::instruction::{application_order, DecoratorCall, MemberInstruction, MemberKind, PrivateImpl};
use crate::value::{arg, Object, PropertyDescriptor, PropertyKey, Value};

/// Where one member is decorated
pub(crate) struct MemberScope<'a> {
    /// Object receiving public implementations (construct or its prototype)
    pub base: &'a Object,
    /// Scope-wide list fed by `addInitializer`; absent for fields
    pub initializers: Option<&'a Initializers>,
    /// Brand check for private access
    pub brand: &'a BrandCheck,
    /// Metadata carrier of the pass
    pub metadata: &'a Object,
}

/// Implementation threaded through the decorator chain
enum Current {
    /// Fields have no implementation; decorators only add initializers
    Field,
    /// Accessor-kind pair
    Accessor { get: Value, set: Value },
    /// Method, getter or setter function
    Function(Value),
}

impl Current {
    fn initial(kind: MemberKind, descriptor: &PropertyDescriptor) -> Self {
        let field = |value: &Option<Value>| value.clone().unwrap_or_default();
        match kind {
            MemberKind::Field => Current::Field,
            MemberKind::Accessor => Current::Accessor {
                get: field(&descriptor.get),
                set: field(&descriptor.set),
            },
            MemberKind::Method => Current::Function(field(&descriptor.value)),
            MemberKind::Getter => Current::Function(field(&descriptor.get)),
            MemberKind::Setter => Current::Function(field(&descriptor.set)),
        }
    }

    /// Value handed to the next decorator
    fn to_value(&self) -> DecoratorResult<Value> {
        match self {
            Current::Field => Ok(Value::Undefined),
            Current::Accessor { get, set } => {
                let pair = Object::new();
                pair.set("get", get.clone())?;
                pair.set("set", set.clone())?;
                Ok(Value::Object(pair))
            }
            Current::Function(function) => Ok(function.clone()),
        }
    }
}

/// Decorate one member, appending its artifacts to `results`
pub(crate) fn apply_member_decorator(
    results: &mut Vec<Value>,
    instruction: &MemberInstruction,
    scope: &MemberScope<'_>,
) -> DecoratorResult<()> {
    instruction.validate()?;
    let kind = instruction.kind();
    let key = PropertyKey::from(&instruction.name);

    let descriptor: SharedDescriptor =
        Rc::new(RefCell::new(starting_descriptor(instruction, scope.base, &key)?));
    let site = MemberSite {
        name: instruction.name.clone(),
        kind,
        is_static: instruction.flags.is_static,
        is_private: instruction.is_private(),
        descriptor: descriptor.clone(),
        brand: scope.brand.clone(),
        metadata: scope.metadata.clone(),
        initializers: scope.initializers.cloned(),
    };

    let mut current = Current::initial(kind, &descriptor.borrow());
    let mut contributions = Vec::new();
    let calls = application_order(
        &instruction.decorators.to_vec(),
        instruction.flags.has_bound_receiver,
    );

    for call in &calls {
        let replacement = invoke_decorator(call, &site, current.to_value()?)?;
        if replacement.is_undefined() {
            continue;
        }
        assert_valid_return_value(DecorationTarget::Member(kind), &replacement)?;

        match &mut current {
            Current::Field => contributions.push(replacement),
            Current::Accessor { get, set } => {
                let init = replacement.get("init")?;
                let new_get = replacement.get("get")?;
                let new_set = replacement.get("set")?;
                if !new_get.is_undefined() {
                    *get = new_get;
                }
                if !new_set.is_undefined() {
                    *set = new_set;
                }
                if !init.is_undefined() {
                    contributions.push(init);
                }
            }
            Current::Function(function) => *function = replacement,
        }
    }

    if kind.has_initializer() {
        results.push(compose_initializers(contributions));
    }
    if kind == MemberKind::Field {
        return Ok(());
    }

    write_back(&mut descriptor.borrow_mut(), kind, &current);
    if instruction.is_private() {
        push_private_implementation(results, kind, &current);
        Ok(())
    } else {
        let final_descriptor = descriptor.borrow().clone();
        scope.base.define_property(key, final_descriptor)
    }
}

/// Descriptor the decorator chain starts from
fn starting_descriptor(
    instruction: &MemberInstruction,
    base: &Object,
    key: &PropertyKey,
) -> DecoratorResult<PropertyDescriptor> {
    let kind = instruction.kind();
    match &instruction.private {
        Some(PrivateImpl::Slot { get, set }) => Ok(PropertyDescriptor::accessor(
            Some(receiver_getter(get.clone())),
            Some(receiver_setter(set.clone())),
        )),
        Some(PrivateImpl::Function(function)) => Ok(match kind {
            MemberKind::Getter => PropertyDescriptor::accessor(Some(function.clone()), None),
            MemberKind::Setter => PropertyDescriptor::accessor(None, Some(function.clone())),
            _ => PropertyDescriptor::method(function.clone()),
        }),
        None if kind == MemberKind::Field => Ok(PropertyDescriptor::default()),
        None => base.get_own_property(key).ok_or_else(|| {
            DecoratorError::type_mismatch(format!(
                "cannot decorate {} `{}`: no such property on the construct",
                kind.as_str(),
                instruction.name
            ))
        }),
    }
}

/// Adapt `(target) -> value` to a receiver-bound getter
fn receiver_getter(get: Value) -> Value {
    Value::function("get", move |this, _| get.call(&Value::Undefined, &[this.clone()]))
}

/// Adapt `(target, value)` to a receiver-bound setter
fn receiver_setter(set: Value) -> Value {
    Value::function("set", move |this, args| {
        set.call(&Value::Undefined, &[this.clone(), arg(args, 0)])?;
        Ok(Value::Undefined)
    })
}

fn invoke_decorator(call: &DecoratorCall, site: &MemberSite, value: Value) -> DecoratorResult<Value> {
    let flag = FinishedFlag::new();
    let context = site.context(&flag)?;
    trace!(member = %site.name, kind = site.kind.as_str(), "invoking member decorator");
    let _finish = flag.guard();
    call.decorator.call(&call.receiver, &[value, context])
}

/// Compose initializer contributions into one `(instance, value) -> value`.
///
/// The most recently added contribution runs first.
fn compose_initializers(mut contributions: Vec<Value>) -> Value {
    match contributions.len() {
        0 => Value::function("init", |_, args| Ok(arg(args, 1))),
        1 => {
            let only = contributions.remove(0);
            Value::function("init", move |_, args| only.call(&arg(args, 0), &[arg(args, 1)]))
        }
        _ => Value::function("init", move |_, args| {
            let instance = arg(args, 0);
            let mut value = arg(args, 1);
            for initializer in contributions.iter().rev() {
                value = initializer.call(&instance, &[value])?;
            }
            Ok(value)
        }),
    }
}

fn write_back(descriptor: &mut PropertyDescriptor, kind: MemberKind, current: &Current) {
    let defined = |value: &Value| (!value.is_undefined()).then(|| value.clone());
    match (kind, current) {
        (_, Current::Accessor { get, set }) => {
            descriptor.get = defined(get);
            descriptor.set = defined(set);
        }
        (MemberKind::Method, Current::Function(function)) => {
            descriptor.value = Some(function.clone());
        }
        (MemberKind::Getter, Current::Function(function)) => descriptor.get = defined(function),
        (MemberKind::Setter, Current::Function(function)) => descriptor.set = defined(function),
        _ => {}
    }
}

/// Private implementations are handed back for positional binding:
/// accessors push `get` then `set`, methods push the function itself,
/// getters and setters push an `(instance, arg)` trampoline.
fn push_private_implementation(results: &mut Vec<Value>, kind: MemberKind, current: &Current) {
    match current {
        Current::Field => {}
        Current::Accessor { get, set } => {
            results.push(trampoline(get.clone()));
            results.push(trampoline(set.clone()));
        }
        Current::Function(function) if kind == MemberKind::Method => results.push(function.clone()),
        Current::Function(function) => results.push(trampoline(function.clone())),
    }
}

fn trampoline(function: Value) -> Value {
    Value::function("private", move |_, args| {
        function.call(&arg(args, 0), &[arg(args, 1)])
    })
}
