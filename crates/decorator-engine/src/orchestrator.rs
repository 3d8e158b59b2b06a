//! Member decoration orchestration
//!
//! Drives [`apply_member_decorator`] across a construct's member
//! instructions, rejects conflicting public decorations, and appends the
//! scope-wide instance and static initializers to the results list.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::context::Initializers;
use crate::error::{DecoratorError, DecoratorResult};
use crate::guards::BrandCheck;
use crate::instruction::{MemberEntry, MemberKind};
use crate::member::{apply_member_decorator, MemberScope};
use crate::value::{arg, Object, Value};

/// What a public name has been decorated as so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Getter,
    Setter,
    /// No further decoration of this name is allowed
    Locked,
}

/// Public non-field names decorated in one scope
#[derive(Debug, Default)]
struct ClaimTable(FxHashMap<Rc<str>, Claim>);

impl ClaimTable {
    /// Record a decoration of `name` as `kind`.
    ///
    /// Only a getter/setter pair may share a name.
    fn claim(&mut self, name: &Rc<str>, kind: MemberKind) -> DecoratorResult<()> {
        let existing = self.0.get(name).copied();
        let conflict = match existing {
            None => false,
            Some(Claim::Locked) => true,
            Some(Claim::Getter) => kind != MemberKind::Setter,
            Some(Claim::Setter) => kind != MemberKind::Getter,
        };
        if conflict {
            return Err(DecoratorError::Conflict(name.to_string()));
        }
        let next = match (existing, kind) {
            (None, MemberKind::Getter) => Claim::Getter,
            (None, MemberKind::Setter) => Claim::Setter,
            _ => Claim::Locked,
        };
        self.0.insert(name.clone(), next);
        Ok(())
    }
}

/// Brand check for static private members: only the construct itself
fn static_brand(class: &Object) -> BrandCheck {
    let class = class.clone();
    Rc::new(move |candidate: &Value| match candidate {
        Value::Object(object) => Ok(object.ptr_eq(&class)),
        other => Err(DecoratorError::type_mismatch(format!(
            "right-hand side of 'in' should be an object, got {}",
            other.type_of()
        ))),
    })
}

fn prototype_of(class: &Object) -> DecoratorResult<Object> {
    match class.get("prototype")? {
        Value::Object(prototype) => Ok(prototype),
        other => Err(DecoratorError::type_mismatch(format!(
            "construct prototype must be an object, got {}",
            other.type_of()
        ))),
    }
}

/// Composite initializer running every scope-wide initializer against its
/// first argument, in registration order, and returning it
fn scope_initializer(initializers: Initializers) -> Value {
    Value::function("initialize", move |_, args| {
        let receiver = arg(args, 0);
        initializers.run_all(&receiver)?;
        Ok(receiver)
    })
}

/// Decorate every member of `class`, returning the flat results list
pub(crate) fn apply_member_decorators(
    class: &Object,
    entries: &[MemberEntry],
    instance_brand: &BrandCheck,
    metadata: &Object,
) -> DecoratorResult<Vec<Value>> {
    let mut results = Vec::new();
    let mut instance_initializers: Option<Initializers> = None;
    let mut static_initializers: Option<Initializers> = None;
    let mut class_brand: Option<BrandCheck> = None;
    let mut instance_claims = ClaimTable::default();
    let mut static_claims = ClaimTable::default();

    for entry in entries {
        let MemberEntry::Member(instruction) = entry else {
            continue;
        };
        let kind = instruction.kind();
        let is_static = instruction.flags.is_static;
        let is_private = instruction.is_private();

        let (base, brand, scope_list, claims) = if is_static {
            let brand = class_brand.get_or_insert_with(|| static_brand(class)).clone();
            (class.clone(), brand, &mut static_initializers, &mut static_claims)
        } else {
            (
                prototype_of(class)?,
                instance_brand.clone(),
                &mut instance_initializers,
                &mut instance_claims,
            )
        };

        let initializers = if kind != MemberKind::Field {
            Some(scope_list.get_or_insert_with(Initializers::new).clone())
        } else {
            None
        };

        if kind != MemberKind::Field && !is_private {
            claims.claim(&instruction.name, kind)?;
        }

        debug!(
            member = %instruction.name,
            kind = kind.as_str(),
            is_static,
            is_private,
            "decorating member"
        );
        apply_member_decorator(
            &mut results,
            instruction,
            &MemberScope {
                base: &base,
                initializers: initializers.as_ref(),
                brand: &brand,
                metadata,
            },
        )?;
    }

    if let Some(initializers) = instance_initializers {
        results.push(scope_initializer(initializers));
    }
    if let Some(initializers) = static_initializers {
        results.push(scope_initializer(initializers));
    }
    Ok(results)
}
