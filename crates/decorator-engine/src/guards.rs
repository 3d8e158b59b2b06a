//! Validation and guard primitives
//!
//! Stateless checks shared by the member and class pipelines.

use std::rc::Rc;

use crate::context::FinishedFlag;
use crate::error::{DecoratorError, DecoratorResult};
use crate::instruction::MemberKind;
use crate::value::Value;

/// Private brand check: does `candidate` hold the private element?
///
/// The check itself may fail (e.g. when the candidate is not an object).
pub type BrandCheck = Rc<dyn Fn(&Value) -> DecoratorResult<bool>>;

/// Wrap a closure as a [`BrandCheck`]
pub fn brand_check<F>(check: F) -> BrandCheck
where
    F: Fn(&Value) -> DecoratorResult<bool> + 'static,
{
    Rc::new(check)
}

/// What a decorator return value is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationTarget {
    /// A class member of the given kind
    Member(MemberKind),
    /// The construct itself
    Class,
}

/// Fail unless `value` is invokable
pub fn assert_callable(value: &Value, hint: &str) -> DecoratorResult<()> {
    if value.is_callable() {
        Ok(())
    } else {
        Err(DecoratorError::type_mismatch(format!("{} must be a function", hint)))
    }
}

/// Fail once the owning decoration unit has finished
pub fn assert_not_finished(flag: &FinishedFlag, operation: &str) -> DecoratorResult<()> {
    if flag.is_finished() {
        Err(DecoratorError::LifecycleViolation(operation.to_string()))
    } else {
        Ok(())
    }
}

/// Fail unless `candidate` passes the private brand check
pub fn assert_instance_if_private(brand: &BrandCheck, candidate: &Value) -> DecoratorResult<()> {
    if brand(candidate)? {
        Ok(())
    } else {
        Err(DecoratorError::AccessViolation)
    }
}

/// Validate a decorator's return value for `target`.
///
/// `undefined` is always accepted. Accessor decorators must return a plain
/// object whose `get`/`set`/`init` members, when present, are functions;
/// every other decorator must return a function.
pub fn assert_valid_return_value(target: DecorationTarget, value: &Value) -> DecoratorResult<()> {
    if value.is_undefined() {
        return Ok(());
    }

    if target == DecorationTarget::Member(MemberKind::Accessor) {
        let object = match value {
            Value::Object(object) if !object.is_callable() => object,
            _ => {
                return Err(DecoratorError::type_mismatch(
                    "accessor decorators must return an object with get, set, or init properties or void 0",
                ))
            }
        };
        for (member, hint) in [
            ("get", "accessor.get"),
            ("set", "accessor.set"),
            ("init", "accessor.init"),
        ] {
            let candidate = object.get(member)?;
            if !candidate.is_undefined() {
                assert_callable(&candidate, hint)?;
            }
        }
        return Ok(());
    }

    if value.is_callable() {
        return Ok(());
    }
    let hint = match target {
        DecorationTarget::Member(MemberKind::Field) => "field",
        DecorationTarget::Class => "class",
        DecorationTarget::Member(_) => "method",
    };
    Err(DecoratorError::type_mismatch(format!(
        "{} decorators must return a function or void 0",
        hint
    )))
}
