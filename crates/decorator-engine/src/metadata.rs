//! Metadata carriers
//!
//! One carrier is built per decoration pass and shared by every context
//! the pass produces. Lookups that miss on the carrier fall through to the
//! parent construct's carrier, mirroring prototype delegation.

use crate::error::{DecoratorError, DecoratorResult};
use crate::value::{Object, PropertyDescriptor, PropertyKey, Value};

/// Read the metadata carrier stored on `parent` under `key`
pub fn parent_metadata(parent: &Value, key: &PropertyKey) -> DecoratorResult<Value> {
    parent.get(key)
}

/// Build a carrier delegating to `parent` when one is given
///
/// `None`, `undefined` and `null` all produce a carrier without a
/// delegation target; any other non-object parent is rejected.
pub fn build_metadata(parent: Option<&Value>) -> DecoratorResult<Object> {
    let prototype = match parent {
        None | Some(Value::Undefined) | Some(Value::Null) => None,
        Some(Value::Object(carrier)) => Some(carrier.clone()),
        Some(other) => {
            return Err(DecoratorError::type_mismatch(format!(
                "Object prototype may only be an Object or null: {}",
                other
            )))
        }
    };
    Ok(Object::with_prototype(prototype))
}

/// Attach `metadata` to `class` under `key`.
///
/// The association is enumerable and configurable but not writable.
pub fn define_metadata(class: &Value, key: &PropertyKey, metadata: &Object) -> DecoratorResult<Value> {
    let Value::Object(object) = class else {
        return Err(DecoratorError::type_mismatch(
            "Object.defineProperty called on non-object",
        ));
    };
    object.define_property(
        key,
        PropertyDescriptor::data(Value::Object(metadata.clone())).writable(false),
    )?;
    Ok(class.clone())
}

/// Metadata carrier attached to `class`, if any
pub fn metadata_of(class: &Value, key: &PropertyKey) -> DecoratorResult<Option<Object>> {
    match class.get(key)? {
        Value::Object(carrier) => Ok(Some(carrier)),
        _ => Ok(None),
    }
}
