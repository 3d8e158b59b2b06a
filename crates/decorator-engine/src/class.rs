//! Class decoration
//!
//! Class decorators run last-to-first, each receiving the construct as
//! left by the previous one; a decorator returning a function replaces the
//! construct. Initializers registered through `addInitializer` are
//! collected across all class decorators and run by the returned runner.

use tracing::{debug, trace};

use crate::context::{class_context, FinishedFlag, Initializers};
use crate::error::DecoratorResult;
use crate::guards::{assert_valid_return_value, DecorationTarget};
use crate::instruction::application_order;
use crate::metadata::define_metadata;
use crate::value::{Object, PropertyKey, Value};

/// Outcome of class decoration
#[derive(Debug, Clone)]
pub struct ClassDecoration {
    /// Final construct, with metadata attached
    pub class: Value,
    /// Zero-argument runner for the class initializers
    pub initializer: Value,
}

impl ClassDecoration {
    /// Run the class initializers against the final construct
    pub fn initialize(&self) -> DecoratorResult<()> {
        self.initializer.call(&Value::Undefined, &[])?;
        Ok(())
    }
}

/// Deferred class decoration for one construct
pub(crate) struct ClassPipeline {
    pub target: Value,
    pub decorators: Vec<Value>,
    pub bound_receivers: bool,
    pub metadata: Object,
    pub metadata_key: PropertyKey,
}

impl ClassPipeline {
    /// Apply the class decorators; `None` when there are none
    pub(crate) fn run(&self) -> DecoratorResult<Option<ClassDecoration>> {
        if self.decorators.is_empty() {
            return Ok(None);
        }

        let initializers = Initializers::new();
        let name = self.target.get("name")?;
        let mut current = self.target.clone();

        for call in application_order(&self.decorators, self.bound_receivers) {
            let flag = FinishedFlag::new();
            let replacement = {
                let _finish = flag.guard();
                let context = class_context(name.clone(), &self.metadata, &initializers, &flag)?;
                trace!(class = %name, "invoking class decorator");
                call.decorator.call(&call.receiver, &[current.clone(), context])?
            };
            if !replacement.is_undefined() {
                assert_valid_return_value(DecorationTarget::Class, &replacement)?;
                debug!(class = %name, "class decorator replaced construct");
                current = replacement;
            }
        }

        let class = define_metadata(&current, &self.metadata_key, &self.metadata)?;
        let receiver = class.clone();
        let initializer = Value::function("initializeClass", move |_, _| {
            initializers.run_all(&receiver)?;
            Ok(Value::Undefined)
        });
        Ok(Some(ClassDecoration { class, initializer }))
    }
}
