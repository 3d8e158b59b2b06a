//! Decorator application entry point
//!
//! [`apply_decorators`] runs member decoration eagerly and defers class
//! decoration until [`Decorated::class`] is read, so that the caller can
//! bind every member initializer before class decorators (and their
//! initializers) observe the construct.
//!
//! ## Results layout
//!
//! [`Decorated::elements`] lists, in instruction order:
//! - one initializer per field and accessor-kind member,
//! - for private members, the final implementation(s): `get` and `set`
//!   for accessors, the method itself, or a trampoline for getters/setters,
//!
//! followed by the instance-scope initializer and then the static-scope
//! initializer, each only when that scope has a decorated non-field member.

use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::class::{ClassDecoration, ClassPipeline};
use crate::config::EngineOptions;
use crate::error::{DecoratorError, DecoratorResult};
use crate::guards::{brand_check, BrandCheck};
use crate::instruction::MemberEntry;
use crate::metadata::{build_metadata, define_metadata, parent_metadata};
use crate::orchestrator::apply_member_decorators;
use crate::value::{Object, Value};

/// Inputs of one decoration pass
pub struct DecorationRequest {
    target: Value,
    members: Vec<MemberEntry>,
    class_decorators: Vec<Value>,
    class_decorators_have_this: bool,
    instance_brand: BrandCheck,
    parent: Option<Value>,
    options: EngineOptions,
}

impl DecorationRequest {
    /// Start a request for `target`.
    ///
    /// Until [`DecorationRequest::instance_brand`] is supplied, every
    /// candidate fails the instance brand check.
    pub fn new(target: Value) -> Self {
        Self {
            target,
            members: Vec::new(),
            class_decorators: Vec::new(),
            class_decorators_have_this: false,
            instance_brand: brand_check(|_| Ok(false)),
            parent: None,
            options: EngineOptions::default(),
        }
    }

    /// Append a member instruction (or computed-key placeholder)
    pub fn member(mut self, entry: impl Into<MemberEntry>) -> Self {
        self.members.push(entry.into());
        self
    }

    /// Append several member entries
    pub fn members<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = MemberEntry>,
    {
        self.members.extend(entries);
        self
    }

    /// Append a class decorator (source order)
    pub fn class_decorator(mut self, decorator: Value) -> Self {
        self.class_decorators.push(decorator);
        self
    }

    /// Replace the class decorator list.
    ///
    /// With `have_this`, the list alternates `[receiver, decorator, ...]`.
    pub fn class_decorators(mut self, decorators: Vec<Value>, have_this: bool) -> Self {
        self.class_decorators = decorators;
        self.class_decorators_have_this = have_this;
        self
    }

    /// Brand check for the construct's instance private elements
    pub fn instance_brand<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> DecoratorResult<bool> + 'static,
    {
        self.instance_brand = brand_check(check);
        self
    }

    /// Parent construct whose metadata the carrier inherits
    pub fn parent(mut self, parent: Value) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Engine options
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a decoration pass
pub struct Decorated {
    elements: Vec<Value>,
    metadata: Object,
    pipeline: ClassPipeline,
    class: OnceCell<Option<ClassDecoration>>,
}

impl Decorated {
    /// Flat member results list
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    /// Metadata carrier shared by every context of the pass
    pub fn metadata(&self) -> &Object {
        &self.metadata
    }

    /// Apply class decorators on first read.
    ///
    /// Returns `None` when the construct has no class decorators. A
    /// successful result is kept and returned by later reads; a failure is
    /// not kept.
    ///
    /// This deliberately differs from the host getter, which re-applies the
    /// class decorators on every read: here class decorators and their
    /// `addInitializer` registrations run at most once per pass.
    pub fn class(&self) -> DecoratorResult<Option<ClassDecoration>> {
        self.class
            .get_or_try_init(|| self.pipeline.run())
            .map(Clone::clone)
    }
}

/// Apply member decorators to `request.target` and prepare class decoration
pub fn apply_decorators(request: DecorationRequest) -> DecoratorResult<Decorated> {
    let DecorationRequest {
        target,
        members,
        class_decorators,
        class_decorators_have_this,
        instance_brand,
        parent,
        options,
    } = request;

    let Value::Object(class) = &target else {
        return Err(DecoratorError::type_mismatch(format!(
            "decorated construct must be an object, got {}",
            target.type_of()
        )));
    };
    let span = tracing::debug_span!(
        "apply_decorators",
        construct = %class.name().unwrap_or_default(),
        members = members.len(),
        class_decorators = class_decorators.len()
    );
    let _enter = span.enter();

    let metadata_key = options.metadata_key();
    let inherited = match &parent {
        Some(parent) => Some(parent_metadata(parent, &metadata_key)?),
        None => None,
    };
    let metadata = build_metadata(inherited.as_ref())?;

    let elements = apply_member_decorators(class, &members, &instance_brand, &metadata)?;
    debug!(elements = elements.len(), "member decoration finished");

    if class_decorators.is_empty() {
        define_metadata(&target, &metadata_key, &metadata)?;
    }

    Ok(Decorated {
        elements,
        metadata: metadata.clone(),
        pipeline: ClassPipeline {
            target,
            decorators: class_decorators,
            bound_receivers: class_decorators_have_this,
            metadata,
            metadata_key,
        },
        class: OnceCell::new(),
    })
}
