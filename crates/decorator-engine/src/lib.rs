//! Decorator Application Engine
//!
//! This crate applies decorators to a construct (a class-like callable
//! object) and its members, following the standard decorator semantics:
//! - **Members**: fields, accessors, methods, getters and setters, public or
//!   private, instance or static (`member`, `orchestrator` modules)
//! - **Classes**: class decorators that may replace the construct (`class`)
//! - **Metadata**: a per-pass carrier inheriting from the parent construct
//!   (`metadata`)
//!
//! Instructions arrive pre-marshalled from the call site (see
//! [`instruction`]); the engine produces the initializers and private
//! implementations the caller binds positionally.
//!
//! # Example
//!
//! ```rust,ignore
//! use decorator_engine::{apply_decorators, DecorationRequest, MemberInstruction, MemberKind, Object, Value};
//!
//! let add_one = Value::function("addOne", |_, _| {
//!     Ok(Value::function("init", |_, args| {
//!         Ok(Value::from(args[0].as_number().unwrap_or(0.0) + 1.0))
//!     }))
//! });
//! let class = Object::class("Counter");
//! let decorated = apply_decorators(
//!     DecorationRequest::new(Value::Object(class))
//!         .member(MemberInstruction::new(MemberKind::Field, "count", add_one)),
//! )?;
//! let init_count = &decorated.elements()[0];
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Modules
// ============================================================================

/// Decoration pass entry point
pub mod apply;

/// Class decoration pipeline
pub mod class;

/// Engine configuration
pub mod config;

/// Decoration contexts and initializer lists
pub mod context;

/// Error types
pub mod error;

/// Validation and guard primitives
pub mod guards;

/// Member decoration instructions
pub mod instruction;

/// Metadata carriers
pub mod metadata;

/// Host value model
pub mod value;

mod member;
mod orchestrator;

// ============================================================================
// Re-exports
// ============================================================================

pub use apply::{apply_decorators, Decorated, DecorationRequest};
pub use class::ClassDecoration;
pub use config::EngineOptions;
pub use context::{FinishedFlag, Initializers};
pub use error::{DecoratorError, DecoratorResult};
pub use guards::{brand_check, BrandCheck, DecorationTarget};
pub use instruction::{
    Decorators, MemberEntry, MemberFlags, MemberInstruction, MemberKind, PrivateImpl,
    DECORATORS_HAVE_THIS_FLAG, STATIC_FLAG,
};
pub use value::{arg, Object, PropertyDescriptor, PropertyKey, Symbol, Value};
