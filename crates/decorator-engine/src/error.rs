//! Decorator engine errors
//!
//! Every violation detected while applying decorators is a hard failure:
//! the error propagates to the caller of the entry point and the whole
//! decoration pass for the construct is abandoned.

use thiserror::Error;

/// Errors raised while applying decorators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoratorError {
    /// A value had the wrong shape for its position, or was not callable
    #[error("TypeError: {0}")]
    TypeMismatch(String),

    /// A lifecycle-bound operation was invoked after its decoration unit finished
    #[error("attempted to call {0} after decoration was finished")]
    LifecycleViolation(String),

    /// A private element was accessed through a candidate failing the brand check
    #[error("TypeError: Attempted to access private element on non-instance")]
    AccessViolation,

    /// Two public member decorations collide on the same name
    #[error(
        "Attempted to decorate a public method/accessor that has the same name as a \
         previously decorated public method/accessor. This is not currently supported \
         by the decorators plugin. Property name was: {0}"
    )]
    Conflict(String),

    /// Failure raised by user code (decorators, initializers, accessors)
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl DecoratorError {
    /// Build a [`DecoratorError::TypeMismatch`]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        DecoratorError::TypeMismatch(message.into())
    }

    /// Build a [`DecoratorError::Runtime`]
    pub fn runtime(message: impl Into<String>) -> Self {
        DecoratorError::Runtime(message.into())
    }
}

/// Decorator engine result
pub type DecoratorResult<T> = Result<T, DecoratorError>;
