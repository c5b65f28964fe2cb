//! Crate-level error type
//!
//! Failures raised by the wrapped callables themselves never pass through
//! this type unless the caller opts in with `CallableExt::nest`; memoizing
//! wrappers hand them back exactly as the callable produced them.

use thiserror::Error;

/// Boxed error carried by [`MemoError::Nested`]
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate
pub type MemoResult<T> = Result<T, MemoError>;

#[derive(Debug, Error)]
pub enum MemoError {
    /// A required argument was absent, e.g. memoizing a missing callable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A callable's own error, nested as the source of this one
    #[error("nested failure: {0}")]
    Nested(#[source] BoxedError),

    #[error("logging initialization failed: {0}")]
    LoggingInit(String),
}

impl MemoError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        MemoError::InvalidArgument(message.into())
    }

    /// Wraps any error as the source of a [`MemoError::Nested`]
    pub fn nested<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MemoError::Nested(Box::new(error))
    }

    /// Returns `true` for [`MemoError::InvalidArgument`]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MemoError::InvalidArgument(_))
    }
}
