//! Error taxonomy for the adaptation layer.
//!
//! [`ShimError`] is what callers of the fluent wrappers see. [`OperationFault`]
//! is what a builder generation returns when one of its own operations fails;
//! the forwarder translates it into a [`ShimError`] without stacking wrappers:
//!
//! - a fault that already is a [`RuntimeFailure`] surfaces unchanged as
//!   [`ShimError::Runtime`];
//! - any other fault becomes an [`InvocationFailure`] whose `source()` is the
//!   original error.
//!
//! None of these are retried. The layer is a deterministic shim used from
//! test and tooling code, so every error propagates to the caller.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{OperationName, ResponseKind, ValueKind};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// No operation on a surface matched the requested name and argument shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No operation with this exact name and parameter list.
    #[error("no operation '{name}({params})' on this builder")]
    NoSuchSignature {
        name: OperationName,
        /// Rendered parameter list, e.g. `"Key, Patch"`.
        params: String,
    },

    /// An operation with this name exists, but none accepts the value's kind.
    #[error("no overload of '{name}' accepts a {kind} value")]
    NoMatchingOverload { name: OperationName, kind: ValueKind },

    /// Nothing on the surface carries this name at all.
    #[error("no operation named '{name}' on this builder")]
    UnknownOperation { name: OperationName },
}

// ---------------------------------------------------------------------------
// Faults raised by invoked operations
// ---------------------------------------------------------------------------

/// Recognized runtime failure raised by a builder operation.
///
/// These pass through the forwarder as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeFailure {
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

/// A failure raised by a builder generation while executing one operation.
#[derive(Debug, Error)]
pub enum OperationFault {
    /// A recognized runtime failure.
    #[error(transparent)]
    Runtime(#[from] RuntimeFailure),

    /// Any other error kind a generation may raise.
    #[error("{0}")]
    Other(Box<dyn StdError + Send + Sync + 'static>),
}

impl OperationFault {
    /// Wraps an arbitrary generation-specific error.
    pub fn other(error: impl StdError + Send + Sync + 'static) -> Self {
        OperationFault::Other(Box::new(error))
    }
}

/// An operation executed but faulted with an error that is not a
/// [`RuntimeFailure`]. The original error is kept as the source.
#[derive(Debug, Error)]
#[error("operation '{operation}' failed")]
pub struct InvocationFailure {
    pub operation: OperationName,
    #[source]
    pub cause: Box<dyn StdError + Send + Sync + 'static>,
}

impl InvocationFailure {
    /// Returns the original error, for downcasting to a generation's type.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Caller-facing error
// ---------------------------------------------------------------------------

/// Every failure a caller of the fluent wrappers can observe.
#[derive(Debug, Error)]
pub enum ShimError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The invoked operation raised a recognized runtime failure.
    #[error(transparent)]
    Runtime(#[from] RuntimeFailure),

    #[error(transparent)]
    Invocation(#[from] InvocationFailure),

    /// A terminal build returned a request of an unexpected shape.
    ///
    /// Indicates a wiring defect between a root verb and its generation.
    #[error("built request expects a {actual} response, wanted {expected}")]
    TypeMismatch {
        expected: ResponseKind,
        actual: ResponseKind,
    },
}

impl ShimError {
    /// Returns the runtime failure if this error is one.
    pub fn as_runtime(&self) -> Option<&RuntimeFailure> {
        match self {
            ShimError::Runtime(failure) => Some(failure),
            _ => None,
        }
    }
}
