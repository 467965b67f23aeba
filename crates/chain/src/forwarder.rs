//! Invocation of resolved operations and fault translation.
//!
//! Only faults raised *by the invoked operation* pass through
//! [`translate_fault`]. A recognized [`RuntimeFailure`] is surfaced as-is;
//! everything else is wrapped once in an [`InvocationFailure`] that keeps the
//! original error as its source. Resolution errors never reach this module.
//!
//! [`RuntimeFailure`]: crate::errors::RuntimeFailure

use tracing::{debug, warn};

use crate::errors::{InvocationFailure, OperationFault, ShimError};
use crate::resolver::ResolvedOperation;
use crate::surface::{MethodHandle, MethodSurface, RootSurface, SetterCall, Terminal};
use crate::{OperationName, ParamValue, RequestData};

/// Opens the method builder for a resolved root operation.
pub fn open<K, V>(
    resolved: ResolvedOperation<()>,
    root: &dyn RootSurface<K, V>,
) -> Result<MethodHandle<K, V>, ShimError> {
    let (signature, ()) = resolved.into_parts();
    debug!(operation = %signature, "opening method builder");
    root.open(&signature.name)
        .map_err(|fault| translate_fault(signature.name, fault))
}

/// Applies a resolved fixed-table setter to `handle`.
pub fn apply<K, V>(
    resolved: ResolvedOperation<SetterCall<K, V>>,
    handle: &dyn MethodSurface<K, V>,
) -> Result<MethodHandle<K, V>, ShimError> {
    let (signature, call) = resolved.into_parts();
    debug!(operation = %signature, "invoking setter");
    handle
        .apply(call)
        .map_err(|fault| translate_fault(signature.name, fault))
}

/// Invokes a resolved dynamically named setter on `handle`.
pub fn set_named<K, V>(
    resolved: ResolvedOperation<ParamValue>,
    handle: &dyn MethodSurface<K, V>,
) -> Result<MethodHandle<K, V>, ShimError> {
    let (signature, value) = resolved.into_parts();
    debug!(operation = %signature, "invoking named setter");
    handle
        .set_named(&signature, value)
        .map_err(|fault| translate_fault(signature.name, fault))
}

/// Runs a resolved terminal build on `handle`.
pub fn build<K, V>(
    resolved: ResolvedOperation<Terminal>,
    handle: &dyn MethodSurface<K, V>,
) -> Result<RequestData<K, V>, ShimError> {
    let (signature, terminal) = resolved.into_parts();
    debug!(operation = %signature, "building request");
    handle
        .build(terminal)
        .map_err(|fault| translate_fault(signature.name, fault))
}

/// Maps a fault raised by `operation` onto the caller-facing error.
pub fn translate_fault(operation: OperationName, fault: OperationFault) -> ShimError {
    match fault {
        OperationFault::Runtime(failure) => ShimError::Runtime(failure),
        OperationFault::Other(cause) => {
            warn!(operation = %operation, error = %cause, "operation failed");
            ShimError::Invocation(InvocationFailure { operation, cause })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use thiserror::Error;

    use super::*;
    use crate::errors::RuntimeFailure;

    #[derive(Debug, Error, PartialEq)]
    #[error("quota exhausted")]
    struct Quota;

    fn op() -> OperationName {
        OperationName::new("paginate").expect("non-empty")
    }

    #[test]
    fn test_runtime_failure_passes_through_unchanged() {
        let original = RuntimeFailure::IllegalArgument("start must be >= 0".into());
        let err = translate_fault(op(), OperationFault::from(original.clone()));
        assert_eq!(err.as_runtime(), Some(&original));
    }

    #[test]
    fn test_other_fault_is_wrapped_with_cause() {
        let err = translate_fault(op(), OperationFault::other(Quota));
        let failure = match err {
            ShimError::Invocation(failure) => failure,
            other => panic!("expected an invocation failure, got {other:?}"),
        };
        assert_eq!(failure.operation, op());
        assert_eq!(failure.cause().downcast_ref::<Quota>(), Some(&Quota));
        assert!(failure.source().is_some());
    }
}
