//! Error types for the modern builder generation.

use chain::{OperationFault, ResourceMethod, RuntimeFailure, ValueKind};
use thiserror::Error;

/// Misuse reported by a [`crate::ModernRequestBuilder`].
///
/// Only [`ModernBuilderError::Runtime`] is a recognized runtime failure;
/// every other variant reaches callers wrapped in an
/// [`chain::InvocationFailure`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModernBuilderError {
    #[error(transparent)]
    Runtime(#[from] RuntimeFailure),

    #[error("invalid header name '{0}'")]
    InvalidHeader(String),

    #[error("field projection contains an empty path")]
    EmptyProjection,

    #[error("parameter '{param}' takes {expected} elements, got {actual}")]
    ElementKind {
        param: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("{method} requires an id before it can be built")]
    MissingId { method: ResourceMethod },

    #[error("{method} does not take {body}")]
    UnexpectedBody {
        method: ResourceMethod,
        body: &'static str,
    },
}

impl From<ModernBuilderError> for OperationFault {
    fn from(error: ModernBuilderError) -> Self {
        match error {
            ModernBuilderError::Runtime(failure) => OperationFault::Runtime(failure),
            other => OperationFault::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_variant_stays_a_runtime_fault() {
        let fault: OperationFault =
            ModernBuilderError::from(RuntimeFailure::IllegalArgument("count".into())).into();
        assert!(matches!(fault, OperationFault::Runtime(_)));
    }

    #[test]
    fn test_other_variants_become_opaque_faults() {
        let fault: OperationFault = ModernBuilderError::EmptyProjection.into();
        match fault {
            OperationFault::Other(cause) => {
                assert_eq!(
                    cause.downcast_ref::<ModernBuilderError>(),
                    Some(&ModernBuilderError::EmptyProjection)
                );
            }
            other => panic!("unexpected fault {other:?}"),
        }
    }
}
