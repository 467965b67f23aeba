//! Operation resolution against a handle's [`CapabilitySet`].
//!
//! Two modes:
//!
//! - **Exact signature** for root verbs, terminal builds, and the fixed setter
//!   table. The requested name and parameter list must appear verbatim.
//! - **Shape inference** for dynamically named setters. The overload is chosen
//!   from the [`ParamValue`]'s tag: a list always resolves to the iterable
//!   overload, a scalar to the overload of its kind, and an absent value to
//!   the overload of the kind it is tagged with. An absent value whose tag
//!   matches nothing falls back to the name's one-parameter overload, but
//!   only when exactly one exists; with two or more it is
//!   [`ResolutionError::NoMatchingOverload`]. No scan order is involved.
//!
//! A successful resolution yields a [`ResolvedOperation`] that owns its
//! arguments and is consumed by exactly one call in [`crate::forwarder`].

use tracing::debug;

use crate::errors::ResolutionError;
use crate::surface::{CapabilitySet, OperationSignature, ParamType, SetterCall, Terminal};
use crate::{OperationName, ParamValue};

/// How an operation was matched; recorded for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    ExactSignature,
    ShapeInference,
}

/// One operation bound to the surface it was resolved on, plus its arguments.
///
/// Deliberately not `Clone`: it is consumed once by the forwarder.
#[derive(Debug)]
pub struct ResolvedOperation<A> {
    signature: OperationSignature,
    mode: ResolutionMode,
    args: A,
}

impl<A> ResolvedOperation<A> {
    pub fn signature(&self) -> &OperationSignature {
        &self.signature
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    pub(crate) fn into_parts(self) -> (OperationSignature, A) {
        (self.signature, self.args)
    }
}

/// Resolves a zero-argument root operation such as `"get"` or `"findBySearch"`.
pub fn resolve_root(
    capabilities: &CapabilitySet,
    verb: OperationName,
) -> Result<ResolvedOperation<()>, ResolutionError> {
    exact(capabilities, OperationSignature::nullary(verb), ())
}

/// Resolves one call from the fixed setter table.
pub fn resolve_setter<K, V>(
    capabilities: &CapabilitySet,
    call: SetterCall<K, V>,
) -> Result<ResolvedOperation<SetterCall<K, V>>, ResolutionError> {
    let signature = call.signature();
    exact(capabilities, signature, call)
}

/// Resolves a terminal `build`/`buildKV`.
pub fn resolve_terminal(
    capabilities: &CapabilitySet,
    terminal: Terminal,
) -> Result<ResolvedOperation<Terminal>, ResolutionError> {
    exact(capabilities, terminal.signature(), terminal)
}

/// Resolves a dynamically named setter by inferring the overload from `value`.
pub fn resolve_named(
    capabilities: &CapabilitySet,
    name: OperationName,
    value: ParamValue,
) -> Result<ResolvedOperation<ParamValue>, ResolutionError> {
    let wanted = ParamType::Value(value.kind());
    let lookup = name.clone();
    let single_param: Vec<&OperationSignature> = capabilities
        .overloads(&lookup)
        .filter(|overload| overload.params.len() == 1)
        .collect();

    if let Some(overload) = single_param.iter().find(|o| o.params[0] == wanted) {
        return Ok(shaped(overload, value));
    }

    match (value, single_param.as_slice()) {
        (ParamValue::Absent(tag), [only]) => match only.params[0] {
            // The absent value takes on the tag of the overload it lands on.
            ParamType::Value(kind) => Ok(shaped(only, ParamValue::Absent(kind))),
            _ => Err(ResolutionError::NoMatchingOverload { name, kind: tag }),
        },
        (_, []) => Err(ResolutionError::UnknownOperation { name }),
        (value, _) => Err(ResolutionError::NoMatchingOverload {
            name,
            kind: value.kind(),
        }),
    }
}

fn shaped(overload: &OperationSignature, value: ParamValue) -> ResolvedOperation<ParamValue> {
    debug!(
        operation = %overload,
        mode = "shape_inference",
        absent = value.is_absent(),
        "resolved operation"
    );
    ResolvedOperation {
        signature: overload.clone(),
        mode: ResolutionMode::ShapeInference,
        args: value,
    }
}

fn exact<A>(
    capabilities: &CapabilitySet,
    signature: OperationSignature,
    args: A,
) -> Result<ResolvedOperation<A>, ResolutionError> {
    if !capabilities.contains(&signature) {
        return Err(ResolutionError::NoSuchSignature {
            params: signature.render_params(),
            name: signature.name,
        });
    }
    debug!(operation = %signature, mode = "exact", "resolved operation");
    Ok(ResolvedOperation {
        signature,
        mode: ResolutionMode::ExactSignature,
        args,
    })
}
