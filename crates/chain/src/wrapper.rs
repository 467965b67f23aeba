//! The fluent chain state over a method-specific builder.
//!
//! A [`MethodBuilderWrapper`] wraps exactly one [`MethodHandle`]. Every setter
//! takes `&self` and returns a new wrapper around the handle the generation
//! produced, so earlier wrappers in a chain remain readable and keep
//! representing the state before the call:
//!
//! ```ignore
//! let get = root.get()?;
//! let with_id = get.id(1)?;          // `get` still has no id
//! let request = with_id.build()?;
//! ```
//!
//! Chains are traversed by one owner; the wrapper is neither `Send` nor `Sync`.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use crate::errors::ShimError;
use crate::surface::{MethodHandle, MethodSurface, SetterCall, Terminal};
use crate::{
    forwarder, naming, resolver, KeyedBatchRequest, ParamValue, PatchRequest, PathSpec, Record,
    Request, ResourceKey, ResponseType,
};

/// Chain state for a request whose response decodes into `R`.
pub struct MethodBuilderWrapper<K, V, R> {
    handle: MethodHandle<K, V>,
    _response: PhantomData<fn() -> R>,
}

impl<K, V, R> fmt::Debug for MethodBuilderWrapper<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBuilderWrapper")
            .field("handle", &self.handle)
            .finish()
    }
}

impl<K: ResourceKey, V: Record, R> MethodBuilderWrapper<K, V, R> {
    /// Wraps a handle obtained from a generation.
    pub fn new(handle: MethodHandle<K, V>) -> Self {
        Self {
            handle,
            _response: PhantomData,
        }
    }

    /// The underlying generation handle.
    pub fn builder(&self) -> &dyn MethodSurface<K, V> {
        self.handle.as_ref()
    }

    // -----------------------------------------------------------------------
    // Terminal operations
    // -----------------------------------------------------------------------

    /// Builds the request, checking that its response shape is `R`.
    pub fn build(&self) -> Result<Request<K, V, R>, ShimError>
    where
        R: ResponseType,
    {
        let resolved = resolver::resolve_terminal(self.handle.capabilities(), Terminal::Build)?;
        let data = forwarder::build(resolved, self.builder())?;
        Request::try_from(data)
    }

    /// Builds a batch-get request keyed by typed keys.
    pub fn build_kv(&self) -> Result<KeyedBatchRequest<K, V>, ShimError> {
        let resolved = resolver::resolve_terminal(self.handle.capabilities(), Terminal::BuildKv)?;
        let data = forwarder::build(resolved, self.builder())?;
        KeyedBatchRequest::try_from(data)
    }

    // -----------------------------------------------------------------------
    // Fixed setters (exact-signature resolution)
    // -----------------------------------------------------------------------

    pub fn id(&self, id: K) -> Result<Self, ShimError> {
        self.apply(SetterCall::Id(id))
    }

    /// Sets the ids from any collection.
    pub fn ids(&self, ids: impl IntoIterator<Item = K>) -> Result<Self, ShimError> {
        self.apply(SetterCall::Ids(ids.into_iter().collect()))
    }

    /// Sets the ids through the variadic overload.
    pub fn ids_array(&self, ids: &[K]) -> Result<Self, ShimError> {
        self.apply(SetterCall::IdsArray(ids.to_vec()))
    }

    pub fn input(&self, entity: V) -> Result<Self, ShimError> {
        self.apply(SetterCall::Input(entity))
    }

    pub fn input_patch(&self, patch: PatchRequest<V>) -> Result<Self, ShimError> {
        self.apply(SetterCall::InputPatch(patch))
    }

    pub fn keyed_input(&self, id: K, entity: V) -> Result<Self, ShimError> {
        self.apply(SetterCall::KeyedInput(id, entity))
    }

    pub fn keyed_patch(&self, id: K, patch: PatchRequest<V>) -> Result<Self, ShimError> {
        self.apply(SetterCall::KeyedPatch(id, patch))
    }

    pub fn inputs(&self, entities: Vec<V>) -> Result<Self, ShimError> {
        self.apply(SetterCall::Inputs(entities))
    }

    pub fn input_map(&self, entities: BTreeMap<K, V>) -> Result<Self, ShimError> {
        self.apply(SetterCall::InputMap(entities))
    }

    pub fn patch_inputs(&self, patches: BTreeMap<K, PatchRequest<V>>) -> Result<Self, ShimError> {
        self.apply(SetterCall::PatchInputs(patches))
    }

    pub fn fields(&self, paths: impl IntoIterator<Item = PathSpec>) -> Result<Self, ShimError> {
        self.apply(SetterCall::Fields(paths.into_iter().collect()))
    }

    pub fn name(&self, name: &str) -> Result<Self, ShimError> {
        self.apply(SetterCall::Name(name.to_string()))
    }

    pub fn assoc_key(&self, key: &str, value: impl Into<ParamValue>) -> Result<Self, ShimError> {
        self.apply(SetterCall::AssocKey(key.to_string(), value.into()))
    }

    pub fn paginate(&self, start: i32, count: i32) -> Result<Self, ShimError> {
        self.apply(SetterCall::Paginate { start, count })
    }

    pub fn paginate_start(&self, start: i32) -> Result<Self, ShimError> {
        self.apply(SetterCall::PaginateStart(start))
    }

    pub fn paginate_count(&self, count: i32) -> Result<Self, ShimError> {
        self.apply(SetterCall::PaginateCount(count))
    }

    pub fn set_header(&self, name: &str, value: &str) -> Result<Self, ShimError> {
        self.apply(SetterCall::Header(name.to_string(), value.to_string()))
    }

    pub fn set_param(&self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ShimError> {
        self.apply(SetterCall::Param(name.to_string(), value.into()))
    }

    // -----------------------------------------------------------------------
    // Dynamically named setters (shape-inference resolution)
    // -----------------------------------------------------------------------

    /// Sets query parameter `name` through `<name>Param`.
    ///
    /// A [`ParamValue::List`] always resolves to the iterable overload, even
    /// when a scalar overload with the same name exists.
    pub fn set_query_param(&self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ShimError> {
        self.named(naming::query_param_setter(name), value.into())
    }

    /// Appends one element to repeated query parameter `name`.
    pub fn add_query_param(&self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ShimError> {
        self.named(naming::add_query_param_setter(name), value.into())
    }

    pub fn set_action_param(&self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ShimError> {
        self.named(naming::action_param_setter(name), value.into())
    }

    pub fn set_path_key(&self, name: &str, value: impl Into<ParamValue>) -> Result<Self, ShimError> {
        self.named(naming::path_key_setter(name), value.into())
    }

    fn apply(&self, call: SetterCall<K, V>) -> Result<Self, ShimError> {
        let resolved = resolver::resolve_setter(self.handle.capabilities(), call)?;
        forwarder::apply(resolved, self.builder()).map(Self::new)
    }

    fn named(&self, name: crate::OperationName, value: ParamValue) -> Result<Self, ShimError> {
        let resolved = resolver::resolve_named(self.handle.capabilities(), name, value)?;
        forwarder::set_named(resolved, self.builder()).map(Self::new)
    }
}
