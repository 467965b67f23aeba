//! Entry point over a generation's root builders.
//!
//! [`RootBuilderWrapper`] exposes one zero-argument entry point per resource
//! method. Each resolves the conventionally named root operation on the
//! wrapped [`RootSurface`] and returns a [`MethodBuilderWrapper`] whose
//! response type matches the method.

use std::fmt;

use crate::errors::ShimError;
use crate::surface::RootSurface;
use crate::{
    forwarder, naming, resolver, ActionResponse, BatchKvResponse, BatchResponse,
    CollectionResponse, CreateStatus, EmptyRecord, EntityResponse, MethodBuilderWrapper,
    OperationName, OptionsResponse, Record, ResourceKey, ResourceMethod, UpdateStatus,
};

/// Uniform root over either builder generation.
///
/// Construct it with the generation's root builders; the generation is chosen
/// by the caller, never discovered.
pub struct RootBuilderWrapper<K, V> {
    root: Box<dyn RootSurface<K, V>>,
}

impl<K, V> fmt::Debug for RootBuilderWrapper<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootBuilderWrapper")
            .field("root", &self.root)
            .finish()
    }
}

impl<K: ResourceKey, V: Record> RootBuilderWrapper<K, V> {
    pub fn new(root: impl RootSurface<K, V> + 'static) -> Self {
        Self {
            root: Box::new(root),
        }
    }

    /// The wrapped generation root.
    pub fn builder(&self) -> &dyn RootSurface<K, V> {
        self.root.as_ref()
    }

    pub fn get(&self) -> Result<MethodBuilderWrapper<K, V, EntityResponse<V>>, ShimError> {
        self.fixed(ResourceMethod::Get)
    }

    pub fn create(&self) -> Result<MethodBuilderWrapper<K, V, EmptyRecord>, ShimError> {
        self.fixed(ResourceMethod::Create)
    }

    pub fn update(&self) -> Result<MethodBuilderWrapper<K, V, EmptyRecord>, ShimError> {
        self.fixed(ResourceMethod::Update)
    }

    pub fn delete(&self) -> Result<MethodBuilderWrapper<K, V, EmptyRecord>, ShimError> {
        self.fixed(ResourceMethod::Delete)
    }

    pub fn partial_update(&self) -> Result<MethodBuilderWrapper<K, V, EmptyRecord>, ShimError> {
        self.fixed(ResourceMethod::PartialUpdate)
    }

    pub fn batch_get(&self) -> Result<MethodBuilderWrapper<K, V, BatchResponse<V>>, ShimError> {
        self.fixed(ResourceMethod::BatchGet)
    }

    pub fn batch_create(
        &self,
    ) -> Result<MethodBuilderWrapper<K, V, CollectionResponse<CreateStatus>>, ShimError> {
        self.fixed(ResourceMethod::BatchCreate)
    }

    pub fn batch_partial_update(
        &self,
    ) -> Result<MethodBuilderWrapper<K, V, BatchKvResponse<K, UpdateStatus>>, ShimError> {
        self.fixed(ResourceMethod::BatchPartialUpdate)
    }

    pub fn batch_update(
        &self,
    ) -> Result<MethodBuilderWrapper<K, V, BatchKvResponse<K, UpdateStatus>>, ShimError> {
        self.fixed(ResourceMethod::BatchUpdate)
    }

    pub fn batch_delete(
        &self,
    ) -> Result<MethodBuilderWrapper<K, V, BatchKvResponse<K, UpdateStatus>>, ShimError> {
        self.fixed(ResourceMethod::BatchDelete)
    }

    pub fn get_all(&self) -> Result<MethodBuilderWrapper<K, V, CollectionResponse<V>>, ShimError> {
        self.fixed(ResourceMethod::GetAll)
    }

    pub fn options(&self) -> Result<MethodBuilderWrapper<K, V, OptionsResponse>, ShimError> {
        self.fixed(ResourceMethod::Options)
    }

    /// Opens finder `name` through `findBy<Name>`.
    pub fn find_by(
        &self,
        name: &str,
    ) -> Result<MethodBuilderWrapper<K, V, CollectionResponse<V>>, ShimError> {
        self.open(naming::finder_verb(name))
    }

    /// Opens action `name` through `action<Name>`; `T` is the action's return type.
    pub fn action<T>(
        &self,
        name: &str,
    ) -> Result<MethodBuilderWrapper<K, V, ActionResponse<T>>, ShimError> {
        self.open(naming::action_verb(name))
    }

    fn fixed<R>(&self, method: ResourceMethod) -> Result<MethodBuilderWrapper<K, V, R>, ShimError> {
        self.open(naming::root_verb(method))
    }

    fn open<R>(&self, verb: OperationName) -> Result<MethodBuilderWrapper<K, V, R>, ShimError> {
        let resolved = resolver::resolve_root(self.root.capabilities(), verb)?;
        forwarder::open(resolved, self.builder()).map(MethodBuilderWrapper::new)
    }
}
