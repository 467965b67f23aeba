//! One fluent request-builder surface over two builder generations.
//!
//! Test logic written against [`RootBuilderWrapper`] and
//! [`MethodBuilderWrapper`] drives either the legacy or the current builder
//! generation without change. Each generation implements the port traits in
//! [`surface`]; this crate resolves every call against the handle's advertised
//! capabilities, forwards it, and translates faults.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies
//! and no knowledge of either generation. The `legacy` and `modern` crates
//! supply the implementations; the caller picks one explicitly.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype names (`OperationName`, `ResourceName`, `ParamName`) |
//! | [`types`] | Tagged parameter values, patches, built requests, response markers |
//! | [`resource`] | `ResourceSpec`, the description generations derive their tables from |
//! | [`naming`] | Conventions for dynamically named operations |
//! | [`surface`] | Port traits and the fixed operation table |
//! | [`resolver`] | Exact-signature and shape-inference resolution |
//! | [`forwarder`] | Invocation and fault translation |
//! | [`wrapper`] | `MethodBuilderWrapper`, the immutable chain state |
//! | [`root`] | `RootBuilderWrapper`, one entry point per resource method |
//! | [`errors`] | Error taxonomy |
//!
//! ## Concurrency
//!
//! Everything is synchronous. Wrappers are single-owner: deriving a new chain
//! state never mutates the old one, but a single wrapper is not safe to share
//! across threads and is neither `Send` nor `Sync`.

pub mod errors;
pub mod forwarder;
pub mod identifiers;
pub mod naming;
pub mod resolver;
pub mod resource;
pub mod root;
pub mod surface;
pub mod types;
pub mod wrapper;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{InvocationFailure, OperationFault, ResolutionError, RuntimeFailure, ShimError};
pub use identifiers::{OperationName, ParamName, ResourceName};
pub use resolver::{ResolutionMode, ResolvedOperation};
pub use resource::{ActionSpec, FinderSpec, ParamSpec, ResourceSpec};
pub use root::RootBuilderWrapper;
pub use surface::{
    CapabilitySet, MethodHandle, MethodSurface, OperationSignature, ParamType, RootSurface,
    Setter, SetterCall, Terminal,
};
pub use types::{
    ActionResponse, BatchKvResponse, BatchResponse, CollectionResponse, CreateStatus, EmptyRecord,
    EntityResponse, KeyedBatchRequest, OptionsResponse, Paging, ParamValue, PatchRequest,
    PathSpec, ProtocolVersion, Record, Request, RequestData, RequestInput, ResourceKey,
    ResourceMethod, ResponseKind, ResponseType, UpdateStatus, ValueKind,
};
pub use wrapper::MethodBuilderWrapper;
