//! Legacy request-builder generation (protocol 1.0.0).
//!
//! Implements the port traits defined in the [`chain`] crate
//! (`RootSurface`, `MethodSurface`) over the native in-place
//! [`LegacyRequestBuilder`].
//!
//! ## Architectural Layer
//!
//! **Adapter.** Native builders here mutate in place and report misuse as
//! [`chain::RuntimeFailure`]s; the surface types clone before every mutation
//! so the handles handed to `chain` behave as immutable values.
//!
//! ## Quick start
//!
//! ```
//! use chain::{ResourceMethod, ResourceName, ResourceSpec, RootBuilderWrapper};
//! use legacy::LegacyRootBuilders;
//!
//! let spec = ResourceSpec::new(ResourceName::new("greetings").unwrap())
//!     .with_methods([ResourceMethod::Get]);
//! let root: RootBuilderWrapper<i64, String> =
//!     RootBuilderWrapper::new(LegacyRootBuilders::new(&spec));
//! let request = root.get().unwrap().id(7).unwrap().build().unwrap();
//! assert_eq!(request.data().id, Some(7));
//! ```

pub mod builder;
pub mod surface;

pub use builder::{LegacyRequestBuilder, LEGACY_PROTOCOL};
pub use surface::{LegacyMethodBuilder, LegacyRootBuilders};
