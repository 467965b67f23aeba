//! Current request-builder generation (protocol 2.0.0).
//!
//! Implements the port traits defined in the [`chain`] crate over the
//! consuming [`ModernRequestBuilder`].
//!
//! ## Architectural Layer
//!
//! **Adapter.** Unlike the legacy generation, misuse other than bad paging is
//! reported as a [`ModernBuilderError`]; `chain` surfaces those wrapped in an
//! [`chain::InvocationFailure`] whose cause downcasts back to this type.

pub mod builder;
pub mod errors;
pub mod surface;

pub use builder::{ModernRequestBuilder, MODERN_PROTOCOL};
pub use errors::ModernBuilderError;
pub use surface::{ModernMethodBuilder, ModernRequestBuilders};
