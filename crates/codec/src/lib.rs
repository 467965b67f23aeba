//! Content-negotiated encoding of structured data maps.
//!
//! [`ContentNegotiatedCodec`] picks one of two encodings from a content-type
//! string or header map: MessagePack when the content type names the
//! configured binary media type, JSON in every other case.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`value`] | `DataValue` and `DataMap`, the encoding-neutral model |
//! | [`content_type`] | Media-type parsing |
//! | [`codec`] | Negotiation and dispatch |
//! | [`json`] | Textual encoding |
//! | [`msgpack`] | Binary encoding |
//! | [`config`] | `CodecConfig` |
//! | [`errors`] | `CodecError` |

pub mod codec;
pub mod config;
pub mod content_type;
pub mod errors;
pub mod json;
pub mod msgpack;
pub mod value;

pub use codec::{ContentNegotiatedCodec, Encoding};
pub use config::CodecConfig;
pub use content_type::MediaType;
pub use errors::CodecError;
pub use value::{DataMap, DataValue};
