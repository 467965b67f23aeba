//! Error types for the codec crate.

use thiserror::Error;

/// Failure to negotiate, encode, or decode a [`crate::DataMap`].
#[derive(Debug, Error)]
pub enum CodecError {
    /// The content-type string violates media-type syntax.
    #[error("malformed content type '{value}': {reason}")]
    MalformedContentType { value: String, reason: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack encode failed: {0}")]
    MsgPackEncode(String),

    #[error("MessagePack decode failed: {0}")]
    MsgPackDecode(#[from] rmpv::decode::Error),

    #[error("{0} trailing bytes after the encoded value")]
    TrailingBytes(usize),

    #[error("invalid base64 in tagged bytes: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A value the target (or source) encoding cannot carry faithfully.
    #[error("cannot represent {0}")]
    Unrepresentable(String),

    #[error("top-level value is {0}, expected a map")]
    NotAMap(&'static str),
}

impl CodecError {
    pub(crate) fn malformed(value: &str, reason: &'static str) -> Self {
        CodecError::MalformedContentType {
            value: value.to_string(),
            reason,
        }
    }
}
