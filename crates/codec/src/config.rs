//! Codec configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const DEFAULT_BINARY_MEDIA_TYPE: &str = "application/x-msgpack";

/// Which header carries the content type, and which media type selects the
/// binary encoding. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub content_type_header: String,
    pub binary_media_type: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            content_type_header: DEFAULT_CONTENT_TYPE_HEADER.to_string(),
            binary_media_type: DEFAULT_BINARY_MEDIA_TYPE.to_string(),
        }
    }
}
