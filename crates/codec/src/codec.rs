//! Content-type negotiation between the two encodings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::CodecConfig;
use crate::content_type::MediaType;
use crate::errors::CodecError;
use crate::value::DataMap;
use crate::{json, msgpack};

/// The two supported encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Compact tokenized binary form (MessagePack).
    Binary,
    /// Structured text (JSON).
    Textual,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Binary => f.write_str("binary"),
            Encoding::Textual => f.write_str("textual"),
        }
    }
}

/// Encodes and decodes [`DataMap`]s under a content type.
///
/// The binary encoding is used iff the content type parses and has the same
/// type and subtype as the configured binary media type. Every other valid
/// content type, and a missing one, selects the textual encoding. Only a
/// syntactically invalid content type is an error.
#[derive(Debug, Clone)]
pub struct ContentNegotiatedCodec {
    header: String,
    binary: MediaType,
}

impl Default for ContentNegotiatedCodec {
    fn default() -> Self {
        Self {
            header: crate::config::DEFAULT_CONTENT_TYPE_HEADER.to_string(),
            binary: MediaType::from_tokens("application", "x-msgpack"),
        }
    }
}

impl ContentNegotiatedCodec {
    /// Fails if the configured binary media type is itself malformed.
    pub fn new(config: &CodecConfig) -> Result<Self, CodecError> {
        Ok(Self {
            header: config.content_type_header.clone(),
            binary: MediaType::parse(&config.binary_media_type)?,
        })
    }

    /// The canonical media type of the binary encoding.
    pub fn binary_media_type(&self) -> &MediaType {
        &self.binary
    }

    pub fn negotiate(&self, content_type: Option<&str>) -> Result<Encoding, CodecError> {
        let encoding = match content_type {
            None => Encoding::Textual,
            Some(raw) => {
                if MediaType::parse(raw)?.same_essence(&self.binary) {
                    Encoding::Binary
                } else {
                    Encoding::Textual
                }
            }
        };
        trace!(content_type = ?content_type, encoding = %encoding, "Negotiated encoding");
        Ok(encoding)
    }

    pub fn encode(&self, content_type: Option<&str>, value: &DataMap) -> Result<Vec<u8>, CodecError> {
        match self.negotiate(content_type)? {
            Encoding::Binary => msgpack::encode(value),
            Encoding::Textual => json::encode(value),
        }
    }

    pub fn decode(&self, content_type: Option<&str>, bytes: &[u8]) -> Result<DataMap, CodecError> {
        match self.negotiate(content_type)? {
            Encoding::Binary => msgpack::decode(bytes),
            Encoding::Textual => json::decode(bytes),
        }
    }

    /// Finds the content type in `headers`; the header name matches
    /// case-insensitively.
    pub fn content_type<'h>(&self, headers: &'h BTreeMap<String, String>) -> Option<&'h str> {
        headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&self.header))
            .map(|(_, value)| value.as_str())
    }

    pub fn encode_with_headers(
        &self,
        headers: &BTreeMap<String, String>,
        value: &DataMap,
    ) -> Result<Vec<u8>, CodecError> {
        self.encode(self.content_type(headers), value)
    }

    pub fn decode_with_headers(
        &self,
        headers: &BTreeMap<String, String>,
        bytes: &[u8],
    ) -> Result<DataMap, CodecError> {
        self.decode(self.content_type(headers), bytes)
    }
}
