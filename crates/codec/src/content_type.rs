//! Media-type parsing.
//!
//! Accepts `type "/" subtype *( ";" attribute "=" value )` where type, subtype
//! and attribute are RFC 2045 tokens and a value is a token or a quoted
//! string. Whitespace is allowed around the whole string and around each
//! `;`. Type and subtype compare case-insensitively.

use std::fmt;
use std::str::FromStr;

use crate::errors::CodecError;

/// A parsed media type such as `application/x-msgpack; v=2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    kind: String,
    subtype: String,
    params: Vec<(String, String)>,
}

impl MediaType {
    /// Builds a parameterless media type from two known-valid tokens.
    pub(crate) fn from_tokens(kind: &str, subtype: &str) -> Self {
        Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params: Vec::new(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, CodecError> {
        let mut p = Parser {
            input,
            rest: input.trim(),
        };

        let kind = p.token("missing type")?;
        p.expect('/', "missing '/' after type")?;
        let subtype = p.token("missing subtype")?;

        let mut params = Vec::new();
        loop {
            p.skip_whitespace();
            if p.rest.is_empty() {
                break;
            }
            p.expect(';', "expected ';' before parameter")?;
            p.skip_whitespace();
            let attribute = p.token("missing parameter name")?;
            p.expect('=', "missing '=' in parameter")?;
            let value = if p.rest.starts_with('"') {
                p.quoted()?
            } else {
                p.token("missing parameter value")?.to_string()
            };
            params.push((attribute.to_ascii_lowercase(), value));
        }

        Ok(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
        })
    }

    /// True if both name the same type and subtype; parameters are ignored.
    pub fn same_essence(&self, other: &MediaType) -> bool {
        self.kind == other.kind && self.subtype == other.subtype
    }
}

impl FromStr for MediaType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (name, value) in &self.params {
            if !value.is_empty() && value.bytes().all(is_token_byte) {
                write!(f, "; {name}={value}")?;
            } else {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "; {name}=\"{escaped}\"")?;
            }
        }
        Ok(())
    }
}

struct Parser<'a> {
    input: &'a str,
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn fail(&self, reason: &'static str) -> CodecError {
        CodecError::malformed(self.input, reason)
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t']);
    }

    fn expect(&mut self, c: char, reason: &'static str) -> Result<(), CodecError> {
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                Ok(())
            }
            None => Err(self.fail(reason)),
        }
    }

    fn token(&mut self, reason: &'static str) -> Result<&'a str, CodecError> {
        let end = self
            .rest
            .bytes()
            .position(|b| !is_token_byte(b))
            .unwrap_or(self.rest.len());
        if end == 0 {
            return Err(self.fail(reason));
        }
        let (token, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(token)
    }

    fn quoted(&mut self) -> Result<String, CodecError> {
        let mut out = String::new();
        let mut chars = self.rest.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.rest = &self.rest[i + 1..];
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                c if c.is_control() && c != '\t' => {
                    return Err(self.fail("control character in quoted value"))
                }
                c => out.push(c),
            }
        }
        Err(self.fail("unterminated quoted value"))
    }
}

/// RFC 2045 token characters: printable ASCII except space and tspecials.
fn is_token_byte(b: u8) -> bool {
    (0x21..0x7f).contains(&b) && !b"()<>@,;:\\\"/[]?=".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_type_subtype_and_params() {
        let mt = MediaType::parse("  Application/X-MsgPack ; charset=utf-8;q=\"a; b\"  ")
            .expect("valid media type");
        assert_eq!((mt.kind.as_str(), mt.subtype.as_str()), ("application", "x-msgpack"));
        assert_eq!(
            mt.params,
            vec![
                ("charset".to_string(), "utf-8".to_string()),
                ("q".to_string(), "a; b".to_string()),
            ]
        );
    }

    #[test]
    fn test_rejects_malformed_strings() {
        for bad in [
            "",
            "not a type",
            "application",
            "application/",
            "/json",
            "application/json;",
            "application/json; charset",
            "application/json; charset=\"open",
            "application/json extra",
        ] {
            assert!(
                matches!(
                    MediaType::parse(bad),
                    Err(CodecError::MalformedContentType { .. })
                ),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_essence_comparison_ignores_case_and_params() {
        let a = MediaType::parse("application/x-msgpack; v=1").expect("valid");
        let b = MediaType::from_tokens("APPLICATION", "x-MsgPack");
        assert!(a.same_essence(&b));
        assert!(!a.same_essence(&MediaType::from_tokens("application", "json")));
    }

    #[test]
    fn test_display_quotes_non_token_values() {
        let mt = MediaType::parse("text/plain; note=\"a \\\"b\\\"\"").expect("valid");
        assert_eq!(mt.params, vec![("note".to_string(), "a \"b\"".to_string())]);
        assert_eq!(mt.to_string(), "text/plain; note=\"a \\\"b\\\"\"");
        assert_eq!(
            mt.to_string().parse::<MediaType>().expect("reparse"),
            mt
        );
    }
}
