//! CLI configuration, loaded from an optional TOML file.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use codec::CodecConfig;
use serde::Deserialize;

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable, multi-line.
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub codec: CodecConfig,
    pub log: LogConfig,
}

impl CliConfig {
    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        assert_eq!(CliConfig::parse("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let config = CliConfig::parse(
            r#"
            [codec]
            binary_media_type = "application/vnd.example+msgpack"

            [log]
            format = "pretty"
            "#,
        )
        .unwrap();
        assert_eq!(config.codec.binary_media_type, "application/vnd.example+msgpack");
        assert_eq!(config.codec.content_type_header, "Content-Type");
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.log.filter, "warn");
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        assert!(CliConfig::parse("[log]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = CliConfig::load(Path::new("/nonexistent/datamap.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }
}
