//! `datamap` CLI entry point.
//!
//! Composition root for the codec:
//!
//! 1. **Parse configuration**: load `datamap.toml` (or `--config`), then apply
//!    flag and environment overrides.
//! 2. **Wire observability**: configure `tracing-subscriber` on stderr with a
//!    JSON or pretty layer, so stdout carries only command output.
//! 3. **Run the command**: `convert` re-encodes a data map from one content
//!    type to another; `negotiate` reports which encoding a content type
//!    selects.

mod config;

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use codec::ContentNegotiatedCodec;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{CliConfig, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "datamap")]
#[command(about = "Convert structured data maps between content types")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "DATAMAP_CONFIG", default_value = "datamap.toml")]
    config: PathBuf,

    /// Log format (overrides config file)
    #[arg(long, env = "DATAMAP_LOG_FORMAT", value_enum)]
    log_format: Option<LogFormat>,

    /// Media type selecting the binary encoding (overrides config file)
    #[arg(long, env = "DATAMAP_BINARY_MEDIA_TYPE")]
    binary_media_type: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a data map under one content type and encode it under another
    Convert {
        /// Content type of the input; JSON when omitted
        #[arg(long)]
        from: Option<String>,

        /// Content type of the output; JSON when omitted
        #[arg(long)]
        to: Option<String>,

        /// Input file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the encoding a content type selects
    Negotiate {
        /// Content type to classify; absent means no header
        content_type: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(&cli.config)?;
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
    if let Some(media_type) = cli.binary_media_type {
        config.codec.binary_media_type = media_type;
    }

    init_tracing(&config.log);
    debug!(config = ?config, "Loaded configuration");

    let codec = ContentNegotiatedCodec::new(&config.codec).context("invalid codec configuration")?;
    debug!(binary_media_type = %codec.binary_media_type(), "Codec ready");

    match cli.command {
        Command::Convert {
            from,
            to,
            input,
            output,
        } => convert(&codec, from.as_deref(), to.as_deref(), input, output),
        Command::Negotiate { content_type } => {
            let encoding = codec.negotiate(content_type.as_deref())?;
            println!("{encoding}");
            Ok(())
        }
    }
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn convert(
    codec: &ContentNegotiatedCodec,
    from: Option<&str>,
    to: Option<&str>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let bytes = match &input {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let map = codec
        .decode(from, &bytes)
        .with_context(|| format!("decoding input as {}", from.unwrap_or("<none>")))?;
    let encoded = codec
        .encode(to, &map)
        .with_context(|| format!("encoding output as {}", to.unwrap_or("<none>")))?;

    match &output {
        Some(path) => {
            std::fs::write(path, &encoded).with_context(|| format!("writing {}", path.display()))?
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&encoded).context("writing stdout")?;
            stdout.flush().context("flushing stdout")?;
        }
    }

    info!(
        entries = map.len(),
        input_bytes = bytes.len(),
        output_bytes = encoded.len(),
        "Converted data map"
    );
    Ok(())
}
