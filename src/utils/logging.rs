//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber built from [`LoggingConfig`]:
//! plain or JSON lines, to stderr and/or a file. `RUST_LOG` overrides the
//! configured level when set.

use crate::config::LoggingConfig;
use crate::error::{constants, ProtocolError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Install the global subscriber. Fails if one is already installed or the
/// log file cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.log_to_console {
        layers.push(output_layer(config.json_format, std::io::stderr));
    }

    if config.log_to_file {
        let path = config.log_file_path.as_deref().ok_or_else(|| {
            ProtocolError::ConfigError(format!(
                "{}: log_file_path is not set",
                constants::ERR_LOGGING_INIT
            ))
        })?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                ProtocolError::ConfigError(format!("{}: {path}: {e}", constants::ERR_LOGGING_INIT))
            })?;
        layers.push(output_layer(config.json_format, Mutex::new(file)));
    }

    let subscriber = tracing_subscriber::registry()
        .with(layers)
        .with(build_env_filter(config));

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        ProtocolError::ConfigError(format!("{}: {e}", constants::ERR_LOGGING_INIT))
    })?;

    info!(
        app = %config.app_name,
        level = %config.log_level,
        json = config.json_format,
        "Logging initialized"
    );
    Ok(())
}

fn output_layer<W>(json: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_target(true);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy()
}
