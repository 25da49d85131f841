//! Process-wide logging setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::TelemetryError;

/// Installs the global subscriber and routes `log` records into it.
///
/// `RUST_LOG` wins over `config.level` when set. Calling this twice returns
/// an error instead of replacing the first subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };

    tracing_log::LogTracer::init()?;

    match config.format {
        LogFormat::Plain => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().with_target(false));
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().json().with_target(false));
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

fn level_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(level).map_err(|e| TelemetryError::InvalidFilter {
        filter: level.to_string(),
        reason: e.to_string(),
    })
}
