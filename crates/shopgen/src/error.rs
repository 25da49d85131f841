use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopgenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("Product draft error: {0}")]
    Draft(#[from] DraftError),

    #[error("Bulk edit error: {0}")]
    BulkEdit(#[from] BulkEditError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Failed to parse categories JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Invalid categories response: {0}")]
    InvalidResponse(String),

    #[error("Category provider failed: {0}")]
    Provider(String),
}

/// Usage errors raised synchronously by [`crate::batch::BatchRunner::start`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Cannot start a batch with zero tasks")]
    EmptyBatch,

    #[error("A batch run is already in progress")]
    AlreadyRunning,
}

/// Failure reported by a task executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("{message}")]
    Failed { message: String },
}

impl TaskError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        TaskError::RateLimited {
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed {
            message: message.into(),
        }
    }

    /// Classifies a free-form failure message.
    ///
    /// Messages carrying an HTTP `429` or the words "rate limit" (any case)
    /// become [`TaskError::RateLimited`]; everything else is a plain failure.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_rate_limit_message(&message) {
            TaskError::RateLimited { message }
        } else {
            TaskError::Failed { message }
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TaskError::RateLimited { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            TaskError::RateLimited { message } | TaskError::Failed { message } => message,
        }
    }
}

fn is_rate_limit_message(message: &str) -> bool {
    message.contains("429") || message.to_lowercase().contains("rate limit")
}

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("No JSON object found in AI response")]
    NoJson,

    #[error("AI response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("AI did not return valid product data: missing title")]
    MissingTitle,
}

#[derive(Error, Debug)]
pub enum BulkEditError {
    #[error("Nothing to find: search text is empty")]
    EmptySearch,

    #[error("Invalid search text: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid price amount: {0}")]
    InvalidAmount(f64),
}

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to install log bridge: {0}")]
    LogBridge(#[from] log::SetLoggerError),

    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub type Result<T> = std::result::Result<T, ShopgenError>;
