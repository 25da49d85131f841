use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            batch: BatchSettings::default(),
            matching: MatchingConfig::default(),
            quality: QualityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Pacing of batch generation against the AI provider's rate limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchSettings {
    /// Products generated back to back before a mandatory pause.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
    /// Length of the batch pause, also used as rate-limit backoff.
    #[serde(default = "default_batch_pause_seconds")]
    pub batch_pause_seconds: u64,
    /// Delay between consecutive task starts within a batch.
    #[serde(default = "default_inter_task_delay_ms")]
    pub inter_task_delay_ms: u64,
    /// Cap on rate-limit retries per task. Unbounded when absent.
    #[serde(default)]
    pub max_rate_limit_retries: Option<u32>,
}

fn default_batch_limit() -> usize {
    10
}

fn default_batch_pause_seconds() -> u64 {
    30
}

fn default_inter_task_delay_ms() -> u64 {
    900
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_limit: default_batch_limit(),
            batch_pause_seconds: default_batch_pause_seconds(),
            inter_task_delay_ms: default_inter_task_delay_ms(),
            max_rate_limit_retries: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchingConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_similarity_threshold() -> f64 {
    crate::categorizer::DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

/// Thresholds applied to generated drafts before upload. Prices are in the
/// store currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityConfig {
    #[serde(default = "default_min_title_length")]
    pub min_title_length: usize,
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
    #[serde(default = "default_min_description_length")]
    pub min_description_length: usize,
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
    #[serde(default = "default_true")]
    pub require_categories: bool,
    #[serde(default = "default_true")]
    pub require_images: bool,
}

fn default_min_title_length() -> usize {
    10
}

fn default_max_title_length() -> usize {
    120
}

fn default_min_description_length() -> usize {
    50
}

fn default_min_price() -> f64 {
    10.0
}

fn default_max_price() -> f64 {
    999_999.0
}

fn default_true() -> bool {
    true
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_title_length: default_min_title_length(),
            max_title_length: default_max_title_length(),
            min_description_length: default_min_description_length(),
            min_price: default_min_price(),
            max_price: default_max_price(),
            require_categories: true,
            require_images: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
