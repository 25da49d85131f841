use std::time::Duration;

use crate::config::{BatchSettings, Config};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub batch_limit: usize,
    pub batch_pause_seconds: u64,
    pub inter_task_delay: Duration,
    pub max_rate_limit_retries: Option<u32>,
}

impl BatchConfig {
    pub fn from_config(config: &Config) -> Self {
        Self::from_settings(&config.batch)
    }

    pub fn from_settings(settings: &BatchSettings) -> Self {
        Self {
            // A zero limit would pause after every task; config validation
            // rejects it, this keeps hand-built settings safe too.
            batch_limit: settings.batch_limit.max(1),
            batch_pause_seconds: settings.batch_pause_seconds,
            inter_task_delay: Duration::from_millis(settings.inter_task_delay_ms),
            max_rate_limit_retries: settings.max_rate_limit_retries,
        }
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit.max(1);
        self
    }

    pub fn with_batch_pause_seconds(mut self, seconds: u64) -> Self {
        self.batch_pause_seconds = seconds;
        self
    }

    pub fn with_inter_task_delay(mut self, delay: Duration) -> Self {
        self.inter_task_delay = delay;
        self
    }

    pub fn with_max_rate_limit_retries(mut self, max: u32) -> Self {
        self.max_rate_limit_retries = Some(max);
        self
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_secs(self.batch_pause_seconds)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::from_settings(&BatchSettings::default())
    }
}
