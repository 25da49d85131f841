use std::path::{Path, PathBuf};

use log::debug;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub const SUPPORTED_VERSION: &str = "1.0";

/// `<config dir>/shopgen/config.json`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shopgen").join("config.json"))
}

/// Loads a config file. `.yaml`/`.yml` files are read as YAML, anything
/// else as JSON.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Loading config from {:?}", path);

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        load_config_from_yaml(&content)
    } else {
        load_config_from_str(&content)
    }
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_config_from_yaml(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != SUPPORTED_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.batch.batch_limit == 0 {
        return Err(ConfigError::Validation {
            message: "batch.batch_limit must be at least 1".to_string(),
        });
    }

    let threshold = config.matching.similarity_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::Validation {
            message: format!(
                "matching.similarity_threshold must be within [0, 1], got {}",
                threshold
            ),
        });
    }

    let quality = &config.quality;
    if quality.min_price > quality.max_price {
        return Err(ConfigError::Validation {
            message: format!(
                "quality.min_price ({}) exceeds quality.max_price ({})",
                quality.min_price, quality.max_price
            ),
        });
    }

    if quality.min_title_length > quality.max_title_length {
        return Err(ConfigError::Validation {
            message: format!(
                "quality.min_title_length ({}) exceeds quality.max_title_length ({})",
                quality.min_title_length, quality.max_title_length
            ),
        });
    }

    Ok(())
}
