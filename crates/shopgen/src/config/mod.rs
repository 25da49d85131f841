pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config, load_config_from_str, load_config_from_yaml};
pub use schema::{
    BatchSettings, Config, LogFormat, LoggingConfig, MatchingConfig, QualityConfig,
};
