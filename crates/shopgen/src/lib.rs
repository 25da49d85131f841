pub mod batch;
pub mod broadcast;
pub mod categorizer;
pub mod config;
pub mod error;
pub mod product;
pub mod quality;
pub mod taxonomy;
pub mod telemetry;

pub use batch::{
    BatchConfig, BatchEvent, BatchReport, BatchRunner, ProgressReporter, RunState, StopHandle,
    TaskExecutor, TaskState,
};
pub use broadcast::{BatchProgressBroadcaster, BatchProgressEvent};
pub use categorizer::{CategoryMatcher, MatchQuery, MatchResult};
pub use config::{load_config, Config};
pub use error::{
    BatchError, BulkEditError, ConfigError, DraftError, Result, ShopgenError, TaskError,
    TaxonomyError, TelemetryError,
};
pub use product::{PriceAdjustment, ProductDraft, TextField};
pub use quality::{QualityChecker, QualityReport};
pub use taxonomy::{Category, Taxonomy, TaxonomyProvider, TaxonomyStore};
pub use telemetry::init_logging;
