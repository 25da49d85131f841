use std::sync::{Arc, RwLock};

use log::{info, warn};

use crate::error::TaxonomyError;

use super::category::Category;
use super::provider::TaxonomyProvider;
use super::tree::Taxonomy;

/// Holds the current taxonomy snapshot.
///
/// Snapshots are replaced wholesale on every sync; readers keep whatever
/// `Arc` they took for the duration of their matching work.
#[derive(Debug, Default)]
pub struct TaxonomyStore {
    current: RwLock<Arc<Taxonomy>>,
}

impl TaxonomyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            current: RwLock::new(Arc::new(Taxonomy::new(categories))),
        }
    }

    pub fn snapshot(&self) -> Arc<Taxonomy> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace(&self, categories: Vec<Category>) -> Arc<Taxonomy> {
        let taxonomy = Arc::new(Taxonomy::new(categories));
        match self.current.write() {
            Ok(mut guard) => *guard = Arc::clone(&taxonomy),
            Err(poisoned) => *poisoned.into_inner() = Arc::clone(&taxonomy),
        }
        taxonomy
    }

    /// Fetches a fresh snapshot from `provider` and installs it.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn sync(
        &self,
        provider: &dyn TaxonomyProvider,
    ) -> Result<Arc<Taxonomy>, TaxonomyError> {
        match provider.fetch_categories().await {
            Ok(categories) => {
                let taxonomy = self.replace(categories);
                info!("Synced {} categories", taxonomy.len());
                Ok(taxonomy)
            }
            Err(e) => {
                warn!("Failed to sync categories: {}", e);
                Err(e)
            }
        }
    }
}
