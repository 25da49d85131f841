//! Store category taxonomy: snapshots, tree navigation and wholesale sync.

pub mod category;
pub mod provider;
pub mod store;
pub mod tree;

pub use category::Category;
pub use provider::{parse_categories, TaxonomyProvider};
pub use store::TaxonomyStore;
pub use tree::Taxonomy;
