use async_trait::async_trait;

use crate::error::TaxonomyError;

use super::category::Category;

/// Source of category snapshots, typically the store's REST API.
#[async_trait]
pub trait TaxonomyProvider: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<Category>, TaxonomyError>;
}

/// Parses the body of a category-list response.
///
/// The store answers with a JSON array on success; error payloads come back
/// as objects and are rejected rather than read as an empty taxonomy.
pub fn parse_categories(json: &str) -> Result<Vec<Category>, TaxonomyError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    if !value.is_array() {
        let detail = value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("expected a JSON array of categories");
        return Err(TaxonomyError::InvalidResponse(detail.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}
