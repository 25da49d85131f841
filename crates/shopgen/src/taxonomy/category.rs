use serde::{Deserialize, Serialize};

/// A store category as returned by the WooCommerce categories endpoint.
///
/// Only the fields the generator cares about are kept; everything else in
/// the store's payload is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    /// Display name. Missing or `null` names deserialize as an empty string.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Parent category id; `0` marks a root.
    #[serde(default, alias = "parent_id", deserialize_with = "null_as_zero")]
    pub parent: u64,
    /// Number of products in the category. Informational only.
    #[serde(default, alias = "product_count", deserialize_with = "null_as_zero")]
    pub count: u64,
}

impl Category {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: 0,
            count: 0,
        }
    }

    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent == 0
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}
