use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::categorizer::{CategoryMatcher, MatchQuery, MatchResult};
use crate::error::DraftError;
use crate::taxonomy::Taxonomy;

// First '{' or '[' through the last matching closer, across newlines.
static RE_JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}|\[.*\]").unwrap());
static RE_TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Pulls the JSON payload out of a model reply that may be wrapped in
/// markdown fences or prose, dropping trailing commas models like to emit.
pub fn extract_json(text: &str) -> Option<String> {
    let span = RE_JSON_SPAN.find(text)?;
    let cleaned = RE_TRAILING_COMMA.replace_all(span.as_str(), "$1");
    Some(cleaned.trim().to_string())
}

/// Parses the numeric prefix of a price string ("99.50 MAD" -> 99.5).
pub fn parse_price(raw: &str) -> Option<f64> {
    let raw = raw.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in raw.char_indices() {
        if c.is_ascii_digit() {
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
    }
    if end == 0 {
        return None;
    }
    raw[..end].parse().ok()
}

/// Price of a raw variation object, if it has a readable one.
pub fn variation_price(variation: &Value) -> Option<f64> {
    match variation.get("price")? {
        Value::String(s) => parse_price(s),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// A product listing generated from images, before upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductDraft {
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Category names suggested by the model. Not store ids.
    pub categories: Vec<String>,
    pub sku: String,
    /// Digits and dots only, e.g. "1299.00".
    pub price: String,
    pub attributes: Vec<Value>,
    /// Raw variation objects; each is expected to carry a `price`.
    pub variations: Vec<Value>,
    pub default_attributes: Vec<Value>,
    /// Store category ids, filled by [`ProductDraft::assign_categories`].
    pub selected_categories: Vec<u64>,
    pub gallery_image_urls: Vec<String>,
    pub category_localized: Option<String>,
}

impl ProductDraft {
    pub fn from_ai_response(text: &str) -> Result<Self, DraftError> {
        let json = extract_json(text).ok_or(DraftError::NoJson)?;
        let value: Value = serde_json::from_str(&json)?;

        let empty = Map::new();
        let fields = value.as_object().unwrap_or(&empty);

        let title = match fields.get("title") {
            Some(Value::String(title)) if !title.is_empty() => title.clone(),
            _ => return Err(DraftError::MissingTitle),
        };

        let sku = match string_field(fields, "sku") {
            sku if sku.is_empty() => format!("SKU-{}", Utc::now().timestamp_millis()),
            sku => sku,
        };

        Ok(Self {
            title,
            short_description: string_field(fields, "short_description"),
            description: string_field(fields, "description"),
            tags: string_list(fields.get("tags")),
            categories: string_list(fields.get("categories")),
            sku,
            price: normalize_price(fields.get("price")),
            attributes: array_field(fields, "attributes"),
            variations: array_field(fields, "variations"),
            default_attributes: array_field(fields, "default_attributes"),
            ..Self::default()
        })
    }

    pub fn price_value(&self) -> Option<f64> {
        parse_price(&self.price)
    }

    pub fn match_query(&self, localized: Option<&str>) -> MatchQuery {
        MatchQuery::from_suggestions(&self.categories, localized)
    }

    /// Maps the suggested category names onto store categories.
    pub fn assign_categories(
        &mut self,
        matcher: &CategoryMatcher,
        taxonomy: &Taxonomy,
        localized: Option<&str>,
    ) -> MatchResult {
        let result = matcher.match_query(taxonomy, &self.match_query(localized));
        log::debug!(
            "Matched {} categories for '{}'",
            result.len(),
            self.title
        );

        self.category_localized = localized.map(str::to_string);
        self.selected_categories = result.matched_ids.clone();
        result
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn array_field(fields: &Map<String, Value>, key: &str) -> Vec<Value> {
    match fields.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn normalize_price(value: Option<&Value>) -> String {
    let raw = match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => "0".to_string(),
    };
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}
