//! Edits applied across a whole set of drafts before upload.

use regex::{NoExpand, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::draft::{parse_price, variation_price, ProductDraft};
use crate::error::BulkEditError;

/// Draft fields that hold free text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    ShortDescription,
    Description,
    Sku,
    Tags,
    Categories,
}

enum FieldMut<'a> {
    Text(&'a mut String),
    List(&'a mut Vec<String>),
}

impl TextField {
    fn of(self, draft: &mut ProductDraft) -> FieldMut<'_> {
        match self {
            TextField::Title => FieldMut::Text(&mut draft.title),
            TextField::ShortDescription => FieldMut::Text(&mut draft.short_description),
            TextField::Description => FieldMut::Text(&mut draft.description),
            TextField::Sku => FieldMut::Text(&mut draft.sku),
            TextField::Tags => FieldMut::List(&mut draft.tags),
            TextField::Categories => FieldMut::List(&mut draft.categories),
        }
    }
}

/// Replaces every case-insensitive occurrence of `find` in `field`.
///
/// `find` is literal text and `replace` is inserted as-is. Returns how many
/// values changed: one per text field, or one per list item.
pub fn find_replace(
    drafts: &mut [ProductDraft],
    field: TextField,
    find: &str,
    replace: &str,
) -> Result<usize, BulkEditError> {
    if find.is_empty() {
        return Err(BulkEditError::EmptySearch);
    }
    let pattern = RegexBuilder::new(&regex::escape(find))
        .case_insensitive(true)
        .build()?;

    let replace_in = |value: &mut String| {
        let replaced = pattern.replace_all(value.as_str(), NoExpand(replace));
        if replaced == value.as_str() {
            return false;
        }
        *value = replaced.into_owned();
        true
    };

    let mut changed = 0;
    for draft in drafts.iter_mut() {
        match field.of(draft) {
            FieldMut::Text(value) => changed += usize::from(replace_in(value)),
            FieldMut::List(items) => {
                for item in items.iter_mut() {
                    changed += usize::from(replace_in(item));
                }
            }
        }
    }

    log::info!("Replaced '{}' in {} {:?} values", find, changed, field);
    Ok(changed)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "operation", content = "value", rename_all = "snake_case")]
pub enum PriceAdjustment {
    Add(f64),
    /// Never goes below zero.
    Subtract(f64),
    /// Percentage change: `Percent(10.0)` adds 10%.
    Percent(f64),
    Set(f64),
}

impl PriceAdjustment {
    fn amount(self) -> f64 {
        match self {
            PriceAdjustment::Add(v)
            | PriceAdjustment::Subtract(v)
            | PriceAdjustment::Percent(v)
            | PriceAdjustment::Set(v) => v,
        }
    }

    pub fn apply(self, price: f64) -> f64 {
        match self {
            PriceAdjustment::Add(v) => price + v,
            PriceAdjustment::Subtract(v) => (price - v).max(0.0),
            PriceAdjustment::Percent(v) => price * (1.0 + v / 100.0),
            PriceAdjustment::Set(v) => v,
        }
    }
}

fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Applies `adjustment` to every draft price and every variation price.
///
/// An unreadable price counts as 0. A variation without a usable price is
/// adjusted from its product's price before the change.
pub fn adjust_prices(
    drafts: &mut [ProductDraft],
    adjustment: PriceAdjustment,
) -> Result<(), BulkEditError> {
    let amount = adjustment.amount();
    if !amount.is_finite() {
        return Err(BulkEditError::InvalidAmount(amount));
    }

    for draft in drafts.iter_mut() {
        let current = parse_price(&draft.price).unwrap_or(0.0);
        draft.price = format_price(adjustment.apply(current));

        for variation in draft.variations.iter_mut() {
            let base = variation_price(variation)
                .filter(|price| *price != 0.0)
                .unwrap_or(current);
            if let Value::Object(fields) = variation {
                fields.insert(
                    "price".to_string(),
                    Value::String(format_price(adjustment.apply(base))),
                );
            }
        }
    }

    log::info!("Adjusted prices of {} drafts: {:?}", drafts.len(), adjustment);
    Ok(())
}

/// Appends tags each draft does not already carry. Blank tags are ignored.
/// Returns the number of tags added.
pub fn add_tags<S: AsRef<str>>(drafts: &mut [ProductDraft], tags: &[S]) -> usize {
    let tags: Vec<&str> = tags
        .iter()
        .map(|tag| tag.as_ref().trim())
        .filter(|tag| !tag.is_empty())
        .collect();

    let mut added = 0;
    for draft in drafts.iter_mut() {
        for tag in &tags {
            if !draft.tags.iter().any(|existing| existing == tag) {
                draft.tags.push(tag.to_string());
                added += 1;
            }
        }
    }
    added
}

/// Adds store category ids to each draft's selection, skipping ones
/// already selected.
pub fn add_categories(drafts: &mut [ProductDraft], category_ids: &[u64]) {
    for draft in drafts.iter_mut() {
        for id in category_ids {
            if !draft.selected_categories.contains(id) {
                draft.selected_categories.push(*id);
            }
        }
    }
}
