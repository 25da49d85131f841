//! Product drafts parsed from AI responses.

pub mod bulk;
pub mod draft;

pub use bulk::{add_categories, add_tags, adjust_prices, find_replace, PriceAdjustment, TextField};
pub use draft::{extract_json, parse_price, variation_price, ProductDraft};
