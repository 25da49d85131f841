//! Pre-upload checks on generated drafts.

use serde::{Deserialize, Serialize};

use crate::config::QualityConfig;
use crate::product::{variation_price, ProductDraft};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualityField {
    Title,
    Description,
    Price,
    Images,
    Categories,
    Sku,
    Variations,
}

impl std::fmt::Display for QualityField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityField::Title => write!(f, "Title"),
            QualityField::Description => write!(f, "Description"),
            QualityField::Price => write!(f, "Price"),
            QualityField::Images => write!(f, "Images"),
            QualityField::Categories => write!(f, "Categories"),
            QualityField::Sku => write!(f, "SKU"),
            QualityField::Variations => write!(f, "Variations"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityIssue {
    /// 1-based product number.
    pub product: usize,
    pub field: QualityField,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityReport {
    pub total: usize,
    pub passed: usize,
    /// Drafts with at least one error.
    pub failed: usize,
    /// Drafts with warnings only.
    pub warnings: usize,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.warnings == 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &QualityIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QualityChecker {
    config: QualityConfig,
}

impl QualityChecker {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Checks every draft and tallies the results.
    pub fn run(&self, drafts: &[ProductDraft]) -> QualityReport {
        let mut report = QualityReport {
            total: drafts.len(),
            ..QualityReport::default()
        };

        for (index, draft) in drafts.iter().enumerate() {
            let issues = self.validate(draft, index);
            if issues.is_empty() {
                report.passed += 1;
                continue;
            }

            if issues.iter().any(|i| i.severity == Severity::Error) {
                report.failed += 1;
            } else {
                report.warnings += 1;
            }
            report.issues.extend(issues);
        }

        log::info!(
            "Quality check: {} passed, {} failed, {} with warnings",
            report.passed,
            report.failed,
            report.warnings
        );
        report
    }

    /// Issues for a single draft at 0-based `index`.
    pub fn validate(&self, draft: &ProductDraft, index: usize) -> Vec<QualityIssue> {
        let cfg = &self.config;
        let mut issues = Vec::new();
        let mut push = |field, severity, message: String| {
            issues.push(QualityIssue {
                product: index + 1,
                field,
                message,
                severity,
            });
        };

        if draft.title.trim().chars().count() < cfg.min_title_length {
            push(
                QualityField::Title,
                Severity::Error,
                format!("Title is too short (minimum {} characters)", cfg.min_title_length),
            );
        }
        if draft.title.chars().count() > cfg.max_title_length {
            push(
                QualityField::Title,
                Severity::Warning,
                format!("Title is too long (maximum {} characters)", cfg.max_title_length),
            );
        }

        if draft.description.trim().chars().count() < cfg.min_description_length {
            push(
                QualityField::Description,
                Severity::Error,
                format!(
                    "Description is too short (minimum {} characters)",
                    cfg.min_description_length
                ),
            );
        }

        match draft.price_value() {
            Some(price) if price >= cfg.min_price => {
                if price > cfg.max_price {
                    push(
                        QualityField::Price,
                        Severity::Warning,
                        format!("Price seems unusually high ({})", price),
                    );
                }
            }
            _ => push(
                QualityField::Price,
                Severity::Error,
                format!("Price is invalid or too low (minimum {})", cfg.min_price),
            ),
        }

        if cfg.require_images && draft.gallery_image_urls.is_empty() {
            push(
                QualityField::Images,
                Severity::Error,
                "No images found".to_string(),
            );
        }

        if cfg.require_categories && draft.selected_categories.is_empty() {
            push(
                QualityField::Categories,
                Severity::Error,
                "No categories assigned".to_string(),
            );
        }

        if draft.sku.trim().is_empty() {
            push(QualityField::Sku, Severity::Warning, "Missing SKU".to_string());
        }

        for (v_index, variation) in draft.variations.iter().enumerate() {
            if !variation_price(variation).is_some_and(|price| price > 0.0) {
                push(
                    QualityField::Variations,
                    Severity::Warning,
                    format!("Variation {} has invalid price", v_index + 1),
                );
            }
        }

        issues
    }
}
