use std::collections::HashSet;

use crate::taxonomy::{Category, Taxonomy};

use super::similarity::similarity;

/// Similarity above which two names count as the same category.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Candidate category names for one product, in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchQuery {
    pub candidate_names: Vec<String>,
}

impl MatchQuery {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            candidate_names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        }
    }

    /// AI-suggested names followed by an optional localized category name.
    pub fn from_suggestions<S: AsRef<str>>(suggestions: &[S], localized: Option<&str>) -> Self {
        let mut candidate_names: Vec<String> =
            suggestions.iter().map(|s| s.as_ref().to_string()).collect();
        if let Some(name) = localized {
            candidate_names.push(name.to_string());
        }
        Self { candidate_names }
    }

    /// Lower-cased, non-blank candidates used for comparison.
    fn normalized(&self) -> Vec<String> {
        self.candidate_names
            .iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| name.to_lowercase())
            .collect()
    }
}

/// Matched category ids in taxonomy order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matched_ids: Vec<u64>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.matched_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matched_ids.len()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.matched_ids.contains(&id)
    }
}

/// Maps free-text category suggestions onto taxonomy ids.
///
/// A category matches a candidate when either name contains the other, or
/// when their edit-distance similarity exceeds the threshold. Matching is
/// case-insensitive and never fails.
#[derive(Debug, Clone, Copy)]
pub struct CategoryMatcher {
    threshold: f64,
}

impl Default for CategoryMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl CategoryMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn match_query(&self, taxonomy: &Taxonomy, query: &MatchQuery) -> MatchResult {
        self.match_categories(taxonomy.categories(), &query.normalized())
    }

    pub fn match_names<S: AsRef<str>>(
        &self,
        taxonomy: &[Category],
        candidate_names: &[S],
    ) -> MatchResult {
        self.match_categories(taxonomy, &MatchQuery::new(candidate_names).normalized())
    }

    fn match_categories(&self, taxonomy: &[Category], candidates: &[String]) -> MatchResult {
        let mut matched_ids = Vec::new();
        if candidates.is_empty() {
            return MatchResult { matched_ids };
        }

        let mut seen = HashSet::new();
        for category in taxonomy {
            // A missing name compares as "", which every candidate contains.
            let name = category.name.to_lowercase();
            if candidates.iter().any(|c| self.is_match(&name, c)) && seen.insert(category.id) {
                matched_ids.push(category.id);
            }
        }

        MatchResult { matched_ids }
    }

    fn is_match(&self, category_name: &str, candidate: &str) -> bool {
        category_name.contains(candidate)
            || candidate.contains(category_name)
            || similarity(category_name, candidate) > self.threshold
    }
}
