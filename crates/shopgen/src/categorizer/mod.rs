pub mod matcher;
pub mod similarity;

pub use matcher::{CategoryMatcher, MatchQuery, MatchResult, DEFAULT_SIMILARITY_THRESHOLD};
pub use similarity::{levenshtein, similarity};
