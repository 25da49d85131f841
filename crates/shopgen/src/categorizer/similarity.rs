//! Edit-distance similarity between category names.
//!
//! Both functions measure strings in `char`s rather than bytes, so names in
//! Arabic or with accented letters count one edit per visible character.

/// Classic Levenshtein distance: insertions, deletions and substitutions
/// all cost 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single row of the DP matrix; `row[j]` is the distance between the
    // current prefix of `a` and `b[..j]`.
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}

/// Normalized similarity in `[0, 1]`: `1 - distance / len(longer)`.
///
/// Two empty strings are identical and score `1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let (longer, shorter, longer_len) = if len_a >= len_b {
        (a, b, len_a)
    } else {
        (b, a, len_b)
    };

    if longer_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(longer, shorter);
    (longer_len - distance) as f64 / longer_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_known_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("chaussures", "chaussure"), 1);
        assert_eq!(levenshtein("shoes", "bags"), 4);
    }

    #[test]
    fn test_levenshtein_empty_inputs() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_levenshtein_is_symmetric() {
        assert_eq!(levenshtein("sac", "sacs à main"), levenshtein("sacs à main", "sac"));
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        // "é" is two bytes in UTF-8 but one edit.
        assert_eq!(levenshtein("robe", "robé"), 1);
        assert_eq!(levenshtein("أحذية", "احذية"), 1);
    }

    #[test]
    fn test_similarity_plural() {
        let score = similarity("chaussures", "chaussure");
        assert!((score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_unrelated() {
        let score = similarity("shoes", "bags");
        assert!((score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_identity_and_empty() {
        assert_eq!(similarity("watches", "watches"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("bags", ""), 0.0);
    }

    #[test]
    fn test_similarity_argument_order_irrelevant() {
        assert_eq!(similarity("jacket", "jackets"), similarity("jackets", "jacket"));
    }
}
