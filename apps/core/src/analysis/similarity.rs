//! Cheap positional similarity for short strings.
//!
//! Counts matching characters at the same position over the shared length,
//! grants a containment bonus when one string contains the other, and
//! divides by the longer length. The result can exceed 1.0 (up to 1.3).

/// Bonus per shared character granted when one string contains the other
const CONTAINMENT_BONUS: f64 = 0.3;

/// Symmetric lexical similarity scorer
#[derive(Debug, Default, Clone, Copy)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Similarity of `a` and `b` in `[0, 1.3]`. Two empty strings score 0.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let s1 = a.to_lowercase();
        let s2 = b.to_lowercase();
        let c1: Vec<char> = s1.chars().collect();
        let c2: Vec<char> = s2.chars().collect();

        let max_len = c1.len().max(c2.len());
        if max_len == 0 {
            return 0.0;
        }
        let min_len = c1.len().min(c2.len());

        let mut overlap = c1.iter().zip(c2.iter()).filter(|(x, y)| x == y).count() as f64;

        if s1.contains(s2.as_str()) || s2.contains(s1.as_str()) {
            overlap += min_len as f64 * CONTAINMENT_BONUS;
        }

        overlap / max_len as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_strings_exceed_one() {
        let scorer = SimilarityScorer::new();
        assert!(approx(scorer.similarity("ab", "ab"), 1.3));
        assert!(approx(scorer.similarity("SFC", "sfc"), 1.3));
    }

    #[test]
    fn test_empty_strings() {
        let scorer = SimilarityScorer::new();
        assert_eq!(scorer.similarity("", ""), 0.0);
        assert_eq!(scorer.similarity("", "abc"), 0.0);
        assert_eq!(scorer.similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_prefix_containment() {
        let scorer = SimilarityScorer::new();
        // 3 positional matches + 0.9 containment over 4
        assert!(approx(scorer.similarity("abc", "abcd"), 3.9 / 4.0));
    }

    #[test]
    fn test_shifted_containment_only_gets_bonus() {
        let scorer = SimilarityScorer::new();
        // "bc" sits inside "abc" but no position lines up
        assert!(approx(scorer.similarity("bc", "abc"), 0.6 / 3.0));
    }

    #[test]
    fn test_symmetry() {
        let scorer = SimilarityScorer::new();
        let pairs = [("学费", "学费多少"), ("price", "prize"), ("文书", "面试")];
        for (a, b) in pairs {
            assert!(approx(scorer.similarity(a, b), scorer.similarity(b, a)));
        }
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let scorer = SimilarityScorer::new();
        // 2 of 4 characters line up, containment bonus 0.6
        assert!(approx(scorer.similarity("学费", "学费多少"), 2.6 / 4.0));
    }

    #[test]
    fn test_disjoint_strings() {
        let scorer = SimilarityScorer::new();
        assert_eq!(scorer.similarity("xyz", "abc"), 0.0);
    }
}
