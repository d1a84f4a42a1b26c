//! Textual similarity between problem statements.
//!
//! Ratio `2·M / (|a| + |b|)` where `M` is the number of characters in the
//! longest common subsequence found by a Myers diff. Symmetric, in [0, 1],
//! and 1.0 for two empty strings.

use similar::{DiffOp, TextDiff};

/// Similarity ratio of two texts over Unicode scalar values.
///
/// Computed in `f64` from the matched length so that an exact ratio such as
/// 9/10 compares equal to the threshold `0.9`.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    let diff = TextDiff::from_chars(a, b);
    let matched: usize = diff
        .ops()
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum();
    (2.0 * matched as f64 / total as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_one() {
        assert_eq!(ratio("2+2=?", "2+2=?"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn test_disjoint_is_zero() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // LCS "abc" = 3 chars; 2*3 / (4 + 3)
        let r = ratio("abcd", "abc");
        assert!((r - 6.0 / 7.0).abs() < 1e-9, "r = {}", r);
    }

    #[test]
    fn test_exact_ratio_equals_decimal_threshold() {
        // 2*9 / 20 and 2*7 / 20, no single-precision rounding
        assert_eq!(ratio("abcdefghij", "abcdefghiX"), 0.9);
        assert_eq!(ratio("abcdefghij", "abcdefgXYZ"), 0.7);
        assert!(ratio("abcdefghij", "abcdefghiX") >= 0.9);
    }

    #[test]
    fn test_symmetric() {
        let a = "Solve x^2 - 5x + 6 = 0";
        let b = "Solve x^2 + 5x + 6 = 0 for x";
        assert!((ratio(a, b) - ratio(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_multibyte_counts_chars() {
        // one differing char out of three on each side
        let r = ratio("x²+", "x³+");
        assert!((r - 2.0 * 2.0 / 6.0).abs() < 1e-9, "r = {}", r);
    }
}
