//! Input review: flags OCR and speech transcripts that need a human look
//! before they enter the pipeline.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::constants::{OCR_CONFIDENCE_THRESHOLD, OCR_MIN_TEXT_CHARS};
use crate::{AiError, AiResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrReview {
    pub text: String,
    pub confidence: f64,
    pub warnings: Vec<String>,
    pub needs_review: bool,
}

/// Mean of the positive per-word confidences (0..100 scale), mapped to 0..1.
/// Non-positive entries mean "no estimate" and are skipped.
pub fn average_word_confidence(word_confidences: &[f64]) -> f64 {
    let positive: Vec<f64> = word_confidences.iter().copied().filter(|c| *c > 0.0).collect();
    if positive.is_empty() {
        return 0.0;
    }
    (positive.iter().sum::<f64>() / positive.len() as f64 / 100.0).clamp(0.0, 1.0)
}

pub fn review_ocr(text: &str, confidence: f64) -> AiResult<OcrReview> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(AiError::InvalidInput(format!(
            "OCR confidence must be in [0, 1], got {}",
            confidence
        )));
    }

    let needs_review = confidence < OCR_CONFIDENCE_THRESHOLD;
    let mut warnings = Vec::new();
    if needs_review {
        warnings.push(format!(
            "Low OCR confidence ({:.0}%). Please review and correct.",
            confidence * 100.0
        ));
    }
    if text.trim().chars().count() < OCR_MIN_TEXT_CHARS {
        warnings.push("Very little text detected. Image might be unclear.".to_string());
    }

    tracing::debug!(confidence = confidence, warnings = warnings.len(), "OCR reviewed");
    Ok(OcrReview {
        text: text.to_string(),
        confidence,
        warnings,
        needs_review,
    })
}

/// Review OCR text from per-word recognizer confidences (0..100, non-positive = no estimate).
pub fn review_ocr_words(text: &str, word_confidences: &[f64]) -> AiResult<OcrReview> {
    review_ocr(text, average_word_confidence(word_confidences))
}

// ============================================================================
// TRANSCRIPTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptReview {
    pub text: String,
    pub math_phrases_detected: Vec<String>,
    pub needs_review: bool,
}

/// (phrase, detection pattern, rewrite pattern, symbol)
const SPOKEN_MATH: &[(&str, &str, &str, &str)] = &[
    ("square root", r"(?i)\bsquare root\b", r"(?i)\bsquare root(?: of)?\s*", "√"),
    ("raised to", r"(?i)\braised to\b", r"(?i)\s*\braised to(?: the power(?: of)?)?\s*", "^"),
    ("to the power", r"(?i)\bto the power\b", r"(?i)\s*\bto the power(?: of)?\s*", "^"),
    ("divided by", r"(?i)\bdivided by\b", r"(?i)\bdivided by\b", "÷"),
    ("times", r"(?i)\btimes\b", r"(?i)\btimes\b", "*"),
    ("plus", r"(?i)\bplus\b", r"(?i)\bplus\b", "+"),
    ("minus", r"(?i)\bminus\b", r"(?i)\bminus\b", "-"),
    ("integral", r"(?i)\bintegral\b", r"(?i)\bintegral(?: of)?\s*", "∫"),
    ("summation", r"(?i)\bsummation\b", r"(?i)\bsummation(?: of)?\s*", "Σ"),
];

struct SpokenPhrase {
    name: &'static str,
    detect: Regex,
    rewrite: Regex,
    symbol: &'static str,
}

fn spoken_phrases() -> &'static [SpokenPhrase] {
    static TABLE: OnceLock<Vec<SpokenPhrase>> = OnceLock::new();
    TABLE.get_or_init(|| {
        SPOKEN_MATH
            .iter()
            .filter_map(|&(name, detect, rewrite, symbol)| {
                match (Regex::new(detect), Regex::new(rewrite)) {
                    (Ok(detect), Ok(rewrite)) => Some(SpokenPhrase {
                        name,
                        detect,
                        rewrite,
                        symbol,
                    }),
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::error!(phrase = name, error = %e, "Invalid spoken math pattern");
                        None
                    }
                }
            })
            .collect()
    })
}

/// Spoken math phrases in `text`, in table order.
pub fn detect_math_phrases(text: &str) -> Vec<String> {
    spoken_phrases()
        .iter()
        .filter(|p| p.detect.is_match(text))
        .map(|p| p.name.to_string())
        .collect()
}

pub fn review_transcript(text: &str) -> TranscriptReview {
    let detected = detect_math_phrases(text);
    TranscriptReview {
        text: text.to_string(),
        needs_review: !detected.is_empty(),
        math_phrases_detected: detected,
    }
}

/// Rewrite spoken phrases to symbols: "x raised to the power of 2" → "x^2".
pub fn normalize_spoken_math(text: &str) -> String {
    spoken_phrases().iter().fold(text.to_string(), |acc, p| {
        p.rewrite.replace_all(&acc, p.symbol).into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_confidence_warns() {
        let r = review_ocr("Solve x^2 - 5x + 6 = 0", 0.55).unwrap();
        assert!(r.needs_review);
        assert_eq!(r.warnings, vec!["Low OCR confidence (55%). Please review and correct."]);
    }

    #[test]
    fn test_short_text_warns_without_review() {
        let r = review_ocr(" 2+2 ", 0.95).unwrap();
        assert!(!r.needs_review);
        assert_eq!(r.warnings, vec!["Very little text detected. Image might be unclear."]);
    }

    #[test]
    fn test_clean_ocr() {
        let r = review_ocr("Find the derivative of x^3", 0.7).unwrap();
        assert!(!r.needs_review);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_confidence_out_of_range() {
        assert!(matches!(review_ocr("text", 1.2), Err(AiError::InvalidInput(_))));
        assert!(matches!(review_ocr("text", f64::NAN), Err(AiError::InvalidInput(_))));
    }

    #[test]
    fn test_average_word_confidence() {
        assert_eq!(average_word_confidence(&[]), 0.0);
        assert_eq!(average_word_confidence(&[-1.0, 0.0]), 0.0);
        assert!((average_word_confidence(&[90.0, -1.0, 70.0]) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_review_from_word_confidences() {
        let r = review_ocr_words("Find the derivative of x^3", &[90.0, -1.0, 70.0]).unwrap();
        assert!(!r.needs_review);
        assert!((r.confidence - 0.8).abs() < 1e-9);

        let r = review_ocr_words("Find the derivative of x^3", &[40.0, 60.0]).unwrap();
        assert!(r.needs_review);
        assert_eq!(r.warnings, vec!["Low OCR confidence (50%). Please review and correct."]);

        // no estimate at all reads as zero confidence
        assert!(review_ocr_words("Find the derivative of x^3", &[]).unwrap().needs_review);
    }

    #[test]
    fn test_detects_phrases_case_insensitive() {
        let r = review_transcript("The Square Root of x Divided By two");
        assert_eq!(r.math_phrases_detected, vec!["square root", "divided by"]);
        assert!(r.needs_review);
    }

    #[test]
    fn test_no_phrases_no_review() {
        let r = review_transcript("sometimes x equals four");
        assert!(r.math_phrases_detected.is_empty());
        assert!(!r.needs_review);
    }

    #[test]
    fn test_normalize_spoken_math() {
        assert_eq!(normalize_spoken_math("x raised to the power of 2 plus 3"), "x^2 + 3");
        assert_eq!(normalize_spoken_math("square root of 16 divided by 2"), "√16 ÷ 2");
        assert_eq!(normalize_spoken_math("integral of x times y"), "∫x * y");
        assert_eq!(normalize_spoken_math("nothing here"), "nothing here");
    }
}
