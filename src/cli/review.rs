use anyhow::{bail, Result};
use math_mentor::input::{normalize_spoken_math, review_ocr, review_ocr_words, review_transcript};

pub fn ocr(text: &str, confidence: Option<f64>, word_confidences: Option<&[f64]>) -> Result<()> {
    let review = match (confidence, word_confidences) {
        (Some(c), _) => review_ocr(text, c)?,
        (None, Some(words)) => review_ocr_words(text, words)?,
        (None, None) => bail!("Either --confidence or --word-confidences is required"),
    };
    println!("Confidence: {:.0}%", review.confidence * 100.0);
    for w in &review.warnings {
        println!("Warning: {}", w);
    }
    println!("Needs review: {}", if review.needs_review { "yes" } else { "no" });
    Ok(())
}

pub fn transcript(text: &str) -> Result<()> {
    let review = review_transcript(text);
    if review.math_phrases_detected.is_empty() {
        println!("No spoken math phrases detected.");
    } else {
        println!("Detected: {}", review.math_phrases_detected.join(", "));
        println!("Suggested: {}", normalize_spoken_math(text));
    }
    println!("Needs review: {}", if review.needs_review { "yes" } else { "no" });
    Ok(())
}
