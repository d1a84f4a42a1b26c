//! Embeddings: hashed TF-IDF vectors plus math-concept dimensions.
//!
//! The local embedder is deterministic and offline: each unigram and bigram is
//! hashed (MD5) into a fixed-size vector, then a small block of concept
//! dimensions flags recognizable topics (quadratics, integrals, ...). The
//! result is L2-normalized so cosine similarity is a plain dot product.
//!
//! Used by: knowledge retriever (corpus seeding + queries).

use md5::{Digest, Md5};
use regex::Regex;
use std::sync::OnceLock;

use crate::constants::{CONCEPT_WEIGHT, TFIDF_DIM};
use crate::AiResult;

/// Source of fixed-dimension text embeddings.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> AiResult<Vec<f32>>;

    /// Embed many texts; all-or-nothing.
    fn embed_batch(&self, texts: &[&str]) -> AiResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;
}

/// (concept, pattern) pairs; one extra dimension per entry.
const CONCEPTS: &[(&str, &str)] = &[
    ("quadratic", r"quadratic|discriminant|\bx\s*\^\s*2|\bx²|b²\s*-\s*4ac|b\^2\s*-\s*4ac"),
    ("linear", r"\blinear\b|\bsimultaneous\b|system of (two |three )?(linear )?equations"),
    ("derivative", r"derivative|differentiat|d/dx|chain rule|rate of change"),
    ("integral", r"integra|∫|antiderivative|area under"),
    ("probability", r"probabilit|\bp\(|\bdice\b|\bcoins?\b|random|binomial|expected value"),
    ("matrix", r"matri(x|ces)|determinant|eigen"),
    ("trigonometry", r"\b(sin|cos|tan)\b|trigonometr|θ"),
    ("logarithm", r"\b(log|ln)\b|logarithm"),
];

fn concept_patterns() -> &'static [(usize, Regex)] {
    static PATTERNS: OnceLock<Vec<(usize, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        CONCEPTS
            .iter()
            .enumerate()
            .filter_map(|(i, (name, pattern))| match Regex::new(pattern) {
                Ok(re) => Some((i, re)),
                Err(e) => {
                    tracing::error!(concept = %name, error = %e, "Invalid concept pattern");
                    None
                }
            })
            .collect()
    })
}

/// Offline embedder: TF-IDF hash + concept flags.
#[derive(Debug, Clone, Default)]
pub struct LocalEmbedder;

impl LocalEmbedder {
    pub fn new() -> Self {
        Self
    }

    /// Names of the concept dimensions, in vector order after the hashed block.
    pub fn concept_names() -> impl Iterator<Item = &'static str> {
        CONCEPTS.iter().map(|(name, _)| *name)
    }

    fn embed_tfidf(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; TFIDF_DIM + CONCEPTS.len()];

        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();

        // Unigrams
        for word in &words {
            let w = word.trim_matches(|c: char| !c.is_alphanumeric());
            if w.chars().count() < 2 {
                continue;
            }
            hash_term_into(&mut vector[..TFIDF_DIM], w, 1.0);
        }

        // Bigrams
        for pair in words.windows(2) {
            let bigram = format!(
                "{}_{}",
                pair[0].trim_matches(|c: char| !c.is_alphanumeric()),
                pair[1].trim_matches(|c: char| !c.is_alphanumeric())
            );
            hash_term_into(&mut vector[..TFIDF_DIM], &bigram, 0.7);
        }

        // Concepts
        for (i, re) in concept_patterns() {
            if re.is_match(&lower) {
                vector[TFIDF_DIM + i] = CONCEPT_WEIGHT;
            }
        }

        // L2 normalize
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }

        vector
    }
}

impl Embedder for LocalEmbedder {
    fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        Ok(self.embed_tfidf(text))
    }

    fn model_name(&self) -> &str {
        "local-tfidf-concepts"
    }

    fn dimensions(&self) -> usize {
        TFIDF_DIM + CONCEPTS.len()
    }
}

/// Hash a term into a fixed-dimension vector using MD5.
fn hash_term_into(vector: &mut [f32], term: &str, weight: f32) {
    let mut hasher = Md5::new();
    hasher.update(term.as_bytes());
    let hash = hasher.finalize();

    // Use first 4 bytes as index, next byte for sign
    let idx = u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]]) as usize % vector.len();
    let sign = if hash[4] & 1 == 0 { 1.0f32 } else { -1.0f32 };
    vector[idx] += sign * weight;

    // Second hash position for better distribution
    let idx2 = u32::from_le_bytes([hash[5], hash[6], hash[7], hash[8]]) as usize % vector.len();
    let sign2 = if hash[9] & 1 == 0 { 1.0f32 } else { -1.0f32 };
    vector[idx2] += sign2 * weight * 0.5;
}

/// Cosine similarity between two vectors. Mismatched or zero vectors give 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Cosine distance, `1 - cosine`, in [0, 2].
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Little-endian f32 blob, as stored in SQLite.
pub fn to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub fn from_blob(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_produces_vector() {
        let e = LocalEmbedder::new();
        let v = e.embed("hello world").unwrap();
        assert_eq!(v.len(), e.dimensions());
        assert!(v.iter().any(|x| *x != 0.0));
    }

    #[test]
    fn test_embed_is_deterministic() {
        let e = LocalEmbedder::new();
        assert_eq!(e.embed("solve 3x + 1 = 7").unwrap(), e.embed("solve 3x + 1 = 7").unwrap());
    }

    #[test]
    fn test_similar_texts() {
        let e = LocalEmbedder::new();
        let a = e.embed("rust programming language").unwrap();
        let b = e.embed("rust programming tutorial").unwrap();
        let c = e.embed("french cooking recipes").unwrap();
        let sim_ab = cosine_similarity(&a, &b);
        let sim_ac = cosine_similarity(&a, &c);
        assert!(sim_ab > sim_ac, "sim_ab={} should be > sim_ac={}", sim_ab, sim_ac);
    }

    #[test]
    fn test_self_similarity() {
        let e = LocalEmbedder::new();
        let v = e.embed("test text").unwrap();
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 0.001);
        assert!(cosine_distance(&v, &v).abs() < 0.001);
    }

    #[test]
    fn test_concept_dimension_flags_quadratics() {
        let e = LocalEmbedder::new();
        let quadratic_idx = LocalEmbedder::concept_names()
            .position(|n| n == "quadratic")
            .unwrap();
        let v = e.embed("solve x^2-5x+6=0").unwrap();
        assert!(v[TFIDF_DIM + quadratic_idx] > 0.0);
        let w = e.embed("P(A and B) for two coins").unwrap();
        assert_eq!(w[TFIDF_DIM + quadratic_idx], 0.0);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let e = LocalEmbedder::new();
        let v = e.embed("").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
        assert_eq!(cosine_similarity(&v, &v), 0.0);
    }

    #[test]
    fn test_mismatched_dimensions() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_blob_roundtrip() {
        let v = vec![0.25f32, -1.5, 3.0];
        assert_eq!(from_blob(&to_blob(&v)), v);
    }
}
