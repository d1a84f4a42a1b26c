use serde::{Deserialize, Serialize};

/// Reference snippet of the static corpus with its precomputed embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeDocument {
    pub id: String,
    /// Insertion order; ties in retrieval resolve on this.
    pub seq: i64,
    pub text: String,
    pub model: String,
    pub embedding: Vec<f32>,
}

/// One ranked hit of a retrieval call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    pub text: String,
    /// Normalized relevance in [0, 1], higher is better.
    pub score: f64,
}

/// Built-in reference corpus seeded on first use.
pub const DEFAULT_CORPUS: &[&str] = &[
    "Quadratic formula: x = (-b ± √(b²-4ac)) / 2a.",
    "Discriminant: for ax² + bx + c = 0, D = b² - 4ac. D > 0 gives two real roots, D = 0 one repeated root, D < 0 two complex roots.",
    "Linear equation: ax + b = 0 has the single solution x = -b/a when a ≠ 0.",
    "System of two linear equations: eliminate one variable by substitution or by adding multiples of the equations, then back-substitute.",
    "Power rule for derivatives: d/dx xⁿ = n·xⁿ⁻¹. Product rule: (uv)' = u'v + uv'. Chain rule: (f∘g)' = f'(g)·g'.",
    "Integration by parts: ∫u dv = uv - ∫v du. Definite integrals are evaluated with the fundamental theorem of calculus.",
    "Probability of an event: P(A) = favourable outcomes / total outcomes. Independent events: P(A and B) = P(A)·P(B). Complement: P(not A) = 1 - P(A).",
    "Binomial probability: P(X = k) = C(n, k)·pᵏ·(1-p)ⁿ⁻ᵏ, with C(n, k) = n! / (k!(n-k)!).",
    "Determinant of a 2×2 matrix [[a, b], [c, d]] is ad - bc. A square matrix is invertible when its determinant is nonzero.",
    "Pythagorean identity: sin²θ + cos²θ = 1. Also tan θ = sin θ / cos θ.",
    "Logarithm rules: log(ab) = log a + log b, log(a/b) = log a - log b, log(aⁿ) = n·log a.",
    "Common mistakes: dropping a negative sign when expanding brackets, dividing by an expression that can be zero, forgetting the ± when taking square roots.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_corpus_starts_with_quadratic_formula() {
        assert_eq!(DEFAULT_CORPUS[0], "Quadratic formula: x = (-b ± √(b²-4ac)) / 2a.");
        assert!(DEFAULT_CORPUS.iter().all(|s| !s.trim().is_empty()));
    }
}
