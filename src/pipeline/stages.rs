//! Stage payloads and their prompts.
//!
//! Every payload is lenient on input: missing keys take defaults so a
//! partially-filled reply still parses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedProblem {
    pub problem_text: String,
    /// algebra | probability | calculus | linear_algebra
    pub topic: String,
    pub variables: Vec<String>,
    pub constraints: Vec<String>,
    pub additional_context: String,
    pub needs_clarification: bool,
    pub clarification_questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteDecision {
    pub strategy: String,
    pub use_rag: bool,
    pub computational_tools: Vec<String>,
    pub confidence: f64,
}

impl Default for RouteDecision {
    fn default() -> Self {
        Self {
            strategy: String::new(),
            use_rag: true,
            computational_tools: Vec::new(),
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionStep {
    pub step: u32,
    pub description: String,
    pub calculation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Solution {
    pub approach: String,
    pub steps: Vec<SolutionStep>,
    pub final_answer: String,
    pub confidence: f64,
    pub sources: Vec<String>,
}

impl Solution {
    /// Unstructured reply kept as-is.
    pub fn from_text(text: &str) -> Self {
        Self {
            final_answer: text.trim().to_string(),
            ..Self::default()
        }
    }

    /// Plain-text rendering, used for later prompts and the attempt log.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.approach.is_empty() {
            out.push_str(&format!("Approach: {}\n", self.approach));
        }
        for s in &self.steps {
            out.push_str(&format!("Step {}: {}", s.step, s.description));
            if !s.calculation.is_empty() {
                out.push_str(&format!(" [{}]", s.calculation));
            }
            out.push('\n');
        }
        if out.is_empty() {
            return self.final_answer.clone();
        }
        out.push_str(&format!("Final answer: {}", self.final_answer));
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verification {
    pub is_correct: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub needs_human_review: bool,
}

// ============================================================================
// PROMPTS
// ============================================================================

pub fn parse_prompt(raw_input: &str) -> String {
    format!(
        r#"You are a precise math problem parser.

Raw input (from OCR/ASR/typing):
{raw_input}

Task:
1. Clean up the text
2. Identify the math topic
3. Extract variables and constraints
4. Identify if there's ambiguity

Return ONLY valid JSON (no markdown):
{{
    "problem_text": "cleaned problem statement",
    "topic": "algebra|probability|calculus|linear_algebra",
    "variables": ["x", "y"],
    "constraints": ["x > 0"],
    "additional_context": "any assumptions or context",
    "needs_clarification": false,
    "clarification_questions": []
}}"#
    )
}

pub fn route_prompt(problem: &str, topic: &str) -> String {
    format!(
        r#"Given this math problem:
{problem}
Topic: {topic}

Determine:
1. What type of solver strategy is needed?
2. Should reference material be retrieved for it?
3. Are computational tools (calculator, solver) needed?
4. Confidence level (0-1) in the approach

Return ONLY valid JSON:
{{
    "strategy": "algebraic_manipulation|calculus_based|probability|linear_system",
    "use_rag": true,
    "computational_tools": ["calculator"],
    "confidence": 0.9
}}"#
    )
}

pub fn solve_prompt(problem: &str, context: &str) -> String {
    let context = if context.is_empty() { "(none)" } else { context };
    format!(
        r#"You are an expert math tutor. Solve this problem step-by-step.

Problem:
{problem}

Relevant knowledge:
{context}

Return ONLY valid JSON:
{{
    "approach": "explanation of approach",
    "steps": [{{"step": 1, "description": "...", "calculation": "..."}}],
    "final_answer": "the answer",
    "confidence": 0.95,
    "sources": ["formula reference"]
}}"#
    )
}

pub fn verify_prompt(problem: &str, solution: &str) -> String {
    format!(
        r#"Verify this solution:

Problem: {problem}

Solution: {solution}

Check mathematical correctness, that every step is justified, that the
domain is valid, that edge cases are considered and that the answer is complete.

Return ONLY valid JSON:
{{
    "is_correct": true,
    "confidence": 0.95,
    "issues": [],
    "suggestions": [],
    "needs_human_review": false
}}"#
    )
}

pub fn explain_prompt(problem: &str, solution: &str) -> String {
    format!(
        r#"Create a clear, student-friendly explanation.

Problem: {problem}

Solution: {solution}

Write:
1. Why this approach works
2. Key concepts involved
3. Common mistakes to avoid
4. Practice problems to try

Use simple language. Explain every step."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::json_extract::parse_json_reply;

    #[test]
    fn test_route_defaults_to_rag() {
        let route: RouteDecision = parse_json_reply(r#"{"strategy": "probability"}"#).unwrap();
        assert!(route.use_rag);
        assert_eq!(route.strategy, "probability");
    }

    #[test]
    fn test_solution_parses_steps() {
        let reply = r#"{"approach": "factor", "steps": [{"step": 1, "description": "factor", "calculation": "(x-2)(x-3)"}], "final_answer": "x = 2, 3", "confidence": 0.9}"#;
        let s: Solution = parse_json_reply(reply).unwrap();
        assert_eq!(s.steps.len(), 1);
        let text = s.render();
        assert!(text.contains("Step 1: factor [(x-2)(x-3)]"));
        assert!(text.ends_with("Final answer: x = 2, 3"));
    }

    #[test]
    fn test_plain_solution_renders_answer_only() {
        assert_eq!(Solution::from_text("  x = 4 \n").render(), "x = 4");
    }

    #[test]
    fn test_solve_prompt_embeds_context() {
        let p = solve_prompt("2+2", "a\n---\nb");
        assert!(p.contains("a\n---\nb"));
        assert!(solve_prompt("2+2", "").contains("(none)"));
    }
}
