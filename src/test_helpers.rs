//! Shared test utilities: scripted completion client, deterministic embedders, reply builders.
//!
//! Available only under `#[cfg(test)]`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::processing::completion::CompletionClient;
use crate::processing::embeddings::Embedder;
use crate::{AiError, AiResult};

// ============================================================================
// ScriptedClient
// ============================================================================

/// Replies in order, one per `complete` call. `Err` entries become `ExternalService`.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle on the prompts received, readable after the client is boxed away.
    pub fn prompt_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl CompletionClient for ScriptedClient {
    fn id(&self) -> &str {
        "scripted"
    }

    fn complete(&self, prompt: &str) -> AiResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(msg)) => Err(AiError::ExternalService(msg)),
            None => Err(AiError::ExternalService("script exhausted".into())),
        }
    }
}

// ============================================================================
// Embedders
// ============================================================================

/// One dimension per keyword: 1.0 when the lowercased text contains it.
pub struct KeywordEmbedder {
    keywords: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| if lower.contains(k.as_str()) { 1.0 } else { 0.0 })
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dimensions(&self) -> usize {
        self.keywords.len()
    }
}

/// Always unavailable.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> AiResult<Vec<f32>> {
        Err(AiError::EmbeddingUnavailable("test embedder offline".into()))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }

    fn dimensions(&self) -> usize {
        0
    }
}

// ============================================================================
// Stage reply builders
// ============================================================================

pub fn parsed_reply(problem_text: &str, topic: &str) -> String {
    serde_json::json!({
        "problem_text": problem_text,
        "topic": topic,
        "variables": ["x"],
        "constraints": [],
        "additional_context": "",
        "needs_clarification": false,
        "clarification_questions": []
    })
    .to_string()
}

pub fn route_reply(use_rag: bool) -> String {
    serde_json::json!({
        "strategy": "algebraic_manipulation",
        "use_rag": use_rag,
        "computational_tools": [],
        "confidence": 0.9
    })
    .to_string()
}

pub fn solution_reply(final_answer: &str) -> String {
    serde_json::json!({
        "approach": "Factor the quadratic",
        "steps": [{"step": 1, "description": "Factor", "calculation": "(x-2)(x-3) = 0"}],
        "final_answer": final_answer,
        "confidence": 0.95,
        "sources": ["Quadratic formula"]
    })
    .to_string()
}

pub fn verification_reply(is_correct: bool) -> String {
    serde_json::json!({
        "is_correct": is_correct,
        "confidence": 0.9,
        "issues": [],
        "suggestions": [],
        "needs_human_review": !is_correct
    })
    .to_string()
}
