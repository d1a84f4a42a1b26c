//! Mentor configuration: completion backend, embeddings, retrieval, memory.
//!
//! Loaded from `{data_dir}/config.json`. Every section is optional: missing
//! keys take their defaults, an unreadable or invalid file falls back to the
//! full default configuration with a warning.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    COMPLETION_TIMEOUT_SECS, DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_MAX_TOKENS,
    DEFAULT_RETRIEVAL_K, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TEMPERATURE, REMOTE_EMBEDDING_DIM,
    REMOTE_EMBEDDING_MODEL,
};
use crate::{AiError, AiResult};

// ============================================================================
// COMPLETION
// ============================================================================

/// Which external service answers the pipeline prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompletionProvider {
    /// OpenAI-compatible `/chat/completions` endpoint (Groq by default).
    #[default]
    ChatApi,
    /// Local `claude` CLI subprocess.
    ClaudeCli,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub provider: CompletionProvider,
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key (never the key itself).
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: CompletionProvider::ChatApi,
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: COMPLETION_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// EMBEDDINGS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    /// Offline hashed TF-IDF + concept dimensions.
    #[default]
    Local,
    /// OpenAI-compatible `/embeddings` endpoint.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            base_url: "https://api.openai.com".to_string(),
            model: REMOTE_EMBEDDING_MODEL.to_string(),
            dimensions: REMOTE_EMBEDDING_DIM,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

// ============================================================================
// RETRIEVAL & MEMORY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of snippets handed to the solver.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Optional directory of `*.txt` reference documents seeded instead of the built-in corpus.
    #[serde(default)]
    pub kb_dir: Option<PathBuf>,
}

fn default_k() -> usize {
    DEFAULT_RETRIEVAL_K
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            kb_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Minimum similarity ratio for "similar problems".
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Database location; defaults to `{data_dir}/mentor.db`.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            db_path: None,
        }
    }
}

// ============================================================================
// ROOT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MentorConfig {
    pub completion: CompletionConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub memory: MemoryConfig,
}

impl MentorConfig {
    /// Load from `{data_dir}/config.json`.
    pub fn load() -> Self {
        Self::load_from(&crate::storage::path_utils::config_path())
    }

    /// Load from an explicit path. Returns defaults if the file is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Invalid mentor config, using defaults"
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> AiResult<()> {
        self.save_to(&crate::storage::path_utils::config_path())
    }

    pub fn save_to(&self, path: &Path) -> AiResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the retriever or memory would refuse at call time.
    pub fn validate(&self) -> AiResult<()> {
        if self.retrieval.k == 0 {
            return Err(AiError::InvalidInput("retrieval.k must be at least 1".into()));
        }
        let t = self.memory.similarity_threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(AiError::InvalidInput(format!(
                "memory.similarity_threshold must be in [0, 1], got {}",
                t
            )));
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.memory
            .db_path
            .clone()
            .unwrap_or_else(crate::storage::path_utils::db_path)
    }
}
