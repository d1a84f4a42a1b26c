//! OpenAI-compatible embeddings provider using the `/v1/embeddings` endpoint.
//!
//! Blocking HTTP via ureq. Every failure (no key, transport, status, payload)
//! surfaces as `EmbeddingUnavailable` so retrieval can degrade.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::embeddings::Embedder;
use crate::config::EmbeddingConfig;
use crate::{AiError, AiResult};

pub struct RemoteEmbedder {
    api_key: Option<String>,
    base_url: String,
    model: String,
    dims: usize,
    timeout: Duration,
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn embeddings_endpoint(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if normalized.ends_with("/embeddings") {
        return normalized;
    }
    if has_version_suffix(&normalized) {
        return format!("{normalized}/embeddings");
    }
    format!("{normalized}/v1/embeddings")
}

impl RemoteEmbedder {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(env = %config.api_key_env, "Embedding API key not set; remote embeddings unavailable");
        }
        Self {
            api_key,
            base_url: normalize_base_url(&config.base_url),
            model: config.model.clone(),
            dims: config.dimensions,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn request(&self, texts: &[&str]) -> AiResult<Vec<Vec<f32>>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::EmbeddingUnavailable("no API key configured".into()))?;

        let req = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
        };

        let mut response = ureq::post(&embeddings_endpoint(&self.base_url))
            .header("Authorization", &format!("Bearer {}", key))
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .send_json(&req)
            .map_err(|e| AiError::EmbeddingUnavailable(format!("request failed: {}", e)))?;

        let body: EmbeddingResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| AiError::EmbeddingUnavailable(format!("invalid response: {}", e)))?;

        if body.data.len() != texts.len() {
            return Err(AiError::EmbeddingUnavailable(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl Embedder for RemoteEmbedder {
    fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        self.request(&[text])?
            .pop()
            .ok_or_else(|| AiError::EmbeddingUnavailable("empty embedding response".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> AiResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(model = %self.model, count = texts.len(), "Remote embedding batch");
        self.request(texts)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}
