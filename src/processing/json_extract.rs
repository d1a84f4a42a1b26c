//! Pull a JSON object out of an LLM reply.
//!
//! Models wrap JSON in prose or markdown fences. Try the whole reply first,
//! then the span from the first `{` to the last `}`.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

use crate::constants::truncate_safe;
use crate::{AiError, AiResult};

fn json_block() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").ok()).as_ref()
}

fn strip_code_fence(s: &str) -> &str {
    let s = s.trim();
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> AiResult<T> {
    let body = strip_code_fence(reply);
    if let Ok(value) = serde_json::from_str::<T>(body) {
        return Ok(value);
    }

    let block = json_block()
        .and_then(|re| re.find(body))
        .ok_or_else(|| {
            AiError::ExternalService(format!(
                "Failed to parse: no JSON object in reply: {}",
                truncate_safe(body, 120)
            ))
        })?;

    serde_json::from_str::<T>(block.as_str())
        .map_err(|e| AiError::ExternalService(format!("Failed to parse JSON reply: {}", e)))
}
