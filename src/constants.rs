// === SQLite Tuning ===
pub const SQLITE_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const WAL_AUTOCHECKPOINT: u32 = 1_000;

// === Embeddings ===
pub const TFIDF_DIM: usize = 384;
pub const CONCEPT_WEIGHT: f32 = 4.0;
pub const REMOTE_EMBEDDING_DIM: usize = 1536;
pub const REMOTE_EMBEDDING_MODEL: &str = "text-embedding-3-small";

// === Retrieval ===
pub const DEFAULT_RETRIEVAL_K: usize = 3;
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

// === Corpus chunking ===
pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 100;

// === Memory ===
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
pub const ATTEMPT_KEY_LEN: usize = 12;

// === Completion ===
pub const COMPLETION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 1_024;

// === Input review ===
pub const OCR_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const OCR_MIN_TEXT_CHARS: usize = 10;

// === Display ===
pub const TRACE_DETAIL_MAX: usize = 80;

/// Truncate a string at a char boundary, never panicking on multi-byte text.
pub fn truncate_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
