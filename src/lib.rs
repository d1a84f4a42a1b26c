//! Math Mentor: retrieval-augmented math tutoring with an attempt memory.
//!
//! Single-crate library: a knowledge retriever over a static reference
//! corpus, an append-only memory of solved attempts, and a solve pipeline
//! that keeps going when one of its stages fails.

// Foundation types
pub mod constants;
pub mod error;
pub mod id_gen;
pub mod time_utils;

// Domain types
pub mod attempt;
pub mod config;
pub mod knowledge;

// Sub-systems
pub mod storage;
pub mod processing;
pub mod intelligence;
pub mod pipeline;
pub mod input;
pub mod tracing_init;

#[cfg(test)]
pub mod test_helpers;

// Re-exports for convenience
pub use error::{AiError, AiResult};
