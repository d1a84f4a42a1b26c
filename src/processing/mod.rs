pub mod chunker;
pub mod completion;
pub mod embeddings;
pub mod embeddings_remote;
pub mod json_extract;
pub mod llm_subprocess;
pub mod text_similarity;
