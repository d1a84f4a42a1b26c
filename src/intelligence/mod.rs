pub mod attempt_memory;
pub mod knowledge_retriever;
