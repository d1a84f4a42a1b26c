use anyhow::Result;
use math_mentor::config::CompletionProvider;
use math_mentor::intelligence::attempt_memory::AttemptMemory;
use math_mentor::processing::llm_subprocess::is_claude_available;
use math_mentor::storage::knowledge::KnowledgeStorage;
use math_mentor::storage::migrations::get_schema_version;
use math_mentor::storage::path_utils;

use super::open_store;

pub fn run() -> Result<()> {
    let (config, conn) = open_store()?;

    let documents = KnowledgeStorage::count(&conn).unwrap_or(0);
    let attempts = AttemptMemory::count(&conn).unwrap_or(0);
    let verified = AttemptMemory::count_verified(&conn).unwrap_or(0);
    let schema = get_schema_version(&conn).unwrap_or(0);

    println!("Math Mentor Status");
    println!("==================");
    println!("Data dir:  {}", path_utils::data_dir().display());
    println!("Database:  {} (schema v{})", config.db_path().display(), schema);
    println!();
    println!("Knowledge corpus: {:>5} documents", documents);
    println!("Attempts:         {:>5}", attempts);
    println!("  Verified:       {:>5}", verified);
    println!();
    println!("Completion: {:?} / {}", config.completion.provider, config.completion.model);
    if config.completion.provider == CompletionProvider::ClaudeCli && !is_claude_available() {
        println!("  warning: `claude` CLI not found on PATH");
    }
    println!("Embedding:  {:?}", config.embedding.provider);
    println!(
        "Retrieval k = {}, similarity threshold = {:.2}",
        config.retrieval.k, config.memory.similarity_threshold
    );
    Ok(())
}
