use anyhow::{Context, Result};
use math_mentor::intelligence::knowledge_retriever::KnowledgeRetriever;
use math_mentor::storage::knowledge::KnowledgeStorage;
use std::path::Path;

use super::open_store;

pub fn run(dir: Option<&Path>) -> Result<()> {
    let (config, conn) = open_store()?;
    let retriever = KnowledgeRetriever::from_config(&config.embedding);
    let dir = dir.or(config.retrieval.kb_dir.as_deref());

    let inserted = retriever
        .ensure_seeded(&conn, dir)
        .context("Failed to seed knowledge corpus")?;
    let total = KnowledgeStorage::count(&conn)?;

    if inserted == 0 {
        println!("Corpus already seeded ({} documents), nothing to do.", total);
    } else {
        println!(
            "Seeded {} documents with {} from {}.",
            inserted,
            retriever.model_name(),
            dir.map(|d| d.display().to_string())
                .unwrap_or_else(|| "the built-in corpus".to_string())
        );
    }
    Ok(())
}
