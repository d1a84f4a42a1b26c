use anyhow::{Context, Result};
use math_mentor::intelligence::knowledge_retriever::KnowledgeRetriever;

use super::open_store;

pub fn run(query: &str, k: Option<usize>) -> Result<()> {
    let (config, conn) = open_store()?;
    let retriever = KnowledgeRetriever::from_config(&config.embedding);
    retriever
        .ensure_seeded_or_degrade(&conn, config.retrieval.kb_dir.as_deref())
        .context("Failed to seed knowledge corpus")?;

    let k = k.unwrap_or(config.retrieval.k);
    let results = retriever
        .retrieve_or_empty(&conn, query, k)
        .context("Retrieval failed")?;

    if results.is_empty() {
        println!("No reference material for: {}", query);
        return Ok(());
    }

    println!("Top {} for: {}\n", k, query);
    println!("{:<4}  {:<6}  {}", "#", "SCORE", "TEXT");
    println!("{}", "-".repeat(70));
    for (i, r) in results.iter().enumerate() {
        println!("{:<4}  {:<6.3}  {}", i + 1, r.score, snippet(&r.text));
    }
    Ok(())
}

/// One-line column cell: at most 58 chars, longer text cut to 55 plus `...`.
fn snippet(text: &str) -> String {
    let text = text.replace('\n', " ");
    if text.chars().count() > 58 {
        format!("{}...", text.chars().take(55).collect::<String>())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_counts_chars_not_bytes() {
        // 58 chars but more than 58 bytes: fits as-is
        let multibyte = format!("√(b²-4ac) {}", "x".repeat(48));
        assert_eq!(multibyte.chars().count(), 58);
        assert!(multibyte.len() > 58);
        assert_eq!(snippet(&multibyte), multibyte);

        let long = "²".repeat(70);
        let cut = snippet(&long);
        assert_eq!(cut.chars().count(), 58);
        assert!(cut.starts_with(&"²".repeat(55)));
        assert!(cut.ends_with("..."));

        assert_eq!(snippet("line one\nline two"), "line one line two");
    }
}
