//! Knowledge Retriever -- k-nearest-neighbor lookup over the reference corpus.
//!
//! Linear scan: every stored document is compared against the query
//! embedding. Fine for a corpus of a few hundred snippets.

use rusqlite::Connection;
use std::path::Path;

use crate::config::{EmbeddingConfig, EmbeddingProvider};
use crate::constants::{CHUNK_OVERLAP, CHUNK_SIZE};
use crate::knowledge::{RetrievalResult, DEFAULT_CORPUS};
use crate::processing::chunker;
use crate::processing::embeddings::{cosine_distance, Embedder, LocalEmbedder};
use crate::processing::embeddings_remote::RemoteEmbedder;
use crate::storage::knowledge::KnowledgeStorage;
use crate::{AiError, AiResult};

pub struct KnowledgeRetriever {
    embedder: Box<dyn Embedder>,
}

impl KnowledgeRetriever {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let embedder: Box<dyn Embedder> = match config.provider {
            EmbeddingProvider::Local => Box::new(LocalEmbedder::new()),
            EmbeddingProvider::Remote => Box::new(RemoteEmbedder::from_config(config)),
        };
        Self::new(embedder)
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Top-`k` documents for `query`, best first.
    ///
    /// Empty corpus yields an empty result. Ties keep corpus insertion order.
    pub fn retrieve(&self, conn: &Connection, query: &str, k: usize) -> AiResult<Vec<RetrievalResult>> {
        if k == 0 {
            return Err(AiError::InvalidInput("k must be at least 1".into()));
        }

        let documents = KnowledgeStorage::list_all(conn)?;
        if documents.is_empty() {
            tracing::debug!("Retrieval on empty corpus");
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query)?;

        let mut scored: Vec<(f64, &str)> = documents
            .iter()
            .map(|doc| {
                let distance = if doc.embedding.len() == query_vec.len() {
                    cosine_distance(&query_vec, &doc.embedding)
                } else {
                    tracing::debug!(
                        doc_id = %doc.id,
                        doc_dim = doc.embedding.len(),
                        query_dim = query_vec.len(),
                        "Embedding dimension mismatch, document scored 0"
                    );
                    1.0
                };
                (distance, doc.text.as_str())
            })
            .collect();

        // Stable: equal distances keep insertion order
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let results: Vec<RetrievalResult> = scored
            .into_iter()
            .take(k)
            .map(|(distance, text)| RetrievalResult {
                text: text.to_string(),
                score: (1.0 - distance).clamp(0.0, 1.0),
            })
            .collect();

        tracing::info!(
            k = k,
            corpus = documents.len(),
            returned = results.len(),
            top_score = results.first().map(|r| r.score).unwrap_or(0.0),
            "Knowledge retrieval"
        );
        Ok(results)
    }

    /// Like [`retrieve`](Self::retrieve) but an unavailable embedder yields an
    /// empty context instead of an error. Storage failures still propagate.
    pub fn retrieve_or_empty(&self, conn: &Connection, query: &str, k: usize) -> AiResult<Vec<RetrievalResult>> {
        match self.retrieve(conn, query, k) {
            Err(AiError::EmbeddingUnavailable(reason)) => {
                tracing::warn!(reason = %reason, "Embedding unavailable, continuing without context");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Seed `snippets` if the corpus is empty. Returns the number inserted (0 when skipped).
    ///
    /// All embeddings are computed before the first row is written and the rows
    /// go in as one transaction.
    pub fn seed_corpus(&self, conn: &Connection, snippets: &[&str]) -> AiResult<usize> {
        let existing = KnowledgeStorage::count(conn)?;
        if existing > 0 {
            tracing::info!(existing = existing, "Corpus already seeded, skipping");
            return Ok(0);
        }

        let texts: Vec<&str> = snippets
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if texts.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedder.embed_batch(&texts)?;
        let docs: Vec<(&str, Vec<f32>)> = texts.into_iter().zip(embeddings).collect();
        let inserted = KnowledgeStorage::insert_batch(conn, self.embedder.model_name(), &docs)?;
        tracing::info!(inserted = inserted, model = %self.embedder.model_name(), "Corpus seeded");
        Ok(inserted)
    }

    /// Seed the built-in reference corpus.
    pub fn seed_default(&self, conn: &Connection) -> AiResult<usize> {
        self.seed_corpus(conn, DEFAULT_CORPUS)
    }

    /// Seed every `*.txt` file of `dir` (sorted by name), split into overlapping chunks.
    pub fn seed_from_dir(&self, conn: &Connection, dir: &Path) -> AiResult<usize> {
        let mut files: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("txt"))
            .collect();
        files.sort();

        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "No .txt documents found");
            return Ok(0);
        }

        let mut chunks = Vec::new();
        for path in &files {
            let content = std::fs::read_to_string(path)?;
            let file_chunks = chunker::split_text(&content, CHUNK_SIZE, CHUNK_OVERLAP);
            tracing::debug!(path = %path.display(), chunks = file_chunks.len(), "Document chunked");
            chunks.extend(file_chunks);
        }

        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        self.seed_corpus(conn, &refs)
    }

    /// First-use initialization: seed from `kb_dir` when given, else the built-in corpus.
    pub fn ensure_seeded(&self, conn: &Connection, kb_dir: Option<&Path>) -> AiResult<usize> {
        match kb_dir {
            Some(dir) => self.seed_from_dir(conn, dir),
            None => self.seed_default(conn),
        }
    }

    /// [`ensure_seeded`](Self::ensure_seeded) that tolerates an unavailable embedder:
    /// nothing is written and 0 is returned, so retrieval later degrades to an
    /// empty context. Storage and I/O failures still propagate.
    pub fn ensure_seeded_or_degrade(&self, conn: &Connection, kb_dir: Option<&Path>) -> AiResult<usize> {
        match self.ensure_seeded(conn, kb_dir) {
            Err(AiError::EmbeddingUnavailable(reason)) => {
                tracing::warn!(reason = %reason, "Embedding unavailable, corpus left unseeded");
                Ok(0)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::open_in_memory;
    use crate::test_helpers::{FailingEmbedder, KeywordEmbedder};

    fn local() -> KnowledgeRetriever {
        KnowledgeRetriever::new(Box::new(LocalEmbedder::new()))
    }

    #[test]
    fn test_empty_corpus_returns_empty() {
        let conn = open_in_memory().unwrap();
        let results = local().retrieve(&conn, "anything", 3).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_corpus_does_not_need_embedder() {
        let conn = open_in_memory().unwrap();
        let r = KnowledgeRetriever::new(Box::new(FailingEmbedder));
        assert!(r.retrieve(&conn, "anything", 3).unwrap().is_empty());
    }

    #[test]
    fn test_zero_k_is_invalid() {
        let conn = open_in_memory().unwrap();
        assert!(matches!(local().retrieve(&conn, "q", 0), Err(AiError::InvalidInput(_))));
    }

    #[test]
    fn test_large_k_returns_whole_corpus_sorted() {
        let conn = open_in_memory().unwrap();
        let r = local();
        let seeded = r.seed_default(&conn).unwrap();
        assert_eq!(seeded, DEFAULT_CORPUS.len());

        for k in [seeded, seeded + 1, seeded * 3] {
            let results = r.retrieve(&conn, "probability of two dice", k).unwrap();
            assert_eq!(results.len(), seeded);
            for w in results.windows(2) {
                assert!(w[0].score >= w[1].score);
            }
            assert!(results.iter().all(|x| (0.0..=1.0).contains(&x.score)));
        }
    }

    #[test]
    fn test_quadratic_query_ranks_quadratic_formula_first() {
        let conn = open_in_memory().unwrap();
        let r = local();
        r.seed_default(&conn).unwrap();
        let results = r.retrieve(&conn, "solve x^2-5x+6=0", 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "Quadratic formula: x = (-b ± √(b²-4ac)) / 2a.");
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let conn = open_in_memory().unwrap();
        let r = KnowledgeRetriever::new(Box::new(KeywordEmbedder::new(&["alpha", "beta"])));
        r.seed_corpus(&conn, &["beta one", "alpha one", "alpha two", "beta two"]).unwrap();
        let results = r.retrieve(&conn, "alpha", 4).unwrap();
        let texts: Vec<&str> = results.iter().map(|x| x.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha one", "alpha two", "beta one", "beta two"]);
        assert!((results[0].score - 1.0).abs() < 1e-9);
        assert_eq!(results[2].score, 0.0);
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let conn = open_in_memory().unwrap();
        let r = local();
        assert_eq!(r.seed_default(&conn).unwrap(), DEFAULT_CORPUS.len());
        assert_eq!(r.seed_default(&conn).unwrap(), 0);
        assert_eq!(r.seed_corpus(&conn, &["another snippet"]).unwrap(), 0);
        assert_eq!(KnowledgeStorage::count(&conn).unwrap(), DEFAULT_CORPUS.len());
    }

    #[test]
    fn test_failed_seed_writes_nothing() {
        let conn = open_in_memory().unwrap();
        let r = KnowledgeRetriever::new(Box::new(FailingEmbedder));
        let err = r.seed_default(&conn).unwrap_err();
        assert!(matches!(err, AiError::EmbeddingUnavailable(_)));
        assert_eq!(KnowledgeStorage::count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_seed_or_degrade_tolerates_offline_embedder() {
        let conn = open_in_memory().unwrap();
        let failing = KnowledgeRetriever::new(Box::new(FailingEmbedder));
        assert_eq!(failing.ensure_seeded_or_degrade(&conn, None).unwrap(), 0);
        assert_eq!(KnowledgeStorage::count(&conn).unwrap(), 0);
        assert!(failing.retrieve_or_empty(&conn, "x^2", 3).unwrap().is_empty());

        // once the embedder is back the corpus seeds normally
        assert_eq!(local().ensure_seeded_or_degrade(&conn, None).unwrap(), DEFAULT_CORPUS.len());
    }

    #[test]
    fn test_seed_or_degrade_propagates_storage_failure() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = KnowledgeRetriever::new(Box::new(FailingEmbedder))
            .ensure_seeded_or_degrade(&conn, None)
            .unwrap_err();
        assert!(err.is_storage_failure());
    }

    #[test]
    fn test_embedding_unavailable_degrades_to_empty() {
        let conn = open_in_memory().unwrap();
        local().seed_default(&conn).unwrap();
        let failing = KnowledgeRetriever::new(Box::new(FailingEmbedder));
        assert!(matches!(
            failing.retrieve(&conn, "x^2", 3),
            Err(AiError::EmbeddingUnavailable(_))
        ));
        assert!(failing.retrieve_or_empty(&conn, "x^2", 3).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_scores_zero() {
        let conn = open_in_memory().unwrap();
        local().seed_corpus(&conn, &["Quadratic formula"]).unwrap();
        let other = KnowledgeRetriever::new(Box::new(KeywordEmbedder::new(&["quadratic"])));
        let results = other.retrieve(&conn, "quadratic", 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.0);
    }

    #[test]
    fn test_seed_from_dir_chunks_txt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_calculus.txt"), "Derivative of sin x is cos x.").unwrap();
        std::fs::write(dir.path().join("a_algebra.txt"), "Quadratic formula: x = (-b ± √(b²-4ac)) / 2a.").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let conn = open_in_memory().unwrap();
        let r = local();
        assert_eq!(r.ensure_seeded(&conn, Some(dir.path())).unwrap(), 2);
        let docs = KnowledgeStorage::list_all(&conn).unwrap();
        assert!(docs[0].text.starts_with("Quadratic formula"));
        assert!(docs[1].text.starts_with("Derivative"));
        assert_eq!(r.ensure_seeded(&conn, Some(dir.path())).unwrap(), 0);
    }
}
