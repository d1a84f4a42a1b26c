//! Attempt Memory -- append-only log of solved problems with a similarity scan.
//!
//! `find_similar` reads the whole log on every call; there is no index.

use rusqlite::Connection;

use crate::attempt::{AttemptRecord, FeedbackLabel, SimilarAttempt};
use crate::processing::text_similarity;
use crate::storage::attempts::AttemptStorage;
use crate::{AiError, AiResult};

pub struct AttemptMemory;

impl AttemptMemory {
    /// Append a new record. `feedback_label` is `pending`, `correct` or `incorrect[:<note>]`.
    pub fn save(
        conn: &Connection,
        problem: &str,
        solution: &str,
        feedback_label: &str,
        verified: bool,
    ) -> AiResult<AttemptRecord> {
        let label: FeedbackLabel = feedback_label.parse()?;
        Self::save_labeled(conn, problem, solution, label, verified)
    }

    pub fn save_labeled(
        conn: &Connection,
        problem: &str,
        solution: &str,
        label: FeedbackLabel,
        verified: bool,
    ) -> AiResult<AttemptRecord> {
        let mut record = AttemptRecord::new(problem, solution, label, verified);
        record.seq = AttemptStorage::insert(conn, &record)?;
        tracing::info!(
            key = %record.key,
            feedback = %record.feedback,
            verified = record.verified,
            "Attempt saved"
        );
        Ok(record)
    }

    /// Verified past problems at least `threshold`-similar to `problem`, best first.
    pub fn find_similar(conn: &Connection, problem: &str, threshold: f64) -> AiResult<Vec<SimilarAttempt>> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AiError::InvalidInput(format!(
                "threshold must be in [0, 1], got {}",
                threshold
            )));
        }

        let records = AttemptStorage::list_all(conn)?;
        let scanned = records.len();

        let mut similar: Vec<SimilarAttempt> = records
            .into_iter()
            .filter(|r| r.verified)
            .filter_map(|r| {
                let similarity = text_similarity::ratio(problem, &r.problem);
                (similarity >= threshold).then(|| SimilarAttempt {
                    problem: r.problem,
                    solution: r.solution,
                    similarity,
                })
            })
            .collect();

        // Stable: equal similarity keeps store order
        similar.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        tracing::debug!(
            scanned = scanned,
            matched = similar.len(),
            threshold = threshold,
            "Similar attempts scan"
        );
        Ok(similar)
    }

    pub fn count(conn: &Connection) -> AiResult<usize> {
        AttemptStorage::count(conn)
    }

    pub fn count_verified(conn: &Connection) -> AiResult<usize> {
        AttemptStorage::count_verified(conn)
    }
}
