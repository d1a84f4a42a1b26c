use crate::attempt::{AttemptRecord, FeedbackLabel};
use crate::time_utils;
use crate::{AiError, AiResult};
use rusqlite::{params, Connection, Row};

/// Append-only attempt log: no update, no delete.
pub struct AttemptStorage;

fn attempt_from_row(row: &Row) -> rusqlite::Result<AttemptRecord> {
    let ts_str: String = row.get("timestamp")?;
    let feedback_str: String = row.get("feedback")?;
    Ok(AttemptRecord {
        seq: row.get("seq")?,
        key: row.get("key")?,
        timestamp: time_utils::from_sqlite(&ts_str).unwrap_or_else(|_| chrono::Utc::now()),
        problem: row.get("problem")?,
        solution: row.get("solution")?,
        feedback: feedback_str.parse().unwrap_or(FeedbackLabel::Pending),
        verified: row.get::<_, i32>("verified")? != 0,
    })
}

impl AttemptStorage {
    /// Append a record; returns its sequence number in the log.
    pub fn insert(conn: &Connection, record: &AttemptRecord) -> AiResult<i64> {
        conn.execute(
            "INSERT INTO attempts (key, timestamp, problem, solution, feedback, verified, useful)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.key,
                time_utils::to_sqlite(&record.timestamp),
                record.problem,
                record.solution,
                record.feedback.as_string(),
                record.verified as i32,
                record.useful() as i32,
            ],
        )
        .map_err(|e| AiError::StorageUnavailable(format!("Insert attempt failed: {}", e)))?;
        let seq = conn.last_insert_rowid();
        tracing::debug!(key = %record.key, seq = seq, "Attempt appended");
        Ok(seq)
    }

    /// Every record, in store order.
    pub fn list_all(conn: &Connection) -> AiResult<Vec<AttemptRecord>> {
        let mut stmt = conn
            .prepare("SELECT * FROM attempts ORDER BY seq ASC")
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))?;
        let rows = stmt
            .query_map([], attempt_from_row)
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))
    }

    pub fn count(conn: &Connection) -> AiResult<usize> {
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM attempts", [], |r| r.get(0))
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))?;
        Ok(n as usize)
    }

    pub fn count_verified(conn: &Connection) -> AiResult<usize> {
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM attempts WHERE verified = 1", [], |r| r.get(0))
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))?;
        Ok(n as usize)
    }
}
