use crate::knowledge::KnowledgeDocument;
use crate::processing::embeddings::{from_blob, to_blob};
use crate::time_utils;
use crate::{AiError, AiResult};
use rusqlite::{params, Connection, Row};

pub struct KnowledgeStorage;

fn document_from_row(row: &Row) -> rusqlite::Result<KnowledgeDocument> {
    let blob: Vec<u8> = row.get("embedding")?;
    Ok(KnowledgeDocument {
        id: row.get("id")?,
        seq: row.get("seq")?,
        text: row.get("text")?,
        model: row.get("model")?,
        embedding: from_blob(&blob),
    })
}

impl KnowledgeStorage {
    pub fn count(conn: &Connection) -> AiResult<usize> {
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM knowledge_documents", [], |r| r.get(0))
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))?;
        Ok(n as usize)
    }

    /// All documents in insertion order.
    pub fn list_all(conn: &Connection) -> AiResult<Vec<KnowledgeDocument>> {
        let mut stmt = conn
            .prepare("SELECT * FROM knowledge_documents ORDER BY seq ASC")
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))?;
        let rows = stmt
            .query_map([], document_from_row)
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AiError::StorageUnavailable(e.to_string()))
    }

    /// Insert `(text, embedding)` pairs in one transaction: either all rows land or none.
    pub fn insert_batch(conn: &Connection, model: &str, docs: &[(&str, Vec<f32>)]) -> AiResult<usize> {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| AiError::StorageUnavailable(format!("Begin seed transaction failed: {}", e)))?;
        let created_at = time_utils::to_sqlite(&time_utils::now());
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO knowledge_documents (id, text, model, embedding, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| AiError::StorageUnavailable(e.to_string()))?;
            for (text, embedding) in docs {
                stmt.execute(params![
                    crate::id_gen::document_id(),
                    text,
                    model,
                    to_blob(embedding),
                    created_at,
                ])
                .map_err(|e| AiError::StorageUnavailable(format!("Insert document failed: {}", e)))?;
            }
        }
        tx.commit()
            .map_err(|e| AiError::StorageUnavailable(format!("Commit seed transaction failed: {}", e)))?;
        tracing::debug!(count = docs.len(), model = %model, "Knowledge documents inserted");
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::open_in_memory;

    #[test]
    fn test_insert_and_list_in_order() {
        let conn = open_in_memory().unwrap();
        assert_eq!(KnowledgeStorage::count(&conn).unwrap(), 0);
        let docs: Vec<(&str, Vec<f32>)> = vec![("first", vec![1.0, 0.0]), ("second", vec![0.0, 1.0])];
        assert_eq!(KnowledgeStorage::insert_batch(&conn, "test", &docs).unwrap(), 2);

        let all = KnowledgeStorage::list_all(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "first");
        assert_eq!(all[1].text, "second");
        assert!(all[0].seq < all[1].seq);
        assert_eq!(all[1].embedding, vec![0.0, 1.0]);
        assert_eq!(all[0].model, "test");
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let conn = open_in_memory().unwrap();
        assert_eq!(KnowledgeStorage::insert_batch(&conn, "test", &[]).unwrap(), 0);
        assert_eq!(KnowledgeStorage::count(&conn).unwrap(), 0);
    }
}
