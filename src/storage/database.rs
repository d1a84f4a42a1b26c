use crate::constants::{SQLITE_BUSY_TIMEOUT_MS, WAL_AUTOCHECKPOINT};
use crate::{AiError, AiResult};
use rusqlite::Connection;

/// Ouvre une connexion SQLite avec les pragmas appropries et applique les migrations.
pub fn open_connection(path: &std::path::Path) -> AiResult<Connection> {
    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AiError::StorageUnavailable(format!("Cannot create {}: {}", parent.display(), e))
        })?;
    }

    let conn = Connection::open(path).map_err(|e| {
        AiError::StorageUnavailable(format!("Failed to open {}: {}", path.display(), e))
    })?;

    tracing::debug!(path = %path.display(), "Database connection opened");

    configure(&conn)?;
    super::migrations::migrate(&conn)?;
    Ok(conn)
}

/// In-memory database with the full schema (sessions without persistence, tests).
pub fn open_in_memory() -> AiResult<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| AiError::StorageUnavailable(format!("Failed to open in-memory db: {}", e)))?;
    super::migrations::migrate(&conn)?;
    Ok(conn)
}

/// Pragmas:
/// - journal_mode = WAL
/// - busy_timeout = SQLITE_BUSY_TIMEOUT_MS (constants.rs)
/// - synchronous = NORMAL
/// - wal_autocheckpoint = WAL_AUTOCHECKPOINT
fn configure(conn: &Connection) -> AiResult<()> {
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = {};
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;
         PRAGMA wal_autocheckpoint = {};",
        SQLITE_BUSY_TIMEOUT_MS, WAL_AUTOCHECKPOINT,
    ))
    .map_err(|e| AiError::StorageUnavailable(format!("Failed to configure pragmas: {}", e)))?;
    Ok(())
}
