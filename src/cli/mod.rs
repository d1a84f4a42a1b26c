pub mod config;
pub mod memory;
pub mod retrieve;
pub mod review;
pub mod seed;
pub mod solve;
pub mod status;

use anyhow::{Context, Result};
use math_mentor::config::MentorConfig;
use math_mentor::storage::database::open_connection;
use rusqlite::Connection;

/// Load the config and open the mentor database (migrated).
pub fn open_store() -> Result<(MentorConfig, Connection)> {
    let config = MentorConfig::load();
    config.validate().context("Invalid configuration")?;
    let db_path = config.db_path();
    let conn = open_connection(&db_path)
        .with_context(|| format!("Failed to open mentor database {}", db_path.display()))?;
    Ok((config, conn))
}
