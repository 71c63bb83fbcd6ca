//! Embedded trivia schema and its upgrade steps.
//!
//! The schema holds two tables: `categories(id, type)` and
//! `questions(id, question, answer, category, difficulty)`, with
//! `questions.category` referencing `categories.id`.
//!
//! # Invariants
//! - Steps are listed oldest first and each one sets `PRAGMA user_version`.
//! - All pending steps run in one transaction.
//! - A database stamped by a newer build is left untouched.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// Tables every trivia connection must carry before repositories use it.
pub const TRIVIA_TABLES: &[&str] = &["categories", "questions"];

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "trivia_tables",
    sql: include_str!("0001_init.sql"),
}];

/// Where a connection's schema stands relative to this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Current,
    /// Stamped with an older version; pending steps can be applied.
    Behind { found: u32 },
    /// Stamped by a newer build.
    Ahead { found: u32 },
}

/// Schema version written by the last embedded step.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Compares the stamped `user_version` with [`latest_version`].
pub fn schema_state(conn: &Connection) -> DbResult<SchemaState> {
    let found = user_version(conn)?;
    let latest = latest_version();
    Ok(match found {
        found if found == latest => SchemaState::Current,
        found if found < latest => SchemaState::Behind { found },
        found => SchemaState::Ahead { found },
    })
}

/// Brings the trivia schema up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = match schema_state(conn)? {
        SchemaState::Current => return Ok(()),
        SchemaState::Ahead { found } => {
            return Err(DbError::SchemaTooNew {
                found,
                supported: latest_version(),
            })
        }
        SchemaState::Behind { found } => found,
    };

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > found) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={found} to_version={}",
        latest_version()
    );
    Ok(())
}

/// Names from [`TRIVIA_TABLES`] absent from `conn`.
pub fn missing_tables(conn: &Connection) -> DbResult<Vec<&'static str>> {
    let mut stmt = conn.prepare(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
    )?;
    let mut missing = Vec::new();
    for table in TRIVIA_TABLES {
        let exists: bool = stmt.query_row([table], |row| row.get(0))?;
        if !exists {
            missing.push(*table);
        }
    }
    Ok(missing)
}

fn user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}
