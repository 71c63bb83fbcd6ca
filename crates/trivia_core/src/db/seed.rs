//! Default trivia categories.

use crate::db::DbResult;
use log::info;
use rusqlite::{params, Connection};

/// Labels inserted by [`seed_default_categories`], in id order.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Science",
    "Art",
    "Geography",
    "History",
    "Entertainment",
    "Sports",
];

/// Inserts [`DEFAULT_CATEGORIES`] when the category table is empty.
///
/// Returns the number of inserted rows; `0` when categories already exist.
pub fn seed_default_categories(conn: &mut Connection) -> DbResult<usize> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))?;
    if existing > 0 {
        info!("event=db_seed module=db status=skipped existing={existing}");
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for label in DEFAULT_CATEGORIES {
        tx.execute("INSERT INTO categories (type) VALUES (?1);", params![label])?;
    }
    tx.commit()?;

    info!(
        "event=db_seed module=db status=ok inserted={}",
        DEFAULT_CATEGORIES.len()
    );
    Ok(DEFAULT_CATEGORIES.len())
}
