//! Category repository contracts and SQLite implementation.

use crate::model::category::{Category, CategoryId};
use crate::repo::question_repo::{ensure_connection_ready, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, Row};

/// Record store contract for categories.
pub trait CategoryRepository {
    /// Returns every category ordered by id ascending.
    fn fetch_all_categories(&self) -> RepoResult<Vec<Category>>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn create_category(&self, label: &str) -> RepoResult<CategoryId>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn fetch_all_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, type FROM categories ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();

        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }

        Ok(categories)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, type FROM categories WHERE id = ?1;")?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }

        Ok(None)
    }

    fn create_category(&self, label: &str) -> RepoResult<CategoryId> {
        let label = label.trim();
        if label.is_empty() {
            return Err(RepoError::Constraint(
                "category label must not be empty".to_string(),
            ));
        }

        self.conn
            .execute("INSERT INTO categories (type) VALUES (?1);", params![label])?;
        let id = self.conn.last_insert_rowid();
        info!("event=category_create module=repo status=ok category_id={id}");
        Ok(id)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id: CategoryId = row.get("id")?;
    let label: String = row.get("type")?;
    if label.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty label in categories.type for id {id}"
        )));
    }
    Ok(Category { id, label })
}
