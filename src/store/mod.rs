//! Persistent vector store
//!
//! Named collections of `{id, embedding, document, metadata}` records kept in
//! one SQLite file. Queries are exact: every record of the collection is
//! scored by squared Euclidean distance, which is the scale the image
//! acceptance threshold was tuned on.

mod collection;
pub mod database;

pub use collection::{Collection, QueryMatch, Record};
pub use database::Database;

use crate::error::{DocseerError, Result};
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

/// Summary of one collection, as listed by `docseer status`
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    pub count: usize,
    pub dimension: Option<usize>,
}

/// Handle to the store file; cheap to clone
#[derive(Clone)]
pub struct VectorStore {
    db: Arc<Database>,
}

impl VectorStore {
    /// Open the store at `db_path`, creating the file if needed
    pub fn open(db_path: &Path) -> Result<Self> {
        let db = Database::new(db_path)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Create a new, empty collection
    pub fn create_collection(&self, name: &str) -> Result<Collection> {
        let conn = self.db.get_conn()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, datetime('now'))",
            params![name],
        )?;

        if inserted == 0 {
            return Err(DocseerError::CollectionExists {
                name: name.to_string(),
            });
        }

        let id = conn.last_insert_rowid();
        tracing::debug!("Created collection '{}' (id {})", name, id);

        Ok(Collection::new(self.db.clone(), id, name.to_string()))
    }

    /// Open an existing collection
    pub fn get_collection(&self, name: &str) -> Result<Collection> {
        let conn = self.db.get_conn()?;

        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match id {
            Some(id) => Ok(Collection::new(self.db.clone(), id, name.to_string())),
            None => Err(DocseerError::CollectionNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Open a collection, creating it when it does not exist yet
    pub fn get_or_create_collection(&self, name: &str) -> Result<Collection> {
        match self.get_collection(name) {
            Err(DocseerError::CollectionNotFound { .. }) => self.create_collection(name),
            other => other,
        }
    }

    /// Drop a collection and every record in it
    pub fn delete_collection(&self, name: &str) -> Result<()> {
        let mut conn = self.db.get_conn()?;
        let tx = conn.transaction()?;

        let id: Option<i64> = tx
            .query_row(
                "SELECT id FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        let Some(id) = id else {
            return Err(DocseerError::CollectionNotFound {
                name: name.to_string(),
            });
        };

        let removed = tx.execute("DELETE FROM records WHERE collection_id = ?1", params![id])?;
        tx.execute("DELETE FROM collections WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::debug!("Deleted collection '{}' ({} records)", name, removed);
        Ok(())
    }

    /// List every collection with its record count
    pub fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let conn = self.db.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.name, c.dimension, COUNT(r.seq)
             FROM collections c LEFT JOIN records r ON r.collection_id = c.id
             GROUP BY c.id ORDER BY c.name",
        )?;

        let rows = stmt.query_map([], |row| {
            let dimension: Option<i64> = row.get(1)?;
            let count: i64 = row.get(2)?;
            Ok(CollectionInfo {
                name: row.get(0)?,
                count: count as usize,
                dimension: dimension.map(|d| d as usize),
            })
        })?;

        let mut infos = Vec::new();
        for row in rows {
            infos.push(row?);
        }
        Ok(infos)
    }
}
