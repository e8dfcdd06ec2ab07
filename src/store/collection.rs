use super::Database;
use crate::error::{DocseerError, Result};
use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A record to insert into a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: Option<String>,
    pub metadata: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            embedding,
            document: None,
            metadata: Map::new(),
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One nearest-neighbour hit
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    /// Squared Euclidean distance to the query vector
    pub distance: f32,
    pub document: Option<String>,
    pub metadata: Map<String, Value>,
}

/// Handle to a named collection
#[derive(Clone)]
pub struct Collection {
    db: Arc<Database>,
    id: i64,
    name: String,
}

impl Collection {
    pub(super) fn new(db: Arc<Database>, id: i64, name: String) -> Self {
        Self { db, id, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert records in a single transaction
    ///
    /// An id that already exists is overwritten, including duplicates within
    /// the same call: the last one wins.
    pub fn add(&self, records: Vec<Record>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.db.get_conn()?;
        let tx = conn.transaction()?;

        let stored_dim: Option<i64> = tx
            .query_row(
                "SELECT dimension FROM collections WHERE id = ?1",
                params![self.id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| DocseerError::CollectionNotFound {
                name: self.name.clone(),
            })?;

        let expected = match stored_dim {
            Some(dim) => dim as usize,
            None => {
                let dim = records[0].embedding.len();
                tx.execute(
                    "UPDATE collections SET dimension = ?1 WHERE id = ?2",
                    params![dim as i64, self.id],
                )?;
                dim
            }
        };

        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (collection_id, record_id, embedding, document, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (collection_id, record_id) DO UPDATE SET
                     embedding = excluded.embedding,
                     document = excluded.document,
                     metadata = excluded.metadata",
            )?;

            for record in &records {
                if record.embedding.len() != expected {
                    return Err(DocseerError::DimensionMismatch {
                        expected,
                        actual: record.embedding.len(),
                    });
                }

                let metadata = serde_json::to_string(&record.metadata).map_err(|e| {
                    DocseerError::Json {
                        source: e,
                        context: format!("Failed to serialize metadata for '{}'", record.id),
                    }
                })?;

                stmt.execute(params![
                    self.id,
                    record.id,
                    encode_embedding(&record.embedding),
                    record.document,
                    metadata
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!(
            "Stored {} records in collection '{}'",
            records.len(),
            self.name
        );
        Ok(records.len())
    }

    /// Number of records in the collection
    pub fn count(&self) -> Result<usize> {
        let conn = self.db.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection_id = ?1",
            params![self.id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Record ids in insertion order
    pub fn ids(&self) -> Result<Vec<String>> {
        let conn = self.db.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT record_id FROM records WHERE collection_id = ?1 ORDER BY seq")?;
        let rows = stmt.query_map(params![self.id], |row| row.get(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// The `n` records closest to `embedding`, nearest first
    ///
    /// Ties keep insertion order. An empty collection yields no matches.
    pub fn query(&self, embedding: &[f32], n: usize) -> Result<Vec<QueryMatch>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let conn = self.db.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT record_id, embedding, document, metadata
             FROM records WHERE collection_id = ?1 ORDER BY seq",
        )?;

        let rows = stmt.query_map(params![self.id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut scored = Vec::new();
        for row in rows {
            let (id, blob, document, metadata) = row?;
            let stored = decode_embedding(&blob);

            if stored.len() != embedding.len() {
                return Err(DocseerError::DimensionMismatch {
                    expected: stored.len(),
                    actual: embedding.len(),
                });
            }

            scored.push((squared_l2(&stored, embedding), id, document, metadata));
        }

        // Stable sort keeps insertion order among equal distances
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(n);

        scored
            .into_iter()
            .map(|(distance, id, document, metadata)| {
                let metadata: Map<String, Value> =
                    serde_json::from_str(&metadata).map_err(|e| DocseerError::Json {
                        source: e,
                        context: format!("Corrupt metadata for record '{}'", id),
                    })?;
                Ok(QueryMatch {
                    id,
                    distance,
                    document,
                    metadata,
                })
            })
            .collect()
    }
}

/// Squared Euclidean distance
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
