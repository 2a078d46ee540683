//! Vector index: SQLite record table plus an HNSW search graph
//!
//! SQLite holds every record (text, provenance and the unit-normalized
//! embedding) so the index survives restarts. The HNSW graph is rebuilt from
//! the table on open and after every write; queries search the graph and read
//! the matching rows back by position.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use super::hnsw::HnswGraph;
use crate::config::VectorDbConfig;
use crate::error::{Error, Result};
use crate::providers::VectorIndex;
use crate::types::{Chunk, DocumentMetadata, IndexedRecord, QueryResult};

/// Persistent vector index in a single SQLite file
#[derive(Clone)]
pub struct SqliteVectorIndex {
    conn: Arc<Mutex<Connection>>,
    graph: Arc<RwLock<HnswGraph>>,
    params: VectorDbConfig,
}

fn db_err(context: &'static str) -> impl Fn(rusqlite::Error) -> Error {
    move |e| Error::vector_index(format!("{}: {}", context, e))
}

impl SqliteVectorIndex {
    /// Create or open the index file with default HNSW parameters
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, VectorDbConfig::default())
    }

    /// Create or open the index file, creating parent directories as needed
    pub fn open_with<P: AsRef<Path>>(path: P, params: VectorDbConfig) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(db_err("Failed to open index"))?;
        let index = Self::from_connection(conn, params)?;
        tracing::debug!(
            "Opened vector index at {} ({} records)",
            path.display(),
            index.graph.read().len()
        );
        Ok(index)
    }

    /// Create an in-memory index (for tests and ephemeral runs)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err("Failed to open in-memory index"))?;
        Self::from_connection(conn, VectorDbConfig::default())
    }

    fn from_connection(conn: Connection, params: VectorDbConfig) -> Result<Self> {
        let index = Self {
            conn: Arc::new(Mutex::new(conn)),
            graph: Arc::new(RwLock::new(HnswGraph::empty(&params))),
            params,
        };
        index.migrate()?;
        let conn = index.conn.lock();
        index.rebuild_graph(&conn)?;
        drop(conn);
        Ok(index)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(db_err("Failed to set pragmas"))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL UNIQUE,
                text TEXT NOT NULL,
                source TEXT NOT NULL,
                path TEXT NOT NULL,
                page INTEGER,
                dimensions INTEGER NOT NULL,
                embedding BLOB NOT NULL
            );
        "#,
        )
        .map_err(db_err("Failed to create records table"))?;

        Ok(())
    }

    /// Rebuild the search graph from the table; callers hold the connection
    fn rebuild_graph(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn
            .prepare("SELECT position, embedding FROM records ORDER BY position")
            .map_err(db_err("Failed to prepare embedding scan"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))
            .map_err(db_err("Failed to scan embeddings"))?;

        let mut points = Vec::new();
        for row in rows {
            let (position, blob) = row.map_err(db_err("Failed to read embedding"))?;
            points.push((position as usize, decode_embedding(&blob)?));
        }

        let graph = HnswGraph::build(&points, &self.params)?;
        *self.graph.write() = graph;
        Ok(())
    }

    /// Insert records, overwriting rows with the same id in place
    pub fn upsert_records(&self, records: &[IndexedRecord]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err("Failed to begin transaction"))?;
        {
            let mut stmt = tx
                .prepare(
                    r#"
                    INSERT INTO records (id, text, source, path, page, dimensions, embedding)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(id) DO UPDATE SET
                        text = excluded.text,
                        source = excluded.source,
                        path = excluded.path,
                        page = excluded.page,
                        dimensions = excluded.dimensions,
                        embedding = excluded.embedding
                "#,
                )
                .map_err(db_err("Failed to prepare upsert"))?;
            for record in records {
                insert_with(&mut stmt, record)?;
            }
        }
        tx.commit().map_err(db_err("Failed to commit upsert"))?;
        self.rebuild_graph(&conn)
    }

    /// Replace the whole index in one transaction
    pub fn replace_records(&self, records: &[IndexedRecord]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err("Failed to begin transaction"))?;
        tx.execute("DELETE FROM records", [])
            .map_err(db_err("Failed to clear records"))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO records (id, text, source, path, page, dimensions, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(db_err("Failed to prepare insert"))?;
            for record in records {
                insert_with(&mut stmt, record)?;
            }
        }
        tx.commit().map_err(db_err("Failed to commit replacement"))?;
        self.rebuild_graph(&conn)?;
        tracing::info!("Vector index now holds {} records", records.len());
        Ok(())
    }

    /// Up to `k` records nearest to `vector`, ties broken by insertion order
    pub fn nearest(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let conn = self.conn.lock();
        let hits = self.graph.read().search(&normalized(vector), k)?;
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = conn
            .prepare("SELECT text, source, path, page FROM records WHERE position = ?1")
            .map_err(db_err("Failed to prepare record lookup"))?;
        let mut chunks: HashMap<usize, Chunk> = HashMap::with_capacity(hits.len());
        for (position, _) in &hits {
            let chunk = stmt
                .query_row([*position as i64], |row| {
                    Ok(Chunk::new(
                        row.get::<_, String>(0)?,
                        DocumentMetadata {
                            source: row.get(1)?,
                            path: row.get(2)?,
                            page: row.get(3)?,
                        },
                    ))
                })
                .map_err(db_err("Failed to read record"))?;
            chunks.insert(*position, chunk);
        }

        Ok(hits
            .into_iter()
            .filter_map(|(position, distance)| {
                chunks
                    .remove(&position)
                    .map(|chunk| QueryResult::new(chunk, distance))
            })
            .collect())
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(db_err("Failed to count records"))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// All stored record ids in insertion order
    pub fn ids(&self) -> Result<Vec<Uuid>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT id FROM records ORDER BY position")
            .map_err(db_err("Failed to prepare id listing"))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err("Failed to list ids"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("Failed to read id"))?;

        ids.iter()
            .map(|id| {
                Uuid::parse_str(id)
                    .map_err(|e| Error::vector_index(format!("Corrupt record id {}: {}", id, e)))
            })
            .collect()
    }
}

fn insert_with(stmt: &mut rusqlite::Statement<'_>, record: &IndexedRecord) -> Result<()> {
    if record.embedding.is_empty() {
        return Err(Error::vector_index(format!(
            "Record {} has an empty embedding",
            record.id
        )));
    }
    let embedding = normalized(&record.embedding);
    stmt.execute(params![
        record.id.to_string(),
        record.text,
        record.metadata.source,
        record.metadata.path,
        record.metadata.page,
        embedding.len() as i64,
        encode_embedding(&embedding),
    ])
    .map_err(db_err("Failed to write record"))?;
    Ok(())
}

/// Scale to unit length; zero vectors are returned unchanged
fn normalized(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return vector.to_vec();
    }
    vector.iter().map(|x| x / norm).collect()
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::vector_index("Stored embedding has a truncated blob"));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(&self, records: Vec<IndexedRecord>) -> Result<()> {
        let index = self.clone();
        tokio::task::spawn_blocking(move || index.upsert_records(&records))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn replace_all(&self, records: Vec<IndexedRecord>) -> Result<()> {
        let index = self.clone();
        tokio::task::spawn_blocking(move || index.replace_records(&records))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let index = self.clone();
        let vector = vector.to_vec();
        tokio::task::spawn_blocking(move || index.nearest(&vector, k))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn count(&self) -> Result<usize> {
        let index = self.clone();
        tokio::task::spawn_blocking(move || index.len())
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "sqlite-hnsw"
    }
}
