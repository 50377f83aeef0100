use crate::domain::error::LoungeError;
use crate::domain::model::CacheEntry;
use crate::domain::traits::CacheStore;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use std::io::Cursor;
use std::path::Path;
use tokio_rusqlite::Connection;
use zstd::stream::{decode_all, encode_all};

pub async fn init_database(db_path: &Path) -> Result<Connection, LoungeError> {
    let db = Connection::open(db_path.to_path_buf()).await?;
    create_schema(&db).await?;
    Ok(db)
}

/// In-memory SQLite database
pub async fn init_memory_database() -> Result<Connection, LoungeError> {
    let db = Connection::open_in_memory().await?;
    create_schema(&db).await?;
    Ok(db)
}

async fn create_schema(db: &Connection) -> Result<(), LoungeError> {
    db.call(|conn| {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS cache (
                cache_key TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache(expires_at)",
            [],
        )?;

        Ok::<_, rusqlite::Error>(())
    })
    .await?;

    Ok(())
}

/// SQLite cache store, payloads kept as zstd-compressed JSON
pub struct SqliteCacheStore {
    conn: Connection,
}

impl SqliteCacheStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

fn compress(payload: &serde_json::Value) -> Result<Vec<u8>, LoungeError> {
    let serialized = serde_json::to_vec(payload)?;
    encode_all(Cursor::new(&serialized), 0).map_err(|e| LoungeError::Compression(e.to_string()))
}

fn decompress(data: &[u8]) -> Result<serde_json::Value, LoungeError> {
    let raw = decode_all(Cursor::new(data)).map_err(|e| LoungeError::Compression(e.to_string()))?;
    Ok(serde_json::from_slice(&raw)?)
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, LoungeError> {
        let key_string = key.to_string();
        let row = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT data, created_at, expires_at FROM cache WHERE cache_key = ?",
                    params![key_string],
                    |row| {
                        let data: Vec<u8> = row.get(0)?;
                        let created_at: i64 = row.get(1)?;
                        let expires_at: i64 = row.get(2)?;
                        Ok((data, created_at, expires_at))
                    },
                )
                .optional()
            })
            .await?;

        match row {
            Some((data, created_at, expires_at)) => Ok(Some(CacheEntry {
                key: key.to_string(),
                payload: decompress(&data)?,
                created_at,
                expires_at,
            })),
            None => Ok(None),
        }
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<(), LoungeError> {
        let compressed = compress(&entry.payload)?;
        let CacheEntry {
            key,
            created_at,
            expires_at,
            ..
        } = entry;

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO cache (cache_key, data, created_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(cache_key) DO UPDATE SET
                        data = excluded.data,
                        created_at = excluded.created_at,
                        expires_at = excluded.expires_at",
                    params![key, compressed, created_at, expires_at],
                )
            })
            .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, LoungeError> {
        let key_string = key.to_string();
        let removed = self
            .conn
            .call(move |conn| {
                conn.execute("DELETE FROM cache WHERE cache_key = ?", params![key_string])
            })
            .await?;

        Ok(removed > 0)
    }

    async fn delete_expired(&self, now_ms: i64) -> Result<usize, LoungeError> {
        let removed = self
            .conn
            .call(move |conn| {
                conn.execute("DELETE FROM cache WHERE expires_at < ?", params![now_ms])
            })
            .await?;

        Ok(removed)
    }

    async fn count(&self) -> Result<usize, LoungeError> {
        let count: i64 = self
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0)))
            .await?;

        Ok(count as usize)
    }
}
