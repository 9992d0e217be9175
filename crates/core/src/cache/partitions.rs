//! Partition CRUD on SQLite.
//!
//! Implements [`BlobStore`] for [`CacheDb`]. A `put` creates its partition
//! implicitly, and deleting a partition cascades to its entries.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

use super::connection::CacheDb;
use super::hash::request_key;
use super::store::{BlobStore, EntryMeta};
use crate::Error;
use crate::request::{Request, Response};

fn stored_status(status: i64) -> Result<u16, Error> {
    u16::try_from(status).map_err(|_| Error::InvalidInput(format!("stored status {status} out of range")))
}

fn decode_response(status: i64, headers_json: &str, body: Vec<u8>) -> Result<Response, Error> {
    let headers: Vec<(String, String)> = serde_json::from_str(headers_json)?;
    Ok(Response { status: stored_status(status)?, headers, body: Bytes::from(body) })
}

#[async_trait]
impl BlobStore for CacheDb {
    async fn open(&self, partition: &str) -> Result<(), Error> {
        let name = partition.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn match_in(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error> {
        let name = partition.to_string();
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let row = conn
                    .query_row(
                        "SELECT status, headers_json, body FROM entries WHERE partition = ?1 AND key = ?2",
                        params![name, key],
                        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?)),
                    )
                    .optional()?;

                row.map(|(status, headers, body)| decode_response(status, &headers, body))
                    .transpose()
            })
            .await
            .map_err(Error::from)
    }

    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        let key = request_key(request);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let row = conn
                    .query_row(
                        "SELECT e.status, e.headers_json, e.body
                         FROM entries e JOIN partitions p ON p.name = e.partition
                         WHERE e.key = ?1
                         ORDER BY p.rowid ASC
                         LIMIT 1",
                        params![key],
                        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?)),
                    )
                    .optional()?;

                row.map(|(status, headers, body)| decode_response(status, &headers, body))
                    .transpose()
            })
            .await
            .map_err(Error::from)
    }

    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let name = partition.to_string();
        let key = request_key(request);
        let method = request.method.clone();
        let url = request.normalized_url();
        let status = i64::from(response.status);
        let headers_json = serde_json::to_string(&response.headers)?;
        let body = response.body.to_vec();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
                    params![&name, &now],
                )?;
                conn.execute(
                    "INSERT INTO entries (partition, key, method, url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(partition, key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![&name, &key, &method, &url, status, &headers_json, &body, &now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, partition: &str) -> Result<bool, Error> {
        let name = partition.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    async fn entries(&self, partition: &str) -> Result<Vec<EntryMeta>, Error> {
        let name = partition.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<EntryMeta>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT partition, method, url, status, headers_json, length(body), stored_at
                     FROM entries WHERE partition = ?1 ORDER BY rowid ASC",
                )?;
                let rows = stmt
                    .query_map(params![name], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, i64>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, i64>(5)?,
                            row.get::<_, String>(6)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;

                rows.into_iter()
                    .map(|(partition, method, url, status, headers_json, size, stored_at)| -> Result<EntryMeta, Error> {
                        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)?;
                        let content_type = headers
                            .iter()
                            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                            .map(|(_, v)| v.clone());
                        Ok(EntryMeta {
                            partition,
                            method,
                            url,
                            status: stored_status(status)?,
                            content_type,
                            size: usize::try_from(size).unwrap_or_default(),
                            stored_at,
                        })
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }
}
