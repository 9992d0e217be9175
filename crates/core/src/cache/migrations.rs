//! Schema migrations for the partition store.
//!
//! `schema_version` records every applied step. Each step runs in its own
//! transaction together with its version row, so a failed step leaves the
//! database at the previous version.

use tokio_rusqlite::{Connection, params};

use crate::Error;

/// Ordered schema steps.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_partitions.sql"))];

/// Apply pending migrations, returning how many ran.
///
/// # Errors
///
/// Returns `MigrationFailed` naming the step whose SQL did not apply.
pub async fn run(conn: &Connection) -> Result<usize, Error> {
    conn.call(|conn| -> Result<usize, Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )?;

        let current: i64 = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0))?;

        let mut applied = 0;
        for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("step {version}: {e}")))?;
            tx.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::debug!(version, "applied cache migration");
            applied += 1;
        }

        Ok(applied)
    })
    .await
    .map_err(Error::from)
}
