//! Delta Lake store operations: overwrite-write, open, scan, DELETE
//!
//! Thin adapters over delta-rs. Every call opens the table fresh from its
//! path; nothing is cached between operations.

use crate::storage::TableRef;
use crate::{Error, Result};
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use deltalake::operations::write::SchemaMode;
use deltalake::protocol::SaveMode;
use deltalake::{open_table, DeltaOps, DeltaTable};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Name the table is registered under for SQL reads
pub const TABLE_NAME: &str = "data";

/// Outcome of materializing a batch as a table
#[derive(Debug, Clone, Serialize)]
pub struct CreateOutcome {
    pub rows_written: usize,
    pub version: Option<u64>,
}

impl fmt::Display for CreateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rows_written={}", self.rows_written)?;
        if let Some(version) = self.version {
            write!(f, ", version={}", version)?;
        }
        Ok(())
    }
}

/// Outcome of a DELETE
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteOutcome {
    pub rows_deleted: usize,
    pub rows_copied: usize,
    pub files_added: usize,
    pub files_removed: usize,
    pub execution_time_ms: u64,
    pub version: Option<u64>,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows_deleted={}, rows_copied={}, files_added={}, files_removed={}, execution_time_ms={}",
            self.rows_deleted,
            self.rows_copied,
            self.files_added,
            self.files_removed,
            self.execution_time_ms
        )?;
        if let Some(version) = self.version {
            write!(f, ", version={}", version)?;
        }
        Ok(())
    }
}

/// Open an existing Delta table
pub async fn open_table_at(table: &TableRef) -> Result<DeltaTable> {
    open_table(table.url()?).await.map_err(Error::DeltaTable)
}

/// Write `batch` as the full contents of the table, creating it if needed.
///
/// Both data and schema are replaced, so a rerun leaves exactly one copy.
pub async fn write_overwrite(table: &TableRef, batch: RecordBatch) -> Result<DeltaTable> {
    info!(
        "Writing {} rows to Delta Lake at {} (overwrite)",
        batch.num_rows(),
        table
    );

    let ops = DeltaOps::try_from_uri(table.url()?)
        .await
        .map_err(Error::DeltaTable)?;

    let written = ops
        .write(vec![batch])
        .with_save_mode(SaveMode::Overwrite)
        .with_schema_mode(SchemaMode::Overwrite)
        .await
        .map_err(Error::DeltaTable)?;

    Ok(written)
}

/// Delete every row matching `predicate`, a SQL condition parsed by the store
pub async fn delete_matching(table: DeltaTable, predicate: &str) -> Result<DeleteOutcome> {
    debug!("DELETE predicate: {}", predicate);

    let (_table, metrics) = DeltaOps(table)
        .delete()
        .with_predicate(predicate)
        .await
        .map_err(Error::DeltaTable)?;

    Ok(DeleteOutcome {
        rows_deleted: metrics.num_deleted_rows,
        rows_copied: metrics.num_copied_rows,
        files_added: metrics.num_added_files,
        files_removed: metrics.num_removed_files,
        execution_time_ms: metrics.execution_time_ms,
        version: None,
    })
}

/// Run SQL against the table registered as [`TABLE_NAME`]
pub async fn query(table: DeltaTable, sql: &str) -> Result<Vec<RecordBatch>> {
    debug!("Querying Delta Lake with SQL: {}", sql);

    let ctx = SessionContext::new();
    ctx.register_table(TABLE_NAME, Arc::new(table))?;

    let batches = ctx.sql(sql).await?.collect().await?;

    debug!("Query returned {} batches", batches.len());
    Ok(batches)
}

/// Full-table scan
pub async fn scan(table: DeltaTable) -> Result<Vec<RecordBatch>> {
    query(table, &format!("SELECT * FROM {}", TABLE_NAME)).await
}

/// Column names of the table's current schema
pub fn column_names(table: &DeltaTable) -> Result<Vec<String>> {
    let snapshot = table.snapshot().map_err(Error::DeltaTable)?;
    Ok(snapshot
        .schema()
        .fields()
        .map(|field| field.name().to_string())
        .collect())
}

/// Newest commit number in `_delta_log`, read straight from the filesystem
pub fn latest_version(table: &TableRef) -> Result<Option<u64>> {
    let log_dir = table.log_dir();
    if !log_dir.exists() {
        return Ok(None);
    }

    let mut latest = None;
    for entry in std::fs::read_dir(&log_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let version = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(version) = version {
            latest = latest.max(Some(version));
        }
    }
    Ok(latest)
}
