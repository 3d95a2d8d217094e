//! Table mutation operations: create, merge, delete, read
//!
//! Each operation resolves its path, checks preconditions, then hands the
//! work to the Delta Lake store. Nothing carries over between calls except
//! the table persisted on disk.
//!
//! The existence probe before a merge or delete is not atomic with the store
//! write: a table removed in between surfaces as a store error rather than
//! [`crate::Error::TableNotFound`].

use crate::delta_lake::merge::{self, MergeOutcome, MergeSpec};
use crate::delta_lake::operations::{self, CreateOutcome, DeleteOutcome};
use crate::predicate::Predicate;
use crate::storage::TableRef;
use crate::Result;
use arrow::record_batch::RecordBatch;
use deltalake::DeltaTable;
use std::path::Path;
use tracing::info;

/// Materialize `batch` as a new table at `path`, replacing any existing table
///
/// Intermediate directories are created as needed.
pub async fn create_table<P: AsRef<Path>>(batch: RecordBatch, path: P) -> Result<CreateOutcome> {
    let table = TableRef::resolve(path)?;
    info!("Creating Delta table at: {}", table);

    table.ensure_dirs()?;

    let rows_written = batch.num_rows();
    operations::write_overwrite(&table, batch).await?;

    let outcome = CreateOutcome {
        rows_written,
        version: operations::latest_version(&table)?,
    };
    info!("Delta table created with {} rows", outcome.rows_written);
    Ok(outcome)
}

/// Upsert `source` into the table at `target_path`, joining on `key`
///
/// Matched rows get every source column; unmatched source rows are inserted.
pub async fn merge_into_table<P: AsRef<Path>>(
    source: RecordBatch,
    target_path: P,
    key: &str,
) -> Result<MergeOutcome> {
    merge_with_spec(source, target_path, &MergeSpec::upsert(key)).await
}

/// Merge with explicit matched / not-matched policies
pub async fn merge_with_spec<P: AsRef<Path>>(
    source: RecordBatch,
    target_path: P,
    spec: &MergeSpec,
) -> Result<MergeOutcome> {
    let (table, target) = open_existing(target_path).await?;
    info!("Merging {} rows into Delta table at: {}", source.num_rows(), table);

    let source_columns: Vec<String> = source
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    spec.validate(&source_columns, &operations::column_names(&target)?)?;

    let mut outcome = merge::execute(target, source, spec).await?;
    outcome.version = operations::latest_version(&table)?;
    Ok(outcome)
}

/// Delete every row matching a raw SQL condition
///
/// The condition is passed to the store untouched; a malformed condition
/// comes back as the store's own parse error.
pub async fn delete_from_table<P: AsRef<Path>>(
    target_path: P,
    predicate: &str,
) -> Result<DeleteOutcome> {
    let (table, target) = open_existing(target_path).await?;
    info!("Deleting rows from Delta table at: {} where {}", table, predicate);

    let mut outcome = operations::delete_matching(target, predicate).await?;
    outcome.version = operations::latest_version(&table)?;
    info!("DELETE removed {} rows", outcome.rows_deleted);
    Ok(outcome)
}

/// Delete with a typed predicate, checked against the table schema first
pub async fn delete_where<P: AsRef<Path>>(
    target_path: P,
    predicate: &Predicate,
) -> Result<DeleteOutcome> {
    let (table, target) = open_existing(target_path).await?;
    predicate.validate(&operations::column_names(&target)?)?;

    let sql = predicate.to_sql();
    info!("Deleting rows from Delta table at: {} where {}", table, sql);

    let mut outcome = operations::delete_matching(target, &sql).await?;
    outcome.version = operations::latest_version(&table)?;
    info!("DELETE removed {} rows", outcome.rows_deleted);
    Ok(outcome)
}

/// Full scan of the table at `path`
pub async fn read_table<P: AsRef<Path>>(path: P) -> Result<Vec<RecordBatch>> {
    let (_, target) = open_existing(path).await?;
    operations::scan(target).await
}

/// Run SQL against the table at `path`, registered as `data`
pub async fn query_table<P: AsRef<Path>>(path: P, sql: &str) -> Result<Vec<RecordBatch>> {
    let (_, target) = open_existing(path).await?;
    operations::query(target, sql).await
}

/// Resolve, require the path to exist, then open it
async fn open_existing<P: AsRef<Path>>(path: P) -> Result<(TableRef, DeltaTable)> {
    let table = TableRef::resolve(path)?;
    table.require_existing()?;
    let target = operations::open_table_at(&table).await?;
    Ok((table, target))
}

/// Total rows across batches
pub fn row_count(batches: &[RecordBatch]) -> usize {
    batches.iter().map(|b| b.num_rows()).sum()
}
