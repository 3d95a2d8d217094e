//! Delta Lake MERGE Operation
//!
//! Upserts a source batch into a target table in a single Delta commit.
//! The join, the per-row clause evaluation and the file rewrite are all done
//! by delta-rs; this module only describes what should happen on match and
//! on no-match, and turns the store's metrics into a [`MergeOutcome`].

use crate::{Error, Result};
use arrow::record_batch::RecordBatch;
use datafusion::common::Column;
use datafusion::logical_expr::Expr;
use datafusion::prelude::SessionContext;
use deltalake::{DeltaOps, DeltaTable};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// What to do with target rows whose key matches a source row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchedPolicy {
    /// Overwrite every column present in the source
    UpdateAll,
    /// Remove the target row
    Delete,
    /// Leave the target row untouched
    Ignore,
}

/// What to do with source rows that have no matching target row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotMatchedPolicy {
    /// Insert the full source row
    InsertAll,
    Ignore,
}

/// Join key plus the matched / not-matched policies of a MERGE
///
/// # Example
/// ```
/// use lakeops::delta_lake::merge::{MatchedPolicy, MergeSpec};
///
/// let spec = MergeSpec::upsert("id");
/// assert_eq!(spec.predicate(), "source.id = target.id");
///
/// let prune = MergeSpec::upsert("id").on_match(MatchedPolicy::Delete);
/// assert_eq!(prune.matched(), MatchedPolicy::Delete);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSpec {
    key: String,
    matched: MatchedPolicy,
    not_matched: NotMatchedPolicy,
    source_alias: String,
    target_alias: String,
}

impl MergeSpec {
    /// Update all columns on match, insert the full row otherwise
    pub fn upsert(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            matched: MatchedPolicy::UpdateAll,
            not_matched: NotMatchedPolicy::InsertAll,
            source_alias: "source".to_string(),
            target_alias: "target".to_string(),
        }
    }

    pub fn on_match(mut self, policy: MatchedPolicy) -> Self {
        self.matched = policy;
        self
    }

    pub fn on_no_match(mut self, policy: NotMatchedPolicy) -> Self {
        self.not_matched = policy;
        self
    }

    pub fn with_aliases(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_alias = source.into();
        self.target_alias = target.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn matched(&self) -> MatchedPolicy {
        self.matched
    }

    pub fn not_matched(&self) -> NotMatchedPolicy {
        self.not_matched
    }

    /// Join condition in SQL form, e.g. `source.id = target.id`
    pub fn predicate(&self) -> String {
        format!(
            "{}.{} = {}.{}",
            self.source_alias, self.key, self.target_alias, self.key
        )
    }

    /// Join condition as an expression; column names are never re-parsed
    fn predicate_expr(&self) -> Expr {
        self.source_column(&self.key).eq(Expr::Column(Column::new(
            Some(self.target_alias.as_str()),
            self.key.as_str(),
        )))
    }

    fn source_column(&self, name: &str) -> Expr {
        Expr::Column(Column::new(Some(self.source_alias.as_str()), name))
    }

    /// The key must be a column of both sides
    pub fn validate(&self, source_columns: &[String], target_columns: &[String]) -> Result<()> {
        if !source_columns.iter().any(|c| c == &self.key) {
            return Err(Error::InvalidOperation(format!(
                "Merge key '{}' not found in source columns {:?}",
                self.key, source_columns
            )));
        }
        if !target_columns.iter().any(|c| c == &self.key) {
            return Err(Error::InvalidOperation(format!(
                "Merge key '{}' not found in target columns {:?}",
                self.key, target_columns
            )));
        }
        Ok(())
    }
}

/// Metrics from a MERGE, as reported by the store
#[derive(Debug, Default, Clone, Serialize)]
pub struct MergeOutcome {
    pub source_rows: usize,
    pub rows_inserted: usize,
    pub rows_updated: usize,
    pub rows_deleted: usize,
    pub rows_copied: usize,
    pub output_rows: usize,
    pub files_added: usize,
    pub files_removed: usize,
    pub execution_time_ms: u64,
    pub version: Option<u64>,
}

impl MergeOutcome {
    pub fn total_rows_affected(&self) -> usize {
        self.rows_inserted + self.rows_updated + self.rows_deleted
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "source_rows={}, inserted={}, updated={}, deleted={}, copied={}, files_added={}, files_removed={}, execution_time_ms={}",
            self.source_rows,
            self.rows_inserted,
            self.rows_updated,
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

/// Merge `source` into `target` according to `spec`
///
/// Callers are expected to have run [`MergeSpec::validate`] against both schemas.
pub async fn execute(
    target: DeltaTable,
    source: RecordBatch,
    spec: &MergeSpec,
) -> Result<MergeOutcome> {
    info!(
        "Executing MERGE on {} ({:?} on match, {:?} otherwise)",
        spec.predicate(),
        spec.matched,
        spec.not_matched
    );

    let columns: Vec<String> = source
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let ctx = SessionContext::new();
    let source_df = ctx.read_batch(source)?;

    let mut builder = DeltaOps(target)
        .merge(source_df, spec.predicate_expr())
        .with_source_alias(spec.source_alias.as_str())
        .with_target_alias(spec.target_alias.as_str());

    builder = match spec.matched {
        MatchedPolicy::UpdateAll => builder
            .when_matched_update(|update| {
                columns.iter().fold(update, |update, name| {
                    update.update(
                        Column::new_unqualified(name.as_str()),
                        spec.source_column(name),
                    )
                })
            })
            .map_err(Error::DeltaTable)?,
        MatchedPolicy::Delete => builder
            .when_matched_delete(|delete| delete)
            .map_err(Error::DeltaTable)?,
        MatchedPolicy::Ignore => builder,
    };

    builder = match spec.not_matched {
        NotMatchedPolicy::InsertAll => builder
            .when_not_matched_insert(|insert| {
                columns.iter().fold(insert, |insert, name| {
                    insert.set(
                        Column::new_unqualified(name.as_str()),
                        spec.source_column(name),
                    )
                })
            })
            .map_err(Error::DeltaTable)?,
        NotMatchedPolicy::Ignore => builder,
    };

    let (_table, metrics) = builder.await.map_err(Error::DeltaTable)?;

    let outcome = MergeOutcome {
        source_rows: metrics.num_source_rows,
        rows_inserted: metrics.num_target_rows_inserted,
        rows_updated: metrics.num_target_rows_updated,
        rows_deleted: metrics.num_target_rows_deleted,
        rows_copied: metrics.num_target_rows_copied,
        output_rows: metrics.num_output_rows,
        files_added: metrics.num_target_files_added,
        files_removed: metrics.num_target_files_removed,
        execution_time_ms: metrics.execution_time_ms,
        version: None,
    };

    debug!("MERGE metrics: {}", outcome);
    info!(
        "MERGE completed: inserted={}, updated={}, deleted={}",
        outcome.rows_inserted, outcome.rows_updated, outcome.rows_deleted
    );

    Ok(outcome)
}
