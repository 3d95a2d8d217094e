//! Example run: create a table, upsert into it, delete from it
//!
//! Progress and the table contents after each step are written to `out`.

use crate::delta_lake::operations::TABLE_NAME;
use crate::storage::TableRef;
use crate::table_ops::{create_table, delete_from_table, merge_into_table, query_table};
use crate::Result;
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

pub const DEFAULT_TABLE_PATH: &str = "example_delta_table";
pub const DEFAULT_MERGE_KEY: &str = "id";
pub const DEFAULT_DELETE_PREDICATE: &str = "age > 40";

/// Printed tables are sorted on this column, whatever the merge key
const DISPLAY_ORDER_COLUMN: &str = "id";

/// Inputs of the example run
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub table_path: PathBuf,
    pub merge_key: String,
    pub delete_predicate: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            merge_key: DEFAULT_MERGE_KEY.to_string(),
            delete_predicate: DEFAULT_DELETE_PREDICATE.to_string(),
        }
    }
}

/// id, name, age, city; all nullable
pub fn people_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, true),
        Field::new("name", DataType::Utf8, true),
        Field::new("age", DataType::Int64, true),
        Field::new("city", DataType::Utf8, true),
    ]))
}

fn people_batch(
    ids: Vec<i64>,
    names: Vec<&str>,
    ages: Vec<i64>,
    cities: Vec<&str>,
) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(ids)),
        Arc::new(StringArray::from(names)),
        Arc::new(Int64Array::from(ages)),
        Arc::new(StringArray::from(cities)),
    ];
    Ok(RecordBatch::try_new(people_schema(), columns)?)
}

/// The five starting rows, ages 25 through 45
pub fn initial_people() -> Result<RecordBatch> {
    people_batch(
        vec![1, 2, 3, 4, 5],
        vec!["Alice", "Bob", "Charlie", "David", "Eve"],
        vec![25, 30, 35, 40, 45],
        vec!["New York", "Los Angeles", "Chicago", "Houston", "Phoenix"],
    )
}

/// Two updates (ids 2, 3) and one new row (id 6)
pub fn people_updates() -> Result<RecordBatch> {
    people_batch(
        vec![2, 3, 6],
        vec!["Bob Updated", "Charlie Updated", "Frank"],
        vec![31, 36, 50],
        vec!["San Francisco", "Boston", "Seattle"],
    )
}

/// Run the three steps in order, stopping at the first error
pub async fn run_demo<W: Write>(config: &DemoConfig, out: &mut W) -> Result<()> {
    let table = TableRef::resolve(&config.table_path)?;
    info!("Running demo against {}", table);

    // Step 1: create
    let people = initial_people()?;
    writeln!(out, "Creating initial Delta table at: {}", table)?;
    let created = create_table(people, table.path()).await?;
    writeln!(
        out,
        "Initial Delta table created successfully with {} rows",
        created.rows_written
    )?;
    writeln!(out, "Initial Delta table contents:")?;
    print_table(out, table.path()).await?;

    // Step 2: upsert
    let updates = people_updates()?;
    writeln!(
        out,
        "Merging {} rows into Delta table at: {}",
        updates.num_rows(),
        table
    )?;
    let merged = merge_into_table(updates, table.path(), &config.merge_key).await?;
    writeln!(out, "Merge operation completed successfully")?;
    writeln!(out, "Merge statistics: {}", serde_json::to_string(&merged)?)?;
    writeln!(out, "Updated Delta table contents:")?;
    print_table(out, table.path()).await?;

    // Step 3: delete
    writeln!(
        out,
        "Deleting rows from Delta table at: {} where {}",
        table, config.delete_predicate
    )?;
    let deleted = delete_from_table(table.path(), &config.delete_predicate).await?;
    writeln!(out, "Delete operation completed successfully")?;
    writeln!(out, "Delete statistics: {}", serde_json::to_string(&deleted)?)?;
    writeln!(out, "Updated Delta table contents:")?;
    print_table(out, table.path()).await?;

    Ok(())
}

/// Run the example, reporting any failure on `out` as `Error: <message>`
///
/// Never fails: the error is written and logged instead of returned.
pub async fn run<W: Write>(config: &DemoConfig, out: &mut W) {
    if let Err(e) = run_demo(config, out).await {
        error!("demo failed: {}", e);
        if let Err(io) = writeln!(out, "Error: {}", e) {
            error!("could not report error: {}", io);
        }
    }
}

async fn print_table<W: Write>(out: &mut W, path: &Path) -> Result<()> {
    let sql = format!(
        "SELECT * FROM {} ORDER BY \"{}\"",
        TABLE_NAME, DISPLAY_ORDER_COLUMN
    );
    let batches = query_table(path, &sql).await?;
    writeln!(out, "{}", pretty_format_batches(&batches)?)?;
    Ok(())
}
