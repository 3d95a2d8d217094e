//! DeleteFromTable Integration Tests
//!
//! Raw and typed predicates, missing tables, and store-level parse errors.

use lakeops::demo::initial_people;
use lakeops::{create_table, delete_from_table, delete_where, read_table, Error, Predicate};
use lakeops_tests::{commit_count, people};
use tempfile::TempDir;

async fn seeded_table(temp_dir: &TempDir) -> std::path::PathBuf {
    let table_path = temp_dir.path().join("people");
    create_table(initial_people().unwrap(), &table_path)
        .await
        .unwrap();
    table_path
}

fn ages(rows: &[lakeops_tests::Person]) -> Vec<i64> {
    let mut ages: Vec<i64> = rows.iter().map(|p| p.age).collect();
    ages.sort_unstable();
    ages
}

/// Test 1: Deleting `age > 40` keeps ages 25..=40
#[tokio::test]
async fn test_delete_by_raw_predicate() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = seeded_table(&temp_dir).await;

    let outcome = delete_from_table(&table_path, "age > 40").await.unwrap();
    assert_eq!(outcome.rows_deleted, 1);
    assert_eq!(outcome.version, Some(1));
    assert_eq!(commit_count(&table_path), 2);

    let rows = people(&read_table(&table_path).await.unwrap());
    assert_eq!(ages(&rows), vec![25, 30, 35, 40]);
}

/// Test 2: Deleting from a missing table fails with the path in the message
#[tokio::test]
async fn test_delete_from_missing_table() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = temp_dir.path().join("ghost_table");

    let err = delete_from_table(&table_path, "age > 40")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
    assert!(err.to_string().contains("ghost_table"));
    assert!(!table_path.exists());
}

/// Test 3: Malformed raw predicates come back as store errors, not NotFound
#[tokio::test]
async fn test_delete_malformed_predicate_is_store_error() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = seeded_table(&temp_dir).await;

    let err = delete_from_table(&table_path, "age >>> ")
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err, Error::DeltaTable(_)), "got {:?}", err);

    let rows = people(&read_table(&table_path).await.unwrap());
    assert_eq!(rows.len(), 5, "table unchanged");
}

/// Test 4: Typed predicate deletes the same rows as its SQL text
#[tokio::test]
async fn test_delete_with_typed_predicate() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = seeded_table(&temp_dir).await;

    let predicate = Predicate::lt("age", 30).or(Predicate::eq("city", "Phoenix"));
    let outcome = delete_where(&table_path, &predicate).await.unwrap();
    assert_eq!(outcome.rows_deleted, 2);

    let rows = people(&read_table(&table_path).await.unwrap());
    assert_eq!(ages(&rows), vec![30, 35, 40]);
}

/// Test 5: Typed predicates naming unknown columns are rejected up front
#[tokio::test]
async fn test_delete_typed_predicate_unknown_column() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = seeded_table(&temp_dir).await;

    let err = delete_where(&table_path, &Predicate::gt("salary", 100))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)), "got {:?}", err);
    assert_eq!(commit_count(&table_path), 1, "no commit was made");
}

/// Test 6: A predicate matching nothing leaves every row in place
#[tokio::test]
async fn test_delete_matching_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = seeded_table(&temp_dir).await;

    let outcome = delete_from_table(&table_path, "age > 100").await.unwrap();
    assert_eq!(outcome.rows_deleted, 0);

    let rows = people(&read_table(&table_path).await.unwrap());
    assert_eq!(rows.len(), 5);
}
