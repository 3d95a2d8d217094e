//! CreateTable Integration Tests
//!
//! Round-trip, overwrite idempotence and directory handling against real
//! Delta tables on disk.

use lakeops::demo::{initial_people, people_updates};
use lakeops::{create_table, read_table, row_count};
use lakeops_tests::{commit_count, people, Person};
use tempfile::TempDir;

/// Test 1: Create then read returns exactly what was written
#[tokio::test]
async fn test_create_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = temp_dir.path().join("people");

    let outcome = create_table(initial_people().unwrap(), &table_path)
        .await
        .unwrap();
    assert_eq!(outcome.rows_written, 5);

    let batches = read_table(&table_path).await.unwrap();
    assert_eq!(row_count(&batches), 5);
    assert_eq!(
        people(&batches),
        vec![
            Person::new(1, "Alice", 25, "New York"),
            Person::new(2, "Bob", 30, "Los Angeles"),
            Person::new(3, "Charlie", 35, "Chicago"),
            Person::new(4, "David", 40, "Houston"),
            Person::new(5, "Eve", 45, "Phoenix"),
        ]
    );
}

/// Test 2: Creating twice in overwrite mode keeps one copy of the data
#[tokio::test]
async fn test_create_twice_does_not_duplicate() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = temp_dir.path().join("people");

    create_table(initial_people().unwrap(), &table_path)
        .await
        .unwrap();
    let second = create_table(initial_people().unwrap(), &table_path)
        .await
        .unwrap();

    assert_eq!(second.version, Some(1), "overwrite is a new commit");
    let batches = read_table(&table_path).await.unwrap();
    assert_eq!(row_count(&batches), 5, "no duplicated rows");
    assert_eq!(commit_count(&table_path), 2);
}

/// Test 3: Overwrite replaces a table holding different rows
#[tokio::test]
async fn test_create_replaces_existing_contents() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = temp_dir.path().join("people");

    create_table(initial_people().unwrap(), &table_path)
        .await
        .unwrap();
    create_table(people_updates().unwrap(), &table_path)
        .await
        .unwrap();

    let rows = people(&read_table(&table_path).await.unwrap());
    let ids: Vec<i64> = rows.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 3, 6]);
}

/// Test 4: Intermediate directories are created and relative segments folded
#[tokio::test]
async fn test_create_makes_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let table_path = temp_dir
        .path()
        .join("lake")
        .join("raw")
        .join("..")
        .join("curated")
        .join("people");

    create_table(initial_people().unwrap(), &table_path)
        .await
        .unwrap();

    let expected = temp_dir.path().join("lake").join("curated").join("people");
    assert!(expected.join("_delta_log").exists());
    assert!(!temp_dir.path().join("lake").join("raw").exists());
}

/// Test 5: A parent that cannot be created surfaces as an IO error
#[tokio::test]
async fn test_create_under_a_file_fails_with_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"plain file").unwrap();

    let err = create_table(initial_people().unwrap(), blocker.join("people"))
        .await
        .unwrap_err();
    assert!(matches!(err, lakeops::Error::Io(_)), "got {:?}", err);
    assert!(!err.is_not_found());
}
