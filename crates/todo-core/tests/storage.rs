use std::fs;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use todo_core::storage::{Storage, StorageError};
use todo_core::todo::{Priority, TodoList};

fn sample_list() -> TodoList {
    let mut todos = TodoList::new();
    todos.add(
        "Learn Rust",
        NaiveDate::from_ymd_opt(2025, 1, 1),
        Some(Priority::High),
    );
    todos.add("No extras", None, None);
    todos.add("Done already", None, Some(Priority::Low));
    todos.toggle_complete(2).expect("toggle");
    todos
}

#[test]
fn save_then_load_round_trips_every_field() {
    let temp = TempDir::new().expect("tempdir");
    let storage = Storage::new(temp.path().join("todos.json"));
    let todos = sample_list();

    storage.save(&todos).expect("save");
    let loaded = storage.load().expect("load");

    assert_eq!(loaded, todos);
    let plain = loaded.get(1).expect("todo");
    assert!(plain.due_date.is_none());
    assert!(plain.priority.is_none());
    assert!(plain.completed_at.is_none());
}

#[test]
fn missing_file_is_not_found_and_defaults_to_empty() {
    let temp = TempDir::new().expect("tempdir");
    let storage = Storage::new(temp.path().join("absent.json"));

    assert!(matches!(storage.load(), Err(StorageError::NotFound(_))));
    assert!(storage.load_or_default().expect("default").is_empty());
}

#[test]
fn malformed_file_is_an_error_even_with_default() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("todos.json");
    fs::write(&path, "{ not json").expect("write");
    let storage = Storage::new(&path);

    assert!(matches!(storage.load_or_default(), Err(StorageError::Json(_))));
    assert_eq!(fs::read_to_string(&path).expect("read"), "{ not json");
}

#[test]
fn save_creates_parent_dirs_and_leaves_no_temp_file() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("nested").join("todos.json");
    let storage = Storage::new(&path);

    storage.save(&sample_list()).expect("save");

    assert!(path.is_file());
    assert!(!temp.path().join("nested").join("todos.json.tmp").exists());
}

#[test]
fn save_replaces_previous_contents() {
    let temp = TempDir::new().expect("tempdir");
    let storage = Storage::new(temp.path().join("todos.json"));
    storage.save(&sample_list()).expect("save");

    let mut todos = storage.load().expect("load");
    todos.remove(0).expect("remove");
    storage.save(&todos).expect("save");

    assert_eq!(storage.load().expect("load").len(), 2);
}

#[test]
fn file_uses_legacy_field_names() {
    let temp = TempDir::new().expect("tempdir");
    let storage = Storage::new(temp.path().join("todos.json"));
    storage.save(&sample_list()).expect("save");

    let raw = fs::read_to_string(storage.path()).expect("read");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let first = &value.as_array().expect("array")[0];
    assert_eq!(first["Title"], "Learn Rust");
    assert_eq!(first["Completed"], false);
    assert_eq!(first["DueDate"], "2025-01-01");
    assert_eq!(first["Priority"], "high");
    assert!(first["CompletedAt"].is_null());
    assert!(first["CreatedAt"].is_string());
}

#[test]
fn loads_file_written_by_older_versions() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("todos.json");
    fs::write(
        &path,
        r#"[
  {"Title":"Read docs","Completed":true,"CreatedAt":"2024-10-17T09:30:00+02:00",
   "CompletedAt":"2024-10-18T12:00:00Z","DueDate":"2024-10-20T00:00:00Z","Priority":"medium"},
  {"Title":"Untyped","Completed":false,"CreatedAt":"2024-10-17T09:31:00Z",
   "CompletedAt":null,"DueDate":null,"Priority":""}
]"#,
    )
    .expect("write");

    let todos = Storage::new(&path).load().expect("load");
    assert_eq!(todos.len(), 2);
    let first = todos.get(0).expect("todo");
    assert!(first.completed);
    assert!(first.completed_at.is_some());
    assert_eq!(first.due_date, NaiveDate::from_ymd_opt(2024, 10, 20));
    assert_eq!(first.priority, Some(Priority::Medium));
    assert_eq!(todos.get(1).expect("todo").priority, None);
    assert_eq!(todos.count_completed(), 1);
}
