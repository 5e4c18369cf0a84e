//! Store scenario tests
//!
//! Exercise the library the way a caller would: build stores from
//! configuration, write through them, and compare the resulting directory
//! layout and file contents exactly.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use stratum::domain::{
    Cell, DataAssetIdentifier, ExpectationSuiteIdentifier, IdentifierKind, ResourceIdentifier,
    Table, ValidationResultIdentifier, Value,
};
use stratum::storage::{
    BasicInMemoryStore, DelimitedFileSystemWriteOnlyStore, FileSystemWriteOnlyStore,
    FilesystemStoreBackendConfig, NamespacedReadWriteStore, NamespacedReadWriteStoreConfig,
    SerializationType, StoreBackendConfig, StoreError, WriteOnlyStoreConfig,
};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Renders a directory as an indented tree, four spaces per level, sorted by name
fn gen_directory_tree_str(root: &Path) -> String {
    let mut out = String::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.unwrap();
        let indent = "    ".repeat(entry.depth());
        let name = entry.file_name().to_string_lossy();

        if entry.file_type().is_dir() {
            out.push_str(&format!("{}{}/\n", indent, name));
        } else {
            out.push_str(&format!("{}{}\n", indent, name));
        }
    }

    out
}

fn validation_id(parts: [&str; 5]) -> ResourceIdentifier {
    let asset = DataAssetIdentifier::new(parts[0], parts[1], parts[2]).unwrap();
    let suite = ExpectationSuiteIdentifier::new(asset, parts[3]).unwrap();
    ValidationResultIdentifier::new(suite, parts[4]).unwrap().into()
}

fn filesystem_config(
    template: &str,
    extension: &str,
    serialization_type: Option<SerializationType>,
) -> NamespacedReadWriteStoreConfig {
    NamespacedReadWriteStoreConfig {
        resource_identifier_class_name: IdentifierKind::ValidationResultIdentifier,
        serialization_type,
        store_backend: StoreBackendConfig::Filesystem(FilesystemStoreBackendConfig {
            base_directory: "my_store/".to_string(),
            file_extension: Some(extension.to_string()),
            filepath_template: template.to_string(),
            replaced_substring: None,
            replacement_string: None,
        }),
    }
}

// =============================================================================
// Namespaced store, filesystem backend
// =============================================================================

#[test]
fn filesystem_store_lays_out_templated_paths() {
    let dir = TempDir::new().unwrap();
    let config = filesystem_config(
        "{4}/{0}/{1}/{2}/validation-results-{2}-{3}.{file_extension}",
        "txt",
        None,
    );
    let mut store = NamespacedReadWriteStore::new(&config, Some(dir.path())).unwrap();

    let first = validation_id(["a", "b", "c", "quarantine", "prod-100"]);
    store.set(&first, &Value::from("aaa")).unwrap();

    let file = dir
        .path()
        .join("my_store/prod-100/a/b/c/validation-results-c-quarantine.txt");
    assert_eq!(fs::read_to_string(file).unwrap(), "aaa");
    assert_eq!(store.get(&first).unwrap(), Value::from("aaa"));

    let second = validation_id(["a", "b", "c", "quarantine", "prod-200"]);
    store.set(&second, &Value::from("bbb")).unwrap();

    assert_eq!(
        gen_directory_tree_str(&dir.path().join("my_store")),
        "\
my_store/
    prod-100/
        a/
            b/
                c/
                    validation-results-c-quarantine.txt
    prod-200/
        a/
            b/
                c/
                    validation-results-c-quarantine.txt
"
    );

    assert_eq!(
        store.list_keys().unwrap(),
        HashSet::from([first.clone(), second.clone()])
    );
    assert!(store.has_key(&second).unwrap());
}

#[test]
fn filesystem_store_overwrites_existing_key() {
    let dir = TempDir::new().unwrap();
    let config = filesystem_config("{4}/{0}/{1}/{2}/{3}.{file_extension}", "txt", None);
    let mut store = NamespacedReadWriteStore::new(&config, Some(dir.path())).unwrap();
    let id = validation_id(["a", "b", "c", "d", "run"]);

    store.set(&id, &Value::from("first")).unwrap();
    store.set(&id, &Value::from("second")).unwrap();

    assert_eq!(store.get(&id).unwrap(), Value::from("second"));
    assert_eq!(store.list_keys().unwrap().len(), 1);
}

#[test]
fn tabular_store_writes_csv_and_cannot_read_back() {
    let dir = TempDir::new().unwrap();
    let config = filesystem_config(
        "{4}/{0}/{1}/{2}/quarantined-rows-{2}-{3}.{file_extension}",
        "csv",
        Some(SerializationType::Csv),
    );
    let mut store = NamespacedReadWriteStore::new(&config, Some(dir.path())).unwrap();
    let id = validation_id(["a", "b", "c", "quarantine", "prod-100"]);

    let table = Table::from_columns([
        ("x", vec![Cell::Int(1), Cell::Int(2), Cell::Int(3)]),
        ("y", vec![Cell::from("a"), Cell::from("b"), Cell::from("c")]),
    ])
    .unwrap();
    store.set(&id, &Value::Table(table)).unwrap();

    let file = dir
        .path()
        .join("my_store/prod-100/a/b/c/quarantined-rows-c-quarantine.csv");
    assert_eq!(fs::read_to_string(file).unwrap(), "x,y\n1,a\n2,b\n3,c\n");

    assert!(matches!(
        store.get(&id),
        Err(StoreError::DeserializationUnsupported(_))
    ));
}

#[test]
fn type_guard_runs_before_any_write() {
    let dir = TempDir::new().unwrap();
    let config = filesystem_config(
        "{4}/{0}/{1}/{2}/{3}.{file_extension}",
        "csv",
        Some(SerializationType::Csv),
    );
    let mut store = NamespacedReadWriteStore::new(&config, Some(dir.path())).unwrap();
    let id = validation_id(["a", "b", "c", "d", "run"]);

    let err = store.set(&id, &Value::from("x,y\n1,a\n")).unwrap_err();

    assert!(matches!(err, StoreError::InvalidValue { .. }));
    assert!(!dir.path().join("my_store").exists());
}

#[test]
fn wrong_identifier_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = filesystem_config("{4}/{0}/{1}/{2}/{3}.{file_extension}", "txt", None);
    let mut store = NamespacedReadWriteStore::new(&config, Some(dir.path())).unwrap();

    let asset: ResourceIdentifier = DataAssetIdentifier::new("a", "b", "c").unwrap().into();

    assert!(matches!(
        store.set(&asset, &Value::from("x")),
        Err(StoreError::TypeMismatch { .. })
    ));
    assert!(matches!(store.get(&asset), Err(StoreError::TypeMismatch { .. })));
}

#[test]
fn empty_identifier_is_absent_not_defaulted() {
    let dir = TempDir::new().unwrap();
    let config = filesystem_config("{4}/{0}/{1}/{2}/{3}.{file_extension}", "txt", None);
    let store = NamespacedReadWriteStore::new(&config, Some(dir.path())).unwrap();

    let empty: ResourceIdentifier = ValidationResultIdentifier::default().into();

    assert!(store.get(&empty).unwrap_err().is_not_found());
    assert!(!store.has_key(&empty).unwrap());
}

// =============================================================================
// Namespaced store, in-memory backend
// =============================================================================

#[test]
fn in_memory_store_round_trips_and_lists() {
    let config = NamespacedReadWriteStoreConfig {
        resource_identifier_class_name: IdentifierKind::ValidationResultIdentifier,
        serialization_type: None,
        store_backend: StoreBackendConfig::default(),
    };
    let mut store = NamespacedReadWriteStore::new(&config, None).unwrap();

    let first = validation_id(["a", "b", "c", "quarantine", "prod-100"]);
    let second = validation_id(["a", "b", "c", "quarantine", "prod-200"]);

    assert!(store.get(&first).unwrap_err().is_not_found());

    store.set(&first, &Value::from("aaa")).unwrap();
    store.set(&second, &Value::from("bbb")).unwrap();

    assert_eq!(store.get(&first).unwrap(), Value::from("aaa"));
    assert_eq!(store.list_keys().unwrap(), HashSet::from([first, second]));

    let backend = store.backend().as_in_memory().unwrap();
    assert_eq!(
        backend.raw_entries().get("a.b.c.quarantine.prod-100"),
        Some(&b"aaa".to_vec())
    );
}

// =============================================================================
// Simpler stores
// =============================================================================

#[test]
fn basic_in_memory_store_contract() {
    let mut store = BasicInMemoryStore::new();

    let err = store.set("B", serde_json::json!({"x": 1})).unwrap_err();
    assert!(matches!(err, StoreError::TypeMismatch { .. }));

    store.set("A", "aaa").unwrap();
    assert_eq!(store.get("A").unwrap(), "aaa");
    assert!(store.has_key("A"));
    assert!(!store.has_key("B"));
    assert!(store.get("B").unwrap_err().is_not_found());
}

#[test]
fn write_only_stores_produce_same_layout() {
    let dir = TempDir::new().unwrap();
    let config = WriteOnlyStoreConfig {
        base_directory: "my_store/".to_string(),
    };

    FileSystemWriteOnlyStore::new(&config, Some(dir.path()))
        .unwrap()
        .set("a/b/index.txt", "hello!")
        .unwrap();
    DelimitedFileSystemWriteOnlyStore::new(&config, Some(dir.path()))
        .unwrap()
        .set(&["a", "c", "index.txt"], "hi")
        .unwrap();

    assert_eq!(
        gen_directory_tree_str(&dir.path().join("my_store")),
        "\
my_store/
    a/
        b/
            index.txt
        c/
            index.txt
"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("my_store/a/b/index.txt")).unwrap(),
        "hello!"
    );
}
