//! Integration tests for the ModuleManager public interface.
//!
//! These tests drive whole flows (upload, view, promote, demote, delete)
//! against a temporary data root.

use moddock_core::config::PathsConfig;
use moddock_core::{ModdockError, ModuleManager, ModuleType};
use std::io::{Cursor, Write};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Build a zip archive in memory.
fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Create a manager over a fresh temporary data root.
fn create_test_env() -> (TempDir, ModuleManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = ModuleManager::new(temp_dir.path()).expect("Failed to create manager");
    (temp_dir, manager)
}

async fn upload_sample(manager: &ModuleManager) {
    let data = zip_bytes(&[("app.py", "print('hello')"), ("requirements.txt", "flask\n")]);
    manager.upload("sample.zip", None, &data).await.unwrap();
}

#[tokio::test]
async fn test_manager_creates_layout() {
    let (temp_dir, manager) = create_test_env();

    assert!(temp_dir.path().join(PathsConfig::UPLOADS_DIR_NAME).is_dir());
    assert!(temp_dir.path().join(PathsConfig::MODULES_DIR_NAME).is_dir());
    assert!(temp_dir.path().join(PathsConfig::STORE_DIR_NAME).is_dir());
    assert_eq!(manager.data_root(), temp_dir.path());
}

#[tokio::test]
async fn test_builder_requires_existing_root_without_auto_create() {
    let temp_dir = TempDir::new().unwrap();
    let result = ModuleManager::builder(temp_dir.path().join("missing")).build();
    assert!(matches!(result, Err(ModdockError::Config { .. })));
}

#[tokio::test]
async fn test_builder_custom_directories() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ModuleManager::builder(temp_dir.path())
        .auto_create_dirs(true)
        .modules_dir(temp_dir.path().join("active"))
        .store_dir(temp_dir.path().join("published"))
        .uploads_dir(temp_dir.path().join("incoming"))
        .build()
        .unwrap();

    upload_sample(&manager).await;
    manager.add_to_store("sample").await.unwrap();

    assert!(temp_dir.path().join("active/sample/app.py").is_file());
    assert!(temp_dir.path().join("published/sample/app.py").is_file());
    assert!(temp_dir.path().join("published/index.json").is_file());
}

#[tokio::test]
async fn test_upload_then_view_and_list() {
    let (_temp_dir, manager) = create_test_env();
    upload_sample(&manager).await;

    let listing = manager.list_modules().unwrap();
    assert_eq!(listing.modules.len(), 1);
    assert_eq!(listing.modules[0].name, "sample");
    assert!(!listing.modules[0].in_store);

    let details = manager.view_module("sample").unwrap();
    assert!(details
        .file_tree
        .iter()
        .all(|f| f.name != PathsConfig::METADATA_FILENAME));
    assert_eq!(details.file_tree.len(), 2);

    let metadata = details.metadata.unwrap();
    assert_eq!(metadata.name, "sample");
    assert_eq!(metadata.structure.module_type, ModuleType::PythonApp);
    assert_eq!(metadata.structure.entry_point.as_deref(), Some("app.py"));
    assert!(metadata.structure.has_requirements);
    assert!(metadata.path.ends_with("sample"));
}

#[tokio::test]
async fn test_non_zip_upload_leaves_registry_unchanged() {
    let (_temp_dir, manager) = create_test_env();
    upload_sample(&manager).await;

    let result = manager.upload("module.tar.gz", None, b"\x1f\x8b").await;
    assert!(matches!(
        result,
        Err(ModdockError::UnsupportedFileType { .. })
    ));

    let names: Vec<String> = manager
        .list_modules()
        .unwrap()
        .modules
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec!["sample"]);
}

#[tokio::test]
async fn test_promote_records_registry_metadata() {
    let (_temp_dir, manager) = create_test_env();
    upload_sample(&manager).await;

    let entry = manager.add_to_store("sample").await.unwrap();
    let registry_metadata = manager.view_module("sample").unwrap().metadata;

    let entries = manager.store_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "sample");
    assert_eq!(entries[0].metadata, registry_metadata);
    assert_eq!(entries[0], entry);

    assert!(manager.list_modules().unwrap().modules[0].in_store);
}

#[tokio::test]
async fn test_promote_then_delete_keeps_store_copy() {
    let (_temp_dir, manager) = create_test_env();
    upload_sample(&manager).await;
    manager.add_to_store("sample").await.unwrap();

    assert!(manager.delete_module("sample").await.unwrap());

    let copy = manager.store().copy_path("sample");
    assert!(copy.join("app.py").is_file());
    assert!(copy.join(PathsConfig::METADATA_FILENAME).is_file());
    assert_eq!(manager.store_entries().unwrap().len(), 1);
}

#[tokio::test]
async fn test_promote_missing_module() {
    let (_temp_dir, manager) = create_test_env();
    let result = manager.add_to_store("ghost").await;
    assert!(matches!(result, Err(ModdockError::ModuleNotFound { .. })));
}

#[tokio::test]
async fn test_demote_absent_leaves_index_unchanged() {
    let (_temp_dir, manager) = create_test_env();
    upload_sample(&manager).await;
    manager.add_to_store("sample").await.unwrap();
    let before = manager.store_entries().unwrap();

    assert!(!manager.remove_from_store("ghost").await.unwrap());
    assert_eq!(manager.store_entries().unwrap(), before);
}

#[tokio::test]
async fn test_demote_keeps_registry_module() {
    let (_temp_dir, manager) = create_test_env();
    upload_sample(&manager).await;
    manager.add_to_store("sample").await.unwrap();

    assert!(manager.remove_from_store("sample").await.unwrap());
    assert!(!manager.remove_from_store("sample").await.unwrap());

    assert!(manager.store_entries().unwrap().is_empty());
    assert!(!manager.store().copy_path("sample").exists());
    assert!(manager.view_module("sample").is_ok());
}

#[tokio::test]
async fn test_store_copy_is_a_snapshot() {
    let (_temp_dir, manager) = create_test_env();
    upload_sample(&manager).await;
    manager.add_to_store("sample").await.unwrap();

    let data = zip_bytes(&[("index.html", "<html/>")]);
    manager.upload("sample.zip", None, &data).await.unwrap();

    let entry = &manager.store_entries().unwrap()[0];
    let snapshot = entry.metadata.as_ref().unwrap();
    assert_eq!(snapshot.structure.module_type, ModuleType::PythonApp);
    assert!(manager.store().copy_path("sample").join("app.py").is_file());
    assert!(!manager.store().copy_path("sample").join("index.html").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_of_same_name() {
    let (_temp_dir, manager) = create_test_env();
    let manager = std::sync::Arc::new(manager);

    let mut handles = Vec::new();
    for i in 0..6 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            let file = format!("v{i}.txt");
            let data = zip_bytes(&[("main.py", ""), (file.as_str(), "")]);
            manager.upload("race.zip", None, &data).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let details = manager.view_module("race").unwrap();
    assert_eq!(details.file_tree.len(), 2);
    assert_eq!(manager.list_modules().unwrap().modules.len(), 1);
}
