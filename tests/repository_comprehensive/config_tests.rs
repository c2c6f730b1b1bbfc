//! Tier 5: Configuration
//!
//! Repositories built from `vessel.toml` files.

use crate::test_utils::*;
use std::time::Duration;
use tempfile::TempDir;
use vessel::CONFIG_FILE_NAME;

#[test]
fn config_file_drives_query_timeout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "query_timeout_secs = 3\n").unwrap();

    let config = RepositoryConfig::load(&path).unwrap();
    let test = create_test_repo_with(config);
    seed_pages(&test, 1);
    let _: Vec<Page> = test.repo.get(page_ids([1])).unwrap();

    assert!(test
        .log
        .calls()
        .contains(&StorageCall::QueryTimeout(Duration::from_secs(3))));
}

#[test]
fn default_file_builds_default_repository() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    RepositoryConfig::write_default_if_missing(&path).unwrap();

    let config = RepositoryConfig::load(&path).unwrap();
    let test = create_test_repo_with(config);
    assert_eq!(test.repo.config(), &RepositoryConfig::default());
    assert_eq!(
        test.log.count(|c| matches!(c, StorageCall::QueryTimeout(_))),
        0
    );
}

#[test]
fn invalid_config_rejected_by_builder() {
    let registry = registry();
    let store = std::sync::Arc::new(MemoryStore::new(registry.clone()));
    let factory = std::sync::Arc::new(MemoryDataSourceFactory::new(store));
    let err = Repository::builder(registry, factory)
        .config(RepositoryConfig {
            id_name: None,
            query_timeout_secs: Some(0),
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, VesselError::Config(_)));
}

#[test]
fn malformed_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "id_name = [").unwrap();
    let err = RepositoryConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}
