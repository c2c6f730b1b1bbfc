//! Test utilities for the repository comprehensive tests
//!
//! Typed content types, repository construction and log capture.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub use vessel::testing::{CallLog, InstrumentedFactory, StorageCall};
pub use vessel::{
    Content, ContentRegistry, ContentType, EventHub, EventName, FieldRole, IdKind, ItemId,
    MemoryDataSourceFactory, MemoryStore, QueryBody, Record, Repository, RepositoryConfig, Shape,
    Target, TypeDescriptor, Value, VesselError, WriteOptions,
};

// =============================================================================
// Content Types
// =============================================================================

/// Auditable page with an integer identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub path: String,
    pub body: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub user_created: Option<String>,
    pub user_updated: Option<String>,
}

impl Shape for Page {
    const TARGET: Target = Target::Items;
}

impl Content for Page {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("Page")
            .id("id", IdKind::Int)
            .field("title", FieldRole::Summary)
            .field("path", FieldRole::Address)
            .field("body", FieldRole::Plain)
            .summary("PageSummary")
            .auditable()
    }
}

/// Summary shape of [`Page`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageSummary {
    pub id: i64,
    pub title: String,
    pub path: String,
}

impl Shape for PageSummary {
    const TARGET: Target = Target::Summaries;
}

/// Non-auditable article with a UUID identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub headline: String,
    pub tags: Vec<String>,
}

impl Shape for Article {
    const TARGET: Target = Target::Items;
}

impl Content for Article {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("Article")
            .field("headline", FieldRole::Summary)
            .field("tags", FieldRole::Plain)
            .summary("ArticleSummary")
    }
}

// =============================================================================
// Repository Creation
// =============================================================================

/// Everything a test needs to drive and observe a repository
pub struct TestRepo {
    pub repo: Arc<Repository>,
    pub store: Arc<MemoryStore>,
    pub log: CallLog,
    pub hub: Arc<EventHub>,
}

pub fn registry() -> Arc<ContentRegistry> {
    Arc::new(
        ContentRegistry::builder()
            .register::<Page>()
            .register::<Article>()
            .build(),
    )
}

/// Repository with default configuration over an instrumented memory store
pub fn create_test_repo() -> TestRepo {
    create_test_repo_with(RepositoryConfig::default())
}

pub fn create_test_repo_with(config: RepositoryConfig) -> TestRepo {
    let registry = registry();
    let store = Arc::new(MemoryStore::new(registry.clone()));
    let factory = InstrumentedFactory::new(MemoryDataSourceFactory::new(Arc::clone(&store)));
    let log = factory.log();
    let hub = Arc::new(EventHub::new());
    let repo = Repository::builder(registry, Arc::new(factory))
        .events(Arc::clone(&hub))
        .config(config)
        .build()
        .expect("Failed to build test repository");
    TestRepo {
        repo: Arc::new(repo),
        store,
        log,
        hub,
    }
}

/// Store `n` pages with ids 1..=n directly in the backend
pub fn seed_pages(test: &TestRepo, n: i64) {
    for id in 1..=n {
        let page = Page {
            id,
            title: format!("Page {}", id),
            path: format!("/page-{}", id),
            ..Page::default()
        };
        test.store
            .upsert(&page.to_record().unwrap())
            .expect("Failed to seed page");
    }
}

pub fn page_ids(ids: impl IntoIterator<Item = i64>) -> Vec<ItemId> {
    ids.into_iter().map(|id| ItemId::new("Page", id)).collect()
}

// =============================================================================
// Log Capture
// =============================================================================

/// Install a test-writer tracing subscriber (idempotent)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
