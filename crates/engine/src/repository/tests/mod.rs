//! Test modules for the repository.


use std::sync::Arc;

use vessel_core::{ContentRegistry, FieldRole, IdKind, ItemId, Record, TypeDescriptor};
use vessel_storage::testing::{CallLog, InstrumentedFactory};
use vessel_storage::{MemoryDataSourceFactory, MemoryStore};

use crate::config::RepositoryConfig;
use crate::events::EventHub;
use crate::repository::Repository;

/// Repository over an instrumented in-memory store
pub(super) struct Fixture {
    pub repo: Repository,
    pub store: Arc<MemoryStore>,
    pub log: CallLog,
    pub hub: Arc<EventHub>,
}

pub(super) fn registry() -> Arc<ContentRegistry> {
    Arc::new(
        ContentRegistry::builder()
            .register_descriptor(
                TypeDescriptor::new("Page")
                    .id("id", IdKind::Int)
                    .field("title", FieldRole::Summary)
                    .field_with_kind("path", FieldRole::Address, IdKind::Text)
                    .field("body", FieldRole::Plain)
                    .summary("PageSummary")
                    .auditable(),
            )
            .register_descriptor(
                TypeDescriptor::new("Tag")
                    .field("label", FieldRole::Summary)
                    .summary("TagSummary"),
            )
            .register_descriptor(
                TypeDescriptor::new("Note")
                    .id("key", IdKind::Text)
                    .field("text", FieldRole::Plain),
            )
            .build(),
    )
}

pub(super) fn fixture() -> Fixture {
    fixture_with(RepositoryConfig::default())
}

pub(super) fn fixture_with(config: RepositoryConfig) -> Fixture {
    let registry = registry();
    let store = MemoryStore::new(registry.clone());
    fixture_over(registry, store, config)
}

/// Repository whose store keys records by `id_name`; the repository picks
/// the name up from the backend
pub(super) fn fixture_keyed_by(id_name: &str) -> Fixture {
    let registry = registry();
    let store = MemoryStore::new(registry.clone()).with_id_name(id_name);
    fixture_over(registry, store, RepositoryConfig::default())
}

fn fixture_over(
    registry: Arc<ContentRegistry>,
    store: MemoryStore,
    config: RepositoryConfig,
) -> Fixture {
    let store = Arc::new(store);
    let factory = InstrumentedFactory::new(MemoryDataSourceFactory::new(Arc::clone(&store)));
    let log = factory.log();
    let hub = Arc::new(EventHub::new());
    let repo = Repository::builder(registry, Arc::new(factory))
        .events(Arc::clone(&hub))
        .config(config)
        .build()
        .unwrap();
    Fixture {
        repo,
        store,
        log,
        hub,
    }
}

pub(super) fn page(id: i64, title: &str) -> Record {
    Record::new("Page")
        .with("id", id)
        .with("title", title)
        .with("path", format!("/{}", title.to_lowercase()))
        .with("body", format!("{} body", title))
}

pub(super) fn page_id(id: i64) -> ItemId {
    ItemId::new("Page", id)
}
