//! Tier 2: Event Pipeline
//!
//! Handlers redirecting, replacing and short-circuiting repository work.

use crate::test_utils::*;
use parking_lot::Mutex;
use std::sync::Arc;

fn record_names(hub: &EventHub, names: &[EventName]) -> Arc<Mutex<Vec<EventName>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for name in names {
        let seen = Arc::clone(&seen);
        hub.register(*name, move |dispatch| {
            seen.lock().push(dispatch.name);
            Ok(())
        });
    }
    seen
}

#[test]
fn full_write_sequence_raises_events_in_order() {
    init_tracing();
    let test = create_test_repo();
    let seen = record_names(&test.hub, &EventName::ALL);

    let mut page: Page = test.repo.new_item().unwrap();
    page.title = "Ordered".into();
    test.repo.set_item(&mut page, &WriteOptions::new()).unwrap();
    let _: Vec<Page> = test.repo.get(page_ids([page.id])).unwrap();
    test.repo.delete_item(&page, &WriteOptions::new()).unwrap();

    assert_eq!(
        *seen.lock(),
        vec![
            EventName::New,
            EventName::SetAdd,
            EventName::SavedAdd,
            EventName::GetItemsIds,
            EventName::SetDelete,
            EventName::SavedDelete,
        ]
    );
}

#[test]
fn add_redirected_to_update_calls_backend_update() {
    let test = create_test_repo();
    test.hub.register(EventName::SetAdd, |dispatch| {
        dispatch.name = EventName::SetUpdate;
        Ok(())
    });
    let saved = record_names(&test.hub, &[EventName::SavedAdd, EventName::SavedUpdate]);

    let mut page = Page {
        id: 12,
        title: "Upsert".into(),
        ..Page::default()
    };
    let created = test
        .repo
        .set_item(&mut page, &WriteOptions::new().create(true))
        .unwrap();

    assert!(!created);
    assert_eq!(test.log.count(|c| matches!(c, StorageCall::Update(_))), 1);
    assert_eq!(test.log.count(|c| matches!(c, StorageCall::Create(_))), 0);
    assert_eq!(*saved.lock(), vec![EventName::SavedUpdate]);
    assert!(test.store.contains(&ItemId::new("Page", 12i64)));
}

#[test]
fn handled_writes_make_no_backend_call_but_notify() {
    let test = create_test_repo();
    for name in [EventName::SetAdd, EventName::SetUpdate] {
        test.hub.register(name, |dispatch| {
            if let Some(data) = dispatch.payload.as_write_mut() {
                data.handled = true;
            }
            Ok(())
        });
    }
    let saved = record_names(&test.hub, &[EventName::SavedAdd, EventName::SavedUpdate]);

    let mut items = vec![
        Page {
            title: "New".into(),
            ..Page::default()
        }
        .to_record()
        .unwrap(),
        Page {
            id: 50,
            title: "Existing".into(),
            ..Page::default()
        }
        .to_record()
        .unwrap(),
    ];
    let created = test.repo.set(&mut items, &WriteOptions::new()).unwrap();

    assert_eq!(created, vec![true, false]);
    assert_eq!(
        test.log.count(|c| matches!(
            c,
            StorageCall::Create(_) | StorageCall::Update(_) | StorageCall::SaveChanges
        )),
        0
    );
    assert_eq!(test.store.total_records(), 0);
    assert_eq!(
        *saved.lock(),
        vec![EventName::SavedAdd, EventName::SavedUpdate]
    );
}

#[test]
fn handler_can_serve_reads_from_elsewhere() {
    let test = create_test_repo();
    test.hub.register(EventName::GetItems, |dispatch| {
        if let Some(data) = dispatch.payload.as_query_mut() {
            data.results = Some(vec![Page {
                id: 1000,
                title: "From cache".into(),
                ..Page::default()
            }
            .to_record()?]);
        }
        Ok(())
    });

    let pages: Vec<Page> = test
        .repo
        .query(&[ContentType::new("Page")], QueryBody::identity())
        .unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "From cache");
}

#[test]
fn handler_can_replace_source() {
    let test = create_test_repo();
    seed_pages(&test, 3);
    test.hub.register(EventName::GetCount, |dispatch| {
        if let Some(data) = dispatch.payload.as_query_mut() {
            data.source = vessel::RecordStream::empty();
        }
        Ok(())
    });
    assert_eq!(
        test.repo
            .count(&[ContentType::new("Page")], QueryBody::identity())
            .unwrap(),
        0
    );
}

#[test]
fn handler_error_aborts_write() {
    let test = create_test_repo();
    test.hub.register(EventName::SetAdd, |dispatch| {
        match dispatch.payload.as_write_mut() {
            Some(data) if !data.options.bypass_checks => {
                Err(VesselError::handler("adds require bypass_checks"))
            }
            _ => Ok(()),
        }
    });

    let mut page = Page::default();
    let err = test
        .repo
        .set_item(&mut page, &WriteOptions::new())
        .unwrap_err();
    assert!(matches!(err, VesselError::Handler(_)));
    assert_eq!(test.store.total_records(), 0);
    assert_eq!(test.log.open_scopes(), 0);

    assert!(test
        .repo
        .set_item(&mut page, &WriteOptions::new().bypass_checks(true))
        .unwrap());
}

#[test]
fn saved_notification_sees_assigned_identifier() {
    let test = create_test_repo();
    let ids = Arc::new(Mutex::new(Vec::new()));
    {
        let ids = Arc::clone(&ids);
        test.hub.register(EventName::SavedAdd, move |dispatch| {
            if let Some(record) = dispatch
                .payload
                .as_write_mut()
                .and_then(|d| d.container.as_ref())
            {
                ids.lock().push(record.get("id").cloned());
            }
            Ok(())
        });
    }
    let mut page = Page::default();
    test.repo.set_item(&mut page, &WriteOptions::new()).unwrap();
    assert_eq!(*ids.lock(), vec![Some(Value::Int(page.id))]);
}

#[test]
fn unregistered_handler_no_longer_runs() {
    let test = create_test_repo();
    let id = test.hub.register(EventName::New, |dispatch| {
        if let Some(record) = dispatch.payload.as_new_mut() {
            record.set("title", "Templated");
        }
        Ok(())
    });
    let templated: Page = test.repo.new_item().unwrap();
    assert_eq!(templated.title, "Templated");

    assert!(test.hub.unregister(id));
    let plain: Page = test.repo.new_item().unwrap();
    assert_eq!(plain.title, "");
}
