//! Tier 1: Typed API
//!
//! Round trips of typed content through new/set/get/query/delete.

use crate::test_utils::*;

#[test]
fn new_item_is_default() {
    let test = create_test_repo();
    let page: Page = test.repo.new_item().unwrap();
    assert_eq!(page, Page::default());
}

#[test]
fn set_then_get_round_trip() {
    let test = create_test_repo();
    let mut page = Page {
        title: "Home".into(),
        path: "/".into(),
        body: "Welcome".into(),
        ..Page::default()
    };
    let created = test
        .repo
        .set_item(&mut page, &WriteOptions::new().actor("editor"))
        .unwrap();
    assert!(created);
    assert_eq!(page.id, 1);
    assert_eq!(page.user_created.as_deref(), Some("editor"));
    let created_at = page.created.as_deref().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
    assert_eq!(page.created, page.updated);

    let fetched: Vec<Page> = test.repo.get(page_ids([page.id])).unwrap();
    assert_eq!(fetched, vec![page]);
}

#[test]
fn new_page_id_follows_seeded_backend() {
    let test = create_test_repo();
    seed_pages(&test, 3);

    let mut page = Page {
        title: "Fourth".into(),
        ..Page::default()
    };
    assert!(test.repo.set_item(&mut page, &WriteOptions::new()).unwrap());
    assert_eq!(page.id, 4);

    let all: Vec<Page> = test.repo.get(page_ids(1..=4)).unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].title, "Page 1");
}

#[test]
fn second_set_updates_in_place() {
    let test = create_test_repo();
    let mut page = Page {
        title: "Draft".into(),
        ..Page::default()
    };
    assert!(test.repo.set_item(&mut page, &WriteOptions::new()).unwrap());
    let first_id = page.id;
    let first_created = page.created.clone();

    page.title = "Published".into();
    assert!(!test.repo.set_item(&mut page, &WriteOptions::new()).unwrap());
    assert_eq!(page.id, first_id);
    assert_eq!(page.created, first_created);

    let fetched: Vec<Page> = test.repo.get(page_ids([first_id])).unwrap();
    assert_eq!(fetched[0].title, "Published");
    assert_eq!(test.store.len(&ContentType::new("Page")), 1);
}

#[test]
fn uuid_identifier_assigned_on_add() {
    let test = create_test_repo();
    let mut article = Article {
        headline: "Launch".into(),
        tags: vec!["news".into(), "product".into()],
        ..Article::default()
    };
    assert!(test.repo.set_item(&mut article, &WriteOptions::new()).unwrap());
    assert!(!article.id.is_nil());

    let fetched: Vec<Article> = test
        .repo
        .get(vec![ItemId::new("Article", article.id)])
        .unwrap();
    assert_eq!(fetched, vec![article]);
}

#[test]
fn summaries_contain_designated_fields_only() {
    let test = create_test_repo();
    let mut page = Page {
        title: "About".into(),
        path: "/about".into(),
        body: "Long body text".into(),
        ..Page::default()
    };
    test.repo.set_item(&mut page, &WriteOptions::new()).unwrap();

    let summaries: Vec<PageSummary> = test.repo.get(page_ids([page.id])).unwrap();
    assert_eq!(
        summaries,
        vec![PageSummary {
            id: page.id,
            title: "About".into(),
            path: "/about".into(),
        }]
    );

    let raw = test
        .repo
        .get_by_ids(Target::Summaries, page_ids([page.id]))
        .unwrap()
        .into_records()
        .unwrap();
    assert_eq!(raw[0].content_type().as_str(), "PageSummary");
    assert_eq!(raw[0].len(), 3);
    assert_eq!(
        test.repo.summary_fields(&ContentType::new("Page")).unwrap(),
        vec!["title", "path", "id"]
    );
}

#[test]
fn query_filters_and_orders() {
    let test = create_test_repo();
    seed_pages(&test, 6);
    let pages: Vec<Page> = test
        .repo
        .query(
            &[ContentType::new("Page")],
            QueryBody::filter(|r| r.get("id").and_then(Value::as_int).map_or(false, |id| id % 2 == 0))
                .then(QueryBody::new(|s| s.sort_by(|a, b| {
                    b.get("id")
                        .and_then(Value::as_int)
                        .cmp(&a.get("id").and_then(Value::as_int))
                }))),
        )
        .unwrap();
    let ids: Vec<i64> = pages.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![6, 4, 2]);
}

#[test]
fn missing_ids_are_absent() {
    let test = create_test_repo();
    seed_pages(&test, 2);
    let pages: Vec<Page> = test.repo.get(page_ids([2, 3, 1, 99])).unwrap();
    let ids: Vec<i64> = pages.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn delete_item_removes_record() {
    let test = create_test_repo();
    let mut page = Page {
        title: "Temp".into(),
        ..Page::default()
    };
    test.repo.set_item(&mut page, &WriteOptions::new()).unwrap();
    test.repo.delete_item(&page, &WriteOptions::new()).unwrap();

    let fetched: Vec<Page> = test.repo.get(page_ids([page.id])).unwrap();
    assert!(fetched.is_empty());

    // deleting again is a no-op
    test.repo.delete_item(&page, &WriteOptions::new()).unwrap();
}

#[test]
fn mixed_type_lookup_groups_by_type() {
    let test = create_test_repo();
    seed_pages(&test, 2);
    let mut article = Article {
        headline: "Mixed".into(),
        ..Article::default()
    };
    test.repo.set_item(&mut article, &WriteOptions::new()).unwrap();
    test.log.clear();

    let ids = vec![
        ItemId::new("Page", 1i64),
        ItemId::new("Article", article.id),
        ItemId::new("Page", 2i64),
    ];
    let records = test
        .repo
        .get_by_ids(Target::Items, ids)
        .unwrap()
        .into_records()
        .unwrap();
    let kinds: Vec<&str> = records.iter().map(|r| r.content_type().as_str()).collect();
    assert_eq!(kinds, vec!["Page", "Page", "Article"]);
    assert_eq!(
        test.log.count(|c| matches!(c, StorageCall::Open { .. })),
        2
    );
}
