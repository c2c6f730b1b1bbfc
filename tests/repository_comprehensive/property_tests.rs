//! Tier 3: Property-Based
//!
//! Batch limit and count additivity over generated inputs.

use crate::test_utils::*;
use proptest::prelude::*;
use vessel::MAX_ID_BATCH_SIZE;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn property_batches_within_limit_succeed(n in 0usize..=MAX_ID_BATCH_SIZE) {
        let test = create_test_repo();
        seed_pages(&test, n as i64);
        let records = test
            .repo
            .get_by_ids(Target::Items, page_ids(1..=n as i64))
            .unwrap()
            .into_records()
            .unwrap();
        prop_assert_eq!(records.len(), n);
    }

    #[test]
    fn property_oversized_batches_fail_before_reading(extra in 1usize..50) {
        let test = create_test_repo();
        let n = (MAX_ID_BATCH_SIZE + extra) as i64;
        let err = test
            .repo
            .get_by_ids(Target::Items, page_ids(1..=n))
            .unwrap_err();
        prop_assert!(err.is_invalid_argument());
        prop_assert!(test.log.calls().is_empty());
    }

    #[test]
    fn property_count_is_additive(pages in 0i64..20, articles in 0usize..20) {
        let test = create_test_repo();
        seed_pages(&test, pages);
        for i in 0..articles {
            let mut article = Article {
                headline: format!("A{}", i),
                ..Article::default()
            };
            test.repo.set_item(&mut article, &WriteOptions::new()).unwrap();
        }

        let page_type = ContentType::new("Page");
        let article_type = ContentType::new("Article");
        let by_page = test.repo.count(&[page_type.clone()], QueryBody::identity()).unwrap();
        let by_article = test.repo.count(&[article_type.clone()], QueryBody::identity()).unwrap();
        let both = test
            .repo
            .count(&[page_type, article_type], QueryBody::identity())
            .unwrap();

        prop_assert_eq!(by_page, pages as usize);
        prop_assert_eq!(by_article, articles);
        prop_assert_eq!(both, by_page + by_article);
    }

    #[test]
    fn property_lookup_returns_exactly_stored_subset(
        stored in 1i64..40,
        wanted in proptest::collection::btree_set(1i64..60, 0..30),
    ) {
        let test = create_test_repo();
        seed_pages(&test, stored);
        let pages: Vec<Page> = test.repo.get(page_ids(wanted.iter().copied())).unwrap();
        let got: Vec<i64> = pages.iter().map(|p| p.id).collect();
        let expected: Vec<i64> = wanted.into_iter().filter(|id| *id <= stored).collect();
        prop_assert_eq!(got, expected);
    }
}
