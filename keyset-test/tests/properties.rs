use std::cmp::Reverse;
use std::collections::HashSet;

use keyset_data::{Cursor, Entity, PaginationConfig, PaginationOptions};
use keyset_test::fixtures::{ten_groups, tied_runs, Group, Run};
use keyset_test::{flatten, init_test_tracing, walk_backward, walk_forward, TestDb};
use tokio_util::sync::CancellationToken;

const PAGE_SIZES: &[i64] = &[1, 3, 4, 10, 11];

async fn seeded(config: Option<PaginationConfig>) -> TestDb {
    init_test_tracing();
    let db = match config {
        Some(config) => TestDb::with_config(config).await.unwrap(),
        None => TestDb::new().await.unwrap(),
    };
    db.insert_groups(&ten_groups()).await.unwrap();
    db
}

fn sort_keys() -> Vec<Option<String>> {
    let mut keys: Vec<Option<String>> = Group::sorts().keys().map(|k| Some(k.to_string())).collect();
    keys.push(None);
    keys
}

/// Group ids in the order the database should return them.
fn expected(sort: Option<&str>) -> Vec<String> {
    let mut groups = ten_groups();
    match sort {
        None => groups.sort_by(|a, b| a.id.cmp(&b.id)),
        Some("FULL_PATH_ASC") => groups.sort_by(|a, b| (&a.full_path, &a.id).cmp(&(&b.full_path, &b.id))),
        Some("FULL_PATH_DESC") => groups.sort_by(|a, b| (&b.full_path, &b.id).cmp(&(&a.full_path, &a.id))),
        Some("CREATED_AT_ASC") => groups.sort_by(|a, b| (&a.created_at, &a.id).cmp(&(&b.created_at, &b.id))),
        Some("CREATED_AT_DESC") => groups.sort_by(|a, b| (&b.created_at, &b.id).cmp(&(&a.created_at, &a.id))),
        Some("GROUP_LEVEL_ASC") => groups.sort_by_key(|g| (g.depth(), g.id.clone())),
        Some("GROUP_LEVEL_DESC") => groups.sort_by_key(|g| Reverse((g.depth(), g.id.clone()))),
        Some(other) => panic!("no expectation for {other}"),
    }
    groups.into_iter().map(|g| g.id).collect()
}

fn ids(items: &[Group]) -> Vec<String> {
    items.iter().map(|g| g.id.clone()).collect()
}

async fn assert_total_order(db: &TestDb) {
    let repo = db.groups();
    let base = repo.query();

    for sort in sort_keys() {
        let sort = sort.as_deref();
        let unpaginated = repo
            .find_page(&CancellationToken::new(), base.clone(), sort, &PaginationOptions::new())
            .await
            .unwrap();
        assert_eq!(ids(&unpaginated.items), expected(sort), "sort {sort:?}");

        for &size in PAGE_SIZES {
            let walked = flatten(walk_forward(&repo, &base, sort, size).await.unwrap());
            let walked = ids(&walked);
            assert_eq!(walked, ids(&unpaginated.items), "sort {sort:?}, page size {size}");
            let unique: HashSet<_> = walked.iter().collect();
            assert_eq!(unique.len(), walked.len(), "duplicates for {sort:?}/{size}");
        }
    }
}

#[tokio::test]
async fn forward_pages_concatenate_to_the_full_ordering() {
    let db = seeded(None).await;
    assert_total_order(&db).await;
}

#[tokio::test]
async fn forward_pages_with_expanded_seek_predicates() {
    // generic dialect: no row-value comparison, OR-expanded predicates
    let db = seeded(Some(PaginationConfig::default())).await;
    assert_total_order(&db).await;
}

#[tokio::test]
async fn backward_walk_matches_forward_walk() {
    let db = seeded(None).await;
    let repo = db.groups();
    let base = repo.query();

    for sort in sort_keys() {
        let sort = sort.as_deref();
        for &size in PAGE_SIZES {
            let forward = ids(&flatten(walk_forward(&repo, &base, sort, size).await.unwrap()));
            let mut backward = walk_backward(&repo, &base, sort, size).await.unwrap();
            backward.reverse();
            let backward = ids(&flatten(backward));
            assert_eq!(backward, forward, "sort {sort:?}, page size {size}");
        }
    }
}

#[tokio::test]
async fn boundary_flags_on_every_page() {
    let db = seeded(None).await;
    let repo = db.groups();
    let base = repo.query();

    for sort in sort_keys() {
        let sort = sort.as_deref();
        for &size in &[1i64, 3, 4] {
            let pages = walk_forward(&repo, &base, sort, size).await.unwrap();
            let last = pages.len() - 1;
            assert!(pages.len() > 1);
            for (i, page) in pages.iter().enumerate() {
                let info = &page.page_info;
                assert_eq!(info.has_previous_page, i != 0, "page {i}, {sort:?}/{size}");
                assert_eq!(info.has_next_page, i != last, "page {i}, {sort:?}/{size}");
            }

            let pages = walk_backward(&repo, &base, sort, size).await.unwrap();
            let first = pages.len() - 1;
            for (i, page) in pages.iter().enumerate() {
                let info = &page.page_info;
                // fetch order: index 0 is the last page
                assert_eq!(info.has_next_page, i != 0, "page {i}, {sort:?}/{size}");
                assert_eq!(info.has_previous_page, i != first, "page {i}, {sort:?}/{size}");
            }
        }
    }
}

#[tokio::test]
async fn every_cursor_round_trips_and_resumes_at_the_next_record() {
    let db = seeded(None).await;
    let repo = db.groups();
    let cancel = CancellationToken::new();

    for sort in sort_keys() {
        let sort = sort.as_deref();
        let page = repo
            .find_page(&cancel, repo.query(), sort, &PaginationOptions::new())
            .await
            .unwrap();
        let order = ids(&page.items);

        for (i, record) in page.items.iter().enumerate() {
            let cursor = page.page_info.cursor(record).unwrap();
            assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);

            let next = repo
                .find_page(&cancel, repo.query(), sort, &PaginationOptions::first(1).after(cursor.encode()))
                .await
                .unwrap();
            match order.get(i + 1) {
                Some(expected_id) => {
                    assert_eq!(&next.items[0].id, expected_id, "sort {sort:?} after {}", record.id)
                }
                None => {
                    assert!(next.is_empty());
                    assert!(!next.page_info.has_next_page);
                }
            }
        }
    }
}

#[tokio::test]
async fn tied_sort_values_page_by_identifier() {
    init_test_tracing();
    let db = TestDb::new().await.unwrap();
    let runs = tied_runs(50);
    db.insert_runs(&runs).await.unwrap();
    let repo = db.runs();
    let base = repo.query();

    let mut by_status: Vec<Run> = runs.clone();
    by_status.sort_by(|a, b| (&a.status, &a.id).cmp(&(&b.status, &b.id)));
    let expected: Vec<String> = by_status.into_iter().map(|r| r.id).collect();

    let mut by_created_desc = runs.clone();
    by_created_desc.sort_by(|a, b| b.id.cmp(&a.id));
    let expected_desc: Vec<String> = by_created_desc.into_iter().map(|r| r.id).collect();

    for _ in 0..2 {
        let pages = walk_forward(&repo, &base, Some("STATUS_ASC"), 1).await.unwrap();
        assert_eq!(pages.len(), 50);
        let walked: Vec<String> = flatten(pages).into_iter().map(|r| r.id).collect();
        assert_eq!(walked, expected);

        let walked: Vec<String> = flatten(walk_forward(&repo, &base, Some("CREATED_AT_DESC"), 1).await.unwrap())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(walked, expected_desc);
    }
}
