//! End-to-end command runs against seeded SQLite catalogs.

use super::helpers::{CatalogFixture, item_ids, library, parse_output};
use super::*;
use crate::book_bookmarks::{BookBookmarksArgs, run_book_bookmarks_with};
use crate::bookmarks::{BookmarksArgs, run_bookmarks_with};
use crate::init::{InitArgs, run_init_with};
use crate::popularity::{PopularityArgs, run_popularity_with};
use crate::recommend::{RecommendArgs, run_recommend_with};
use camino::Utf8PathBuf;
use pico_core::{CatalogStore, SqliteCatalogStore};
use pico_scorer::RecommendError;
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn catalog() -> CatalogFixture {
    CatalogFixture::seeded()
}

fn recommend_for(catalog: &CatalogFixture, user: &str) -> RecommendArgs {
    RecommendArgs {
        database: Some(catalog.database().to_path_buf()),
        user: Some(user.to_owned()),
        ..RecommendArgs::default()
    }
}

fn bookmarks_for(catalog: &CatalogFixture, user: &str) -> BookmarksArgs {
    BookmarksArgs {
        database: Some(catalog.database().to_path_buf()),
        user: Some(user.to_owned()),
        ..BookmarksArgs::default()
    }
}

fn book_bookmarks_for(catalog: &CatalogFixture, book: u64) -> BookBookmarksArgs {
    BookBookmarksArgs {
        database: Some(catalog.database().to_path_buf()),
        book: Some(book),
        ..BookBookmarksArgs::default()
    }
}

#[rstest]
fn init_creates_nested_database() {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let database = root.join("data").join("catalog.db");
    let mut out = Vec::new();

    run_init_with(
        InitArgs {
            database: Some(database.clone()),
        },
        &mut out,
    )
    .expect("init succeeds");

    let output = parse_output(&out);
    assert_eq!(output["schema_ready"], true);
    assert_eq!(output["database"], database.as_str());
    let store = SqliteCatalogStore::open_read_only(database.as_std_path()).expect("reopen");
    assert!(store.books().expect("empty catalog").is_empty());
}

#[rstest]
fn init_keeps_existing_rows(catalog: CatalogFixture) {
    let mut out = Vec::new();
    run_init_with(
        InitArgs {
            database: Some(catalog.database().to_path_buf()),
        },
        &mut out,
    )
    .expect("init succeeds");

    let store = SqliteCatalogStore::open_read_only(catalog.database().as_std_path()).expect("open");
    assert_eq!(
        store.books().expect("books").len(),
        library().all_books().len()
    );
}

#[rstest]
fn popularity_scores_every_book(catalog: CatalogFixture) {
    let mut out = Vec::new();
    run_popularity_with(
        PopularityArgs {
            database: Some(catalog.database().to_path_buf()),
        },
        &mut out,
    )
    .expect("job succeeds");

    let output = parse_output(&out);
    assert_eq!(output["books_scored"], 4);
    let store = SqliteCatalogStore::open_read_only(catalog.database().as_std_path()).expect("open");
    let frankenstein = store.book(1).expect("query").expect("book exists");
    let emma = store.book(3).expect("query").expect("book exists");
    assert!(frankenstein.popularity_score > 0.0);
    assert!(emma.popularity_score > 0.0);
}

#[rstest]
fn popularity_requires_existing_database() {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let mut out = Vec::new();
    let err = run_popularity_with(
        PopularityArgs {
            database: Some(root.join("missing.db")),
        },
        &mut out,
    )
    .expect_err("database is missing");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_DATABASE),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
    assert!(out.is_empty());
}

#[rstest]
fn recommend_ranks_unbookmarked_books_by_affinity(catalog: CatalogFixture) {
    let mut out = Vec::new();
    run_recommend_with(recommend_for(&catalog, "reader-1"), &mut out).expect("recommend");

    let output = parse_output(&out);
    // Dracula shares the followed Gothic subject; Les Misérables is more
    // popular but unrelated. Bookmarked books never appear.
    assert_eq!(item_ids(&output, true), vec![2, 4]);
    assert_eq!(output["page"], 1);
    assert_eq!(output["items_per_page"], 10);
    assert_eq!(output["total_pages"], 1);
    assert_eq!(output["has_next"], false);
    assert_eq!(output["has_prev"], false);
    assert!(output.get("total_items").is_none());
    assert_eq!(
        output["links"]["self"],
        "/api/v1/books/recommendations?page=1&per_page=10"
    );
    assert!(output["links"].get("next").is_none());
}

#[rstest]
fn recommend_language_filter_survives_navigation(catalog: CatalogFixture) {
    let args = RecommendArgs {
        language: Some("fr".to_owned()),
        link_base_url: Some("https://books.example".to_owned()),
        link_header: Some("rfc8288".to_owned()),
        ..recommend_for(&catalog, "reader-1")
    };
    let mut out = Vec::new();
    run_recommend_with(args, &mut out).expect("recommend");

    let output = parse_output(&out);
    assert_eq!(item_ids(&output, true), vec![4]);
    let self_link =
        "https://books.example/api/v1/books/recommendations?language=fr&page=1&per_page=10";
    assert_eq!(output["links"]["self"], self_link);
    let header = output["link_header"].as_str().expect("header string");
    assert!(header.starts_with(&format!("<{self_link}>; rel=\"self\", ")));
}

#[rstest]
fn recommend_paginates_with_legacy_page_count(catalog: CatalogFixture) {
    let args = RecommendArgs {
        per_page: Some(2),
        page: Some(2),
        ..recommend_for(&catalog, "reader-2")
    };
    let mut out = Vec::new();
    run_recommend_with(args, &mut out).expect("recommend");

    let output = parse_output(&out);
    // Four candidates in pages of two: floor(4 / 2) + 1.
    assert_eq!(output["total_pages"], 3);
    assert_eq!(output["has_prev"], true);
    assert_eq!(output["has_next"], false);
    assert_eq!(output["items"].as_array().map(Vec::len), Some(2));
}

#[rstest]
fn recommend_reports_unknown_user(catalog: CatalogFixture) {
    let mut out = Vec::new();
    let err = run_recommend_with(recommend_for(&catalog, "ghost"), &mut out)
        .expect_err("unknown user");
    match err {
        CliError::Recommend(RecommendError::UnknownUser { public_id }) => {
            assert_eq!(public_id, "ghost");
        }
        other => panic!("expected unknown user, found {other:?}"),
    }
}

#[rstest]
fn bookmarks_list_in_book_id_order(catalog: CatalogFixture) {
    let mut out = Vec::new();
    run_bookmarks_with(bookmarks_for(&catalog, "reader-1"), &mut out).expect("bookmarks");

    let output = parse_output(&out);
    assert_eq!(item_ids(&output, false), vec![1, 3]);
    assert_eq!(output["total_items"], 2);
    assert_eq!(output["total_pages"], 1);
    assert_eq!(
        output["links"]["first"],
        "/api/v1/bookmarks/books?page=1&per_page=10"
    );
}

#[rstest]
fn bookmarks_status_filter_is_kept_in_links(catalog: CatalogFixture) {
    let args = BookmarksArgs {
        status: Some("want_to_read".to_owned()),
        ..bookmarks_for(&catalog, "reader-1")
    };
    let mut out = Vec::new();
    run_bookmarks_with(args, &mut out).expect("bookmarks");

    let output = parse_output(&out);
    assert_eq!(item_ids(&output, false), vec![3]);
    assert_eq!(
        output["links"]["self"],
        "/api/v1/bookmarks/books?status=want_to_read&page=1&per_page=10"
    );
}

#[rstest]
fn bookmarks_report_unknown_user(catalog: CatalogFixture) {
    let mut out = Vec::new();
    let err = run_bookmarks_with(bookmarks_for(&catalog, "ghost"), &mut out)
        .expect_err("unknown user");
    match err {
        CliError::UnknownUser { public_id } => assert_eq!(public_id, "ghost"),
        other => panic!("expected UnknownUser, found {other:?}"),
    }
}

#[rstest]
fn book_bookmarks_link_to_the_book_route(catalog: CatalogFixture) {
    let mut out = Vec::new();
    run_book_bookmarks_with(book_bookmarks_for(&catalog, 3), &mut out).expect("book bookmarks");

    let output = parse_output(&out);
    assert_eq!(item_ids(&output, false), vec![2]);
    assert_eq!(output["items"][0]["status"], "want_to_read");
    assert_eq!(output["total_items"], 1);
    assert_eq!(
        output["links"]["self"],
        "/api/v1/bookmarks/3?page=1&per_page=10"
    );
}

#[rstest]
fn book_bookmarks_are_empty_for_an_unbookmarked_book(catalog: CatalogFixture) {
    let mut out = Vec::new();
    run_book_bookmarks_with(book_bookmarks_for(&catalog, 2), &mut out).expect("book bookmarks");

    let output = parse_output(&out);
    assert!(item_ids(&output, false).is_empty());
    assert_eq!(output["total_items"], 0);
}
