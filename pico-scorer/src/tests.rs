//! Unit coverage for scoring primitives, the popularity job and ranking.
#![forbid(unsafe_code)]

use pico_core::{
    Book,
    Bookmark,
    BookmarkStatus,
    Bookshelf,
    CatalogStore,
    Comment,
    CommentType,
    PageRequest,
    Subject,
    User,
    test_support::{MemoryCatalog, MemoryCatalogError},
};
use rstest::{fixture, rstest};

use crate::{
    CatalogAggregates, PopularityError, RecommendConfig, RecommendError, TotalPagesPolicy,
    affinity_score, popularity_score, recommend, recommend_for_public_id, review_score,
    run_popularity_precomputation,
};

#[expect(clippy::float_arithmetic, reason = "tests compare floating-point scores")]
fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected approximately {expected}, got {actual}"
    );
}

fn request(page: u32, per_page: u32) -> PageRequest {
    PageRequest::new(page, per_page).expect("valid page request")
}

#[rstest]
fn review_score_is_zero_without_votes() {
    assert_close(review_score(&[]), 0.0);
    assert_close(review_score(&[Comment::review(1, 1, 5.0, 0, 0)]), 0.0);
}

#[rstest]
fn review_score_weights_by_net_votes() {
    let reviews = [
        Comment::review(1, 1, 4.0, 3, 1),
        Comment::review(2, 1, 1.0, 0, 4),
    ];
    // (4 * 2 + 1 * -4) / (4 + 4)
    assert_close(review_score(&reviews), 0.5);
}

#[rstest]
fn review_score_ignores_plain_comments() {
    let mut remark = Comment::review(2, 1, 1.0, 50, 0);
    remark.kind = CommentType::Comment;
    let comments = [Comment::review(1, 1, 3.0, 2, 0), remark];
    assert_close(review_score(&comments), 3.0);
}

#[rstest]
fn popularity_of_unread_undownloaded_book_counts_one_read() {
    let book = Book::new(1, "Unread");
    let score = popularity_score(&book, 0, &CatalogAggregates::new(0, 0));
    assert_close(score, 50.0);
}

#[rstest]
fn popularity_peaks_at_catalog_maxima() {
    let book = Book::new(1, "Top").with_downloads(800);
    let score = popularity_score(&book, 30, &CatalogAggregates::new(30, 800));
    assert_close(score, 100.0);
}

#[rstest]
fn popularity_is_clamped_under_stale_aggregates() {
    let book = Book::new(1, "Outgrown").with_downloads(10_000);
    let score = popularity_score(&book, 500, &CatalogAggregates::new(5, 10));
    assert_close(score, 100.0);
}

fn devoted_reader() -> User {
    User::new(1, "u")
        .with_subject_interest(1)
        .with_bookshelf_interest(9)
}

#[rstest]
#[case(None, 2.75)]
#[case(Some(User::new(1, "u").with_subject_interest(1)), 3.75)]
#[case(Some(devoted_reader()), 4.75)]
fn affinity_adds_follow_bonuses(#[case] user: Option<User>, #[case] expected: f64) {
    let book = Book::new(1, "Tagged")
        .with_subject(Subject::new(1, "History", 0.5))
        .with_subject(Subject::new(2, "War", 0.25))
        .with_bookshelf(Bookshelf::new(9, "Classics", 1.0))
        .with_rating(1.0);
    assert_close(affinity_score(user.as_ref(), &book), expected);
}

#[rstest]
fn affinity_of_bare_book_is_zero() {
    let reader = User::new(1, "u").with_subject_interest(3);
    assert_close(affinity_score(Some(&reader), &Book::new(1, "Bare")), 0.0);
}

#[rstest]
#[case(TotalPagesPolicy::Legacy, 235, 10, 24)]
#[case(TotalPagesPolicy::Ceiling, 235, 10, 24)]
#[case(TotalPagesPolicy::Legacy, 240, 10, 25)]
#[case(TotalPagesPolicy::Ceiling, 240, 10, 24)]
#[case(TotalPagesPolicy::Legacy, 0, 10, 1)]
#[case(TotalPagesPolicy::Ceiling, 0, 10, 0)]
fn total_pages_policies(
    #[case] policy: TotalPagesPolicy,
    #[case] size: usize,
    #[case] per_page: u32,
    #[case] expected: u32,
) {
    assert_eq!(policy.total_pages(size, per_page), expected);
}

#[rstest]
#[case("legacy", TotalPagesPolicy::Legacy)]
#[case("Ceiling", TotalPagesPolicy::Ceiling)]
fn parses_total_pages_policy(#[case] raw: &str, #[case] expected: TotalPagesPolicy) {
    assert_eq!(raw.parse::<TotalPagesPolicy>(), Ok(expected));
}

/// 235 untagged books whose cached popularity falls with their id.
#[fixture]
fn large_catalog() -> MemoryCatalog {
    MemoryCatalog::new().with_books((1..=235_u32).map(|id| {
        Book::new(u64::from(id), format!("Book {id}"))
            .with_popularity_score(f64::from(1_000 - id))
    }))
}

fn wide_window() -> RecommendConfig {
    RecommendConfig {
        candidate_window: 500,
        ..RecommendConfig::default()
    }
}

#[rstest]
fn first_page_of_large_working_set(large_catalog: MemoryCatalog) {
    let reader = User::new(99, "reader");
    let page = recommend(
        &large_catalog,
        &reader,
        request(1, 10),
        None,
        &wide_window(),
    )
    .expect("infallible store");
    let ids: Vec<_> = page.books.iter().map(|scored| scored.book.id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
    assert!(page.has_next);
    assert!(!page.has_prev);
    assert_eq!(page.working_set_size, 235);
    assert_eq!(page.total_pages, 24);
}

#[rstest]
fn last_page_of_large_working_set(large_catalog: MemoryCatalog) {
    let reader = User::new(99, "reader");
    let page = recommend(
        &large_catalog,
        &reader,
        request(24, 10),
        None,
        &wide_window(),
    )
    .expect("infallible store");
    let ids: Vec<_> = page.books.iter().map(|scored| scored.book.id).collect();
    assert_eq!(ids, (231..=235).collect::<Vec<u64>>());
    assert!(!page.has_next);
    assert!(page.has_prev);
}

#[rstest]
fn default_window_truncates_candidates(large_catalog: MemoryCatalog) {
    let reader = User::new(99, "reader");
    let page = recommend(
        &large_catalog,
        &reader,
        request(1, 10),
        None,
        &RecommendConfig::default(),
    )
    .expect("infallible store");
    assert_eq!(page.working_set_size, 200);
}

#[rstest]
fn page_beyond_working_set_is_empty(large_catalog: MemoryCatalog) {
    let reader = User::new(99, "reader");
    let page = recommend(
        &large_catalog,
        &reader,
        request(40, 10),
        None,
        &wide_window(),
    )
    .expect("infallible store");
    assert!(page.books.is_empty());
    assert!(!page.has_next);
    assert!(page.has_prev);
}

#[rstest]
fn affinity_reorders_and_ties_keep_popularity_order() {
    let catalog = MemoryCatalog::new()
        .with_book(Book::new(1, "Most popular").with_popularity_score(90.0))
        .with_book(Book::new(2, "Second").with_popularity_score(80.0))
        .with_book(
            Book::new(3, "Followed")
                .with_popularity_score(10.0)
                .with_subject(Subject::new(7, "Sea", 0.0)),
        );
    let reader = User::new(1, "u").with_subject_interest(7);
    let page = recommend(
        &catalog,
        &reader,
        request(1, 10),
        None,
        &RecommendConfig::default(),
    )
    .expect("infallible store");
    let ids: Vec<_> = page.books.iter().map(|scored| scored.book.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[rstest]
fn bookmarked_books_are_never_recommended() {
    let catalog = MemoryCatalog::new()
        .with_book(Book::new(1, "Read").with_popularity_score(90.0))
        .with_book(Book::new(2, "Unread").with_popularity_score(10.0))
        .with_bookmark(Bookmark::new(1, 1, 5, BookmarkStatus::Read));
    let reader = User::new(5, "u");
    let page = recommend(
        &catalog,
        &reader,
        request(1, 10),
        None,
        &RecommendConfig::default(),
    )
    .expect("infallible store");
    let ids: Vec<_> = page.books.iter().map(|scored| scored.book.id).collect();
    assert_eq!(ids, vec![2]);
}

#[rstest]
fn language_filter_restricts_candidates() {
    let catalog = MemoryCatalog::new()
        .with_book(Book::new(1, "Faust").with_language("de"))
        .with_book(Book::new(2, "Hamlet").with_language("en"));
    let reader = User::new(5, "u");
    let page = recommend(
        &catalog,
        &reader,
        request(1, 10),
        Some("de"),
        &RecommendConfig::default(),
    )
    .expect("infallible store");
    let ids: Vec<_> = page.books.iter().map(|scored| scored.book.id).collect();
    assert_eq!(ids, vec![1]);
}

#[rstest]
fn unknown_public_id_is_reported() {
    let err = recommend_for_public_id(
        &MemoryCatalog::new(),
        "ghost",
        request(1, 10),
        None,
        &RecommendConfig::default(),
    )
    .expect_err("unknown user");
    assert!(matches!(err, RecommendError::UnknownUser { public_id } if public_id == "ghost"));
}

#[rstest]
fn descriptor_mirrors_flags(large_catalog: MemoryCatalog) {
    let reader = User::new(99, "reader");
    let page = recommend(
        &large_catalog,
        &reader,
        request(3, 10),
        None,
        &wide_window(),
    )
    .expect("infallible store");
    let descriptor = page.descriptor();
    assert_eq!(descriptor.page, 3);
    assert_eq!(descriptor.items_per_page, 10);
    assert_eq!(descriptor.total_pages, 24);
    assert!(descriptor.has_prev && descriptor.has_next);
}

fn scored_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_book(
            Book::new(1, "Reviewed")
                .with_downloads(100)
                .with_rating(2.0)
                .with_subject(Subject::new(1, "Drama", 0.5)),
        )
        .with_book(Book::new(2, "Quiet").with_downloads(1))
        .with_comment(Comment::review(1, 1, 4.0, 1, 0))
        .with_bookmark(Bookmark::new(1, 1, 7, BookmarkStatus::Read))
        .with_bookmark(Bookmark::new(2, 1, 8, BookmarkStatus::Unread))
}

#[rstest]
fn precomputation_scores_every_book() {
    let mut catalog = scored_catalog();
    let report = run_popularity_precomputation(&mut catalog).expect("infallible store");
    assert_eq!(report.books_scored, 2);
    assert_eq!(catalog.writes().len(), 2);

    let reviewed = catalog.book(1).expect("infallible").expect("book exists");
    // affinity 2.5 + review 4.0 + popularity 100.0
    assert_close(reviewed.popularity_score, 106.5);
    assert_eq!(report.max_score, Some(reviewed.popularity_score));
}

#[rstest]
fn precomputation_is_idempotent() {
    let mut catalog = scored_catalog();
    run_popularity_precomputation(&mut catalog).expect("first run");
    let first = catalog.books().expect("infallible");
    run_popularity_precomputation(&mut catalog).expect("second run");
    let second = catalog.books().expect("infallible");
    assert_eq!(first, second);
}

#[rstest]
fn failed_write_keeps_earlier_books_updated() {
    let mut catalog = scored_catalog().rejecting_writes_for(2);
    let err = run_popularity_precomputation(&mut catalog).expect_err("write rejected");
    assert!(matches!(
        err,
        PopularityError::Write {
            book_id: 2,
            source: MemoryCatalogError::WriteRejected { .. }
        }
    ));
    assert_eq!(catalog.writes().len(), 1);
    let untouched = catalog.book(2).expect("infallible").expect("book exists");
    assert_close(untouched.popularity_score, 0.0);
}

#[rstest]
fn empty_catalog_produces_empty_report() {
    let mut catalog = MemoryCatalog::new();
    let report = run_popularity_precomputation(&mut catalog).expect("infallible store");
    assert_eq!(report.books_scored, 0);
    assert!(report.min_score.is_none());
}
