//! Test helpers for seeding catalogs and capturing command output.

use camino::{Utf8Path, Utf8PathBuf};
use pico_core::{
    Book,
    Bookmark,
    BookmarkStatus,
    Bookshelf,
    Comment,
    Subject,
    User,
    test_support::{MemoryCatalog, write_sqlite_catalog},
};
use serde_json::Value;
use tempfile::TempDir;

/// A seeded catalog database inside a temporary directory.
pub(super) struct CatalogFixture {
    _dir: TempDir,
    database: Utf8PathBuf,
}

impl CatalogFixture {
    pub(super) fn seeded() -> Self {
        Self::from_catalog(&library())
    }

    pub(super) fn from_catalog(catalog: &MemoryCatalog) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        let database = root.join("catalog.db");
        write_sqlite_catalog(database.as_std_path(), catalog).expect("seed catalog");
        Self {
            _dir: dir,
            database,
        }
    }

    pub(super) fn database(&self) -> &Utf8Path {
        &self.database
    }

    pub(super) fn root(&self) -> &Utf8Path {
        self.database.parent().expect("database has a parent")
    }
}

/// Three books, two readers and a handful of bookmarks.
///
/// `reader-1` follows the Gothic subject and has bookmarked Frankenstein
/// (read) and Emma (want to read). `reader-2` has bookmarked nothing.
pub(super) fn library() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_book(
            Book::new(1, "Frankenstein")
                .with_downloads(500)
                .with_rating(4.0)
                .with_language("en")
                .with_subject(Subject::new(10, "Gothic", 0.5)),
        )
        .with_book(
            Book::new(2, "Dracula")
                .with_downloads(300)
                .with_language("en")
                .with_subject(Subject::new(10, "Gothic", 0.5))
                .with_popularity_score(20.0),
        )
        .with_book(
            Book::new(3, "Emma")
                .with_downloads(900)
                .with_language("en")
                .with_bookshelf(Bookshelf::new(20, "Romance", 0.25))
                .with_popularity_score(60.0),
        )
        .with_book(
            Book::new(4, "Les Misérables")
                .with_downloads(100)
                .with_language("fr")
                .with_popularity_score(40.0),
        )
        .with_user(User::new(1, "reader-1").with_subject_interest(10))
        .with_user(User::new(2, "reader-2"))
        .with_comment(Comment::review(1, 1, 5.0, 3, 1))
        .with_bookmark(Bookmark::new(1, 1, 1, BookmarkStatus::Read))
        .with_bookmark(Bookmark::new(2, 3, 1, BookmarkStatus::WantToRead))
}

/// Decode captured command output.
pub(super) fn parse_output(buffer: &[u8]) -> Value {
    serde_json::from_slice(buffer).expect("command output is JSON")
}

/// Book ids listed under `items`; ranked items nest the book under `book`.
pub(super) fn item_ids(output: &Value, nested_in_book: bool) -> Vec<u64> {
    output["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|item| {
            let book = if nested_in_book { &item["book"] } else { item };
            book["id"].as_u64().expect("numeric id")
        })
        .collect()
}
