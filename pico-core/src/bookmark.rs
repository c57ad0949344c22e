//! Bookmarks record a user's reading status for one book.
//!
//! # Examples
//! ```
//! use pico_core::BookmarkStatus;
//!
//! let status: BookmarkStatus = "Want_To_Read".parse().expect("known status");
//! assert_eq!(status, BookmarkStatus::WantToRead);
//! assert_eq!(status.to_string(), "want_to_read");
//! ```

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reading status attached to a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BookmarkStatus {
    /// Finished.
    Read,
    /// Saved without a reading intention.
    Unread,
    /// Queued for later.
    WantToRead,
    /// In progress.
    CurrentlyReading,
}

impl BookmarkStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Read,
        Self::Unread,
        Self::WantToRead,
        Self::CurrentlyReading,
    ];

    /// Return the status as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Unread => "unread",
            Self::WantToRead => "want_to_read",
            Self::CurrentlyReading => "currently_reading",
        }
    }
}

impl fmt::Display for BookmarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a bookmark status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bookmark status '{value}'")]
pub struct ParseBookmarkStatusError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for BookmarkStatus {
    type Err = ParseBookmarkStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseBookmarkStatusError {
                value: s.to_owned(),
            })
    }
}

/// A user's bookmark on a book. At most one exists per `(book_id, user_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bookmark {
    /// Unique identifier.
    pub id: u64,
    /// Bookmarked book.
    pub book_id: u64,
    /// Owning user.
    pub user_id: u64,
    /// Reading status.
    pub status: BookmarkStatus,
}

impl Bookmark {
    /// Construct a bookmark record.
    #[must_use]
    pub const fn new(id: u64, book_id: u64, user_id: u64, status: BookmarkStatus) -> Self {
        Self {
            id,
            book_id,
            user_id,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("read", BookmarkStatus::Read)]
    #[case("UNREAD", BookmarkStatus::Unread)]
    #[case("want_to_read", BookmarkStatus::WantToRead)]
    #[case("CURRENTLY_READING", BookmarkStatus::CurrentlyReading)]
    fn parses_case_insensitively(#[case] raw: &str, #[case] expected: BookmarkStatus) {
        assert_eq!(raw.parse::<BookmarkStatus>(), Ok(expected));
    }

    #[rstest]
    fn display_matches_as_str() {
        for status in BookmarkStatus::ALL {
            assert_eq!(status.to_string(), status.as_str());
        }
    }

    #[rstest]
    fn parsing_rejects_unknown() {
        let err = "abandoned"
            .parse::<BookmarkStatus>()
            .expect_err("unknown status should fail");
        assert_eq!(err.value, "abandoned");
    }
}
