//! Reader comments and reviews with their vote tallies.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of a comment left on a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommentType {
    /// A rated review. Only reviews feed the review score.
    Review,
    /// Any other remark.
    Comment,
}

impl CommentType {
    /// Return the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Comment => "comment",
        }
    }

    /// Parse the stored representation, treating unknown kinds as plain
    /// comments.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value.eq_ignore_ascii_case("review") {
            Self::Review
        } else {
            Self::Comment
        }
    }
}

/// A comment on a book together with its vote tally.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Comment {
    /// Unique identifier.
    pub id: u64,
    /// Book the comment belongs to.
    pub book_id: u64,
    /// Review or plain comment.
    pub kind: CommentType,
    /// Rating attached to the comment.
    pub rating: f64,
    /// Number of up-votes.
    pub upvotes: u32,
    /// Number of down-votes.
    pub downvotes: u32,
}

impl Comment {
    /// Construct a review with the given rating and vote tally.
    #[must_use]
    pub const fn review(id: u64, book_id: u64, rating: f64, upvotes: u32, downvotes: u32) -> Self {
        Self {
            id,
            book_id,
            kind: CommentType::Review,
            rating,
            upvotes,
            downvotes,
        }
    }

    /// Net votes (`upvotes - downvotes`), which may be negative.
    #[must_use]
    pub fn net_votes(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }

    /// Total votes cast (`upvotes + downvotes`).
    #[must_use]
    pub fn total_votes(&self) -> u64 {
        u64::from(self.upvotes) + u64::from(self.downvotes)
    }
}
