//! Reader accounts and their declared interests.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Bookshelf, Subject};

/// A reader with declared subject and bookshelf interests.
///
/// Interests are stored as tag identifiers so matching a book's tags is a set
/// lookup.
///
/// # Examples
/// ```
/// use pico_core::{Subject, User};
///
/// let user = User::new(1, "a1b2").with_subject_interest(4);
/// assert!(user.is_interested_in_subject(&Subject::new(4, "Poetry", 0.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct User {
    /// Internal identifier.
    pub id: u64,
    /// External identifier carried in access tokens.
    pub public_id: String,
    /// Identifiers of subjects the user follows.
    pub subjects: BTreeSet<u64>,
    /// Identifiers of bookshelves the user follows.
    pub bookshelves: BTreeSet<u64>,
}

impl User {
    /// Construct a user without interests.
    #[must_use]
    pub fn new(id: u64, public_id: impl Into<String>) -> Self {
        Self {
            id,
            public_id: public_id.into(),
            subjects: BTreeSet::new(),
            bookshelves: BTreeSet::new(),
        }
    }

    /// Follow a subject while returning `self` for chaining.
    #[must_use]
    pub fn with_subject_interest(mut self, subject_id: u64) -> Self {
        self.subjects.insert(subject_id);
        self
    }

    /// Follow a bookshelf while returning `self` for chaining.
    #[must_use]
    pub fn with_bookshelf_interest(mut self, bookshelf_id: u64) -> Self {
        self.bookshelves.insert(bookshelf_id);
        self
    }

    /// Report whether the user follows `subject`.
    #[must_use]
    pub fn is_interested_in_subject(&self, subject: &Subject) -> bool {
        self.subjects.contains(&subject.id)
    }

    /// Report whether the user follows `bookshelf`.
    #[must_use]
    pub fn is_interested_in_bookshelf(&self, bookshelf: &Bookshelf) -> bool {
        self.bookshelves.contains(&bookshelf.id)
    }
}
