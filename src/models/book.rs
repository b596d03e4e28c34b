//! Book (catalog entry) model, lending state and listing parameters

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::person::Person;
use crate::error::{AppError, AppResult};

/// Starts with an uppercase letter, then letters and whitespace only
pub static TITLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-ZА-ЯЁ][a-zA-Zа-яА-ЯёЁ\s]*$").expect("title pattern is valid")
});

/// Exactly "Firstname Lastname"
pub static AUTHOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-ZА-ЯЁ][a-zа-яё]+\s[A-ZА-ЯЁ][a-zа-яё]+$").expect("author pattern is valid")
});

/// Book with its holder fully materialized.
///
/// `taken_at` is set exactly when `holder` is set. `expired` is never
/// persisted: it is computed when a holder's book list is read and stays
/// `false` for books on the shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub holder: Option<Person>,
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expired: bool,
}

/// Row shape of `book LEFT JOIN person`
#[derive(Debug, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub taken_at: Option<DateTime<Utc>>,
    pub holder_id: Option<i32>,
    pub holder_name: Option<String>,
    pub holder_birth_year: Option<i32>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        let holder = match (row.holder_id, row.holder_name, row.holder_birth_year) {
            (Some(id), Some(name), Some(birth_year)) => Some(Person {
                id,
                name,
                birth_year,
            }),
            _ => None,
        };
        // Keep the pair consistent even if a row slipped past the CHECK
        let taken_at = holder.as_ref().and(row.taken_at);

        Book {
            id: row.id,
            title: row.title,
            author: row.author,
            year: row.year,
            holder,
            taken_at,
            expired: false,
        }
    }
}

/// Where a book currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingState {
    OnShelf,
    Held {
        holder_id: i32,
        taken_at: DateTime<Utc>,
    },
}

impl Book {
    pub fn lending_state(&self) -> LendingState {
        match (&self.holder, self.taken_at) {
            (Some(holder), Some(taken_at)) => LendingState::Held {
                holder_id: holder.id,
                taken_at,
            },
            _ => LendingState::OnShelf,
        }
    }

    pub fn holder_id(&self) -> Option<i32> {
        self.holder.as_ref().map(|p| p.id)
    }

    /// True when the loan is strictly older than `loan_period`
    pub fn is_expired_at(&self, now: DateTime<Utc>, loan_period: Duration) -> bool {
        match self.lending_state() {
            LendingState::Held { taken_at, .. } => now - taken_at > loan_period,
            LendingState::OnShelf => false,
        }
    }
}

/// Recompute `expired` on every book of a held set
pub fn mark_expired(books: &mut [Book], now: DateTime<Utc>, loan_period: Duration) {
    for book in books.iter_mut() {
        book.expired = book.is_expired_at(now, loan_period);
    }
}

/// Create / update book request. Relationship fields are never accepted
/// from the client: editing metadata keeps the current lending state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(
        length(min = 2, max = 255, message = "Title must be between 2 and 255 characters"),
        regex(path = *TITLE_PATTERN, message = "Expected format: Solaris")
    )]
    #[serde(default)]
    pub title: String,
    #[validate(
        length(min = 2, max = 100, message = "Author must be between 2 and 100 characters"),
        regex(path = *AUTHOR_PATTERN, message = "Expected format: Stanislaw Lem")
    )]
    #[serde(default)]
    pub author: String,
    #[validate(range(min = 1801, message = "Year must be after 1800"))]
    #[serde(default)]
    pub year: i32,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year,
        }
    }
}

/// Book listing parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Zero-based page index (default: 0)
    pub page: Option<i64>,
    /// Page size (default: unbounded)
    pub books_per_page: Option<i64>,
    /// Order by publication year (default: true)
    pub sort_by_year: Option<bool>,
}

/// Offset / limit pair handed to the store. `limit: None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: Option<i64>,
}

impl PageWindow {
    pub const ALL: PageWindow = PageWindow {
        offset: 0,
        limit: None,
    };
}

impl BookQuery {
    pub fn sort_by_year(&self) -> bool {
        self.sort_by_year.unwrap_or(true)
    }

    /// Resolve defaults and turn page/size into an offset window
    pub fn window(&self) -> AppResult<PageWindow> {
        let page = self.page.unwrap_or(0);
        if page < 0 {
            return Err(AppError::BadRequest("page must not be negative".to_string()));
        }

        match self.books_per_page {
            Some(size) if size < 1 => Err(AppError::BadRequest(
                "books_per_page must be at least 1".to_string(),
            )),
            Some(size) => Ok(PageWindow {
                offset: page.saturating_mul(size),
                limit: Some(size),
            }),
            // An unbounded first page holds every row, so later pages are empty
            None => Ok(PageWindow {
                offset: if page == 0 { 0 } else { i64::MAX },
                limit: None,
            }),
        }
    }
}

/// Lower-case the input, then upper-case its first character
pub fn normalize_title_prefix(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Book page: the holder when lent, otherwise the people it can be lent to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub book: Option<Book>,
    pub holder: Option<Person>,
    pub people: Option<Vec<Person>>,
}

/// Search request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookSearch {
    pub title: Option<String>,
}

/// Assign request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignBook {
    pub person_id: i32,
}
