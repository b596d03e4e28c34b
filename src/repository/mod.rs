//! Repository layer for database operations.
//!
//! Services talk to the store through [`BookStore`] and [`PersonStore`]; the
//! sqlx repositories below are the production implementations.

pub mod books;
pub mod people;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

#[cfg(test)]
use mockall::automock;

use crate::{
    error::AppResult,
    models::{Book, BookForm, PageWindow, Person, PersonForm},
};

/// Typed access to the `book` table. Every returned book carries its holder.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<Option<Book>>;

    /// One page of books, by `(year, id)` when `sort_by_year`, else by id
    async fn list(&self, window: PageWindow, sort_by_year: bool) -> AppResult<Vec<Book>>;

    /// Books whose title starts with `prefix`, matched as given
    async fn find_by_title_prefix(&self, prefix: &str) -> AppResult<Vec<Book>>;

    async fn create(&self, form: &BookForm) -> AppResult<Book>;

    /// Replace title/author/year, leaving holder and taken_at untouched
    async fn update_details(&self, id: i32, form: &BookForm) -> AppResult<Option<Book>>;

    /// Point the book at `person_id`, overwriting any previous holder.
    /// Returns `None` when either row does not exist.
    async fn assign(
        &self,
        book_id: i32,
        person_id: i32,
        taken_at: DateTime<Utc>,
    ) -> AppResult<Option<Book>>;

    /// Put a held book back on the shelf. Returns `None` if it was not held.
    async fn release(&self, book_id: i32) -> AppResult<Option<Book>>;

    async fn delete(&self, id: i32) -> AppResult<bool>;
}

/// Typed access to the `person` table
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn get(&self, id: i32) -> AppResult<Option<Person>>;

    /// A person and their held set, read from one snapshot.
    /// Every lookup of a held set goes through here.
    async fn get_with_books(&self, id: i32) -> AppResult<Option<(Person, Vec<Book>)>>;

    async fn list(&self) -> AppResult<Vec<Person>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Person>>;

    async fn create(&self, form: &PersonForm) -> AppResult<Person>;

    async fn update(&self, id: i32, form: &PersonForm) -> AppResult<Option<Person>>;

    /// Release every book the person holds, then delete the row
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub people: people::PeopleRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            people: people::PeopleRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
