//! Catalog and lending service

use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{book::normalize_title_prefix, Book, BookDetails, BookForm, BookQuery, LendingState},
    repository::{BookStore, PersonStore},
    validation::validate_book,
};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BookStore>,
    people: Arc<dyn PersonStore>,
    lending: LendingConfig,
}

impl BooksService {
    pub fn new(
        books: Arc<dyn BookStore>,
        people: Arc<dyn PersonStore>,
        lending: LendingConfig,
    ) -> Self {
        Self {
            books,
            people,
            lending,
        }
    }

    /// One page of the catalog. Only the page content is returned.
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let window = query.window()?;
        self.books.list(window, query.sort_by_year()).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        self.books.get(id).await
    }

    /// Book page: its holder if lent, otherwise everyone it could be lent to
    pub async fn get_book_details(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.books.get(id).await?;

        match book.as_ref().and_then(|b| b.holder.clone()) {
            Some(holder) => Ok(BookDetails {
                book,
                holder: Some(holder),
                people: None,
            }),
            None => Ok(BookDetails {
                book,
                holder: None,
                people: Some(self.people.list().await?),
            }),
        }
    }

    pub async fn create_book(&self, form: BookForm) -> AppResult<Book> {
        validate_book(&form, self.lending.current_year()?)?;

        let book = self.books.create(&form).await?;
        tracing::info!("Created book {} \"{}\"", book.id, book.title);
        Ok(book)
    }

    /// Replace the book's metadata; its holder and loan date are kept
    pub async fn update_book(&self, id: i32, form: BookForm) -> AppResult<Option<Book>> {
        validate_book(&form, self.lending.current_year()?)?;

        let updated = self.books.update_details(id, &form).await?;
        match &updated {
            Some(book) => tracing::info!("Updated book {}", book.id),
            None => tracing::warn!("Update skipped: book {} does not exist", id),
        }
        Ok(updated)
    }

    /// Lend a book to a person.
    ///
    /// A book that is already lent is taken from its current holder and the
    /// loan date restarts. Unknown book or person ids leave everything as is.
    pub async fn assign(&self, book_id: i32, person_id: i32) -> AppResult<Option<Book>> {
        let Some(book) = self.books.get(book_id).await? else {
            tracing::warn!("Assign skipped: book {} does not exist", book_id);
            return Ok(None);
        };

        if let LendingState::Held { holder_id, .. } = book.lending_state() {
            tracing::info!(
                "Book {} moves from person {} to person {}",
                book_id,
                holder_id,
                person_id
            );
        }

        let assigned = self.books.assign(book_id, person_id, Utc::now()).await?;
        match &assigned {
            Some(_) => tracing::info!("Book {} assigned to person {}", book_id, person_id),
            None => tracing::warn!(
                "Assign skipped: person {} or book {} does not exist",
                person_id,
                book_id
            ),
        }
        Ok(assigned)
    }

    /// Put a lent book back on the shelf.
    ///
    /// Unknown ids are a no-op; releasing a book nobody holds is an error.
    pub async fn release(&self, book_id: i32) -> AppResult<Option<Book>> {
        let Some(book) = self.books.get(book_id).await? else {
            tracing::warn!("Release skipped: book {} does not exist", book_id);
            return Ok(None);
        };

        let not_held = || AppError::BusinessRule(format!("Book {} is not lent to anyone", book_id));

        let LendingState::Held { holder_id, .. } = book.lending_state() else {
            return Err(not_held());
        };

        // The conditional update also catches a release that raced ours
        let released = self.books.release(book_id).await?.ok_or_else(not_held)?;
        tracing::info!("Book {} released by person {}", book_id, holder_id);
        Ok(Some(released))
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<bool> {
        let deleted = self.books.delete(id).await?;
        if deleted {
            tracing::info!("Deleted book {}", id);
        }
        Ok(deleted)
    }

    /// Prefix search on titles.
    ///
    /// `None` means no search was requested. An empty title searches for
    /// nothing rather than everything.
    pub async fn search_by_title(&self, title: Option<&str>) -> AppResult<Option<Vec<Book>>> {
        let Some(title) = title else {
            return Ok(None);
        };

        let prefix = normalize_title_prefix(title);
        if prefix.is_empty() {
            return Ok(Some(Vec::new()));
        }

        self.books.find_by_title_prefix(&prefix).await.map(Some)
    }
}
