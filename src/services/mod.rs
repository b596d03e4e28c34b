//! Business logic services

pub mod books;
pub mod people;

use std::sync::Arc;

use crate::{config::LendingConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub people: people::PeopleService,
}

impl Services {
    /// Create all services on top of the sqlx repositories
    pub fn new(repository: &Repository, lending: LendingConfig) -> Self {
        let book_store = Arc::new(repository.books.clone());
        let person_store = Arc::new(repository.people.clone());

        Self {
            books: books::BooksService::new(book_store, person_store.clone(), lending.clone()),
            people: people::PeopleService::new(person_store, lending),
        }
    }
}
