//! Data models for Shelfkeeper

pub mod book;
pub mod person;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookForm, BookQuery, LendingState, PageWindow};
pub use person::{Person, PersonDetails, PersonForm};
