//! Person (borrower) model and related types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

/// Three capitalized tokens: "Last First Middle"
pub static PERSON_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-ZА-ЯЁ][a-zа-яё]+ [A-ZА-ЯЁ][a-zа-яё]+ [A-ZА-ЯЁ][a-zа-яё]+$")
        .expect("person name pattern is valid")
});

/// Youngest age at which a person may be registered
pub const MIN_AGE: i32 = 14;

/// Person as stored in the `person` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub birth_year: i32,
}

/// Create / update person request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PersonForm {
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"),
        regex(path = *PERSON_NAME_PATTERN, message = "Expected format: Ivanov Ivan Ivanovich")
    )]
    #[serde(default)]
    pub name: String,
    #[validate(range(min = 1886, message = "Birth year must be after 1885"))]
    #[serde(default)]
    pub birth_year: i32,
}

impl From<&Person> for PersonForm {
    fn from(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            birth_year: person.birth_year,
        }
    }
}

/// A person together with the books they currently hold
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PersonDetails {
    pub person: Person,
    /// Held books with `expired` computed at read time
    pub books: Vec<Book>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_pattern() {
        assert!(PERSON_NAME_PATTERN.is_match("Иванов Иван Иванович"));
        assert!(PERSON_NAME_PATTERN.is_match("Gabaraev Raul Zurabovich"));
        assert!(!PERSON_NAME_PATTERN.is_match("Иванов Иван"));
        assert!(!PERSON_NAME_PATTERN.is_match("иванов Иван Иванович"));
        assert!(!PERSON_NAME_PATTERN.is_match("Иванов  Иван Иванович"));
    }
}
