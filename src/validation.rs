//! Form validation beyond what the `validator` derives express.
//!
//! The derives cover lengths, patterns and lower bounds. The rules here need
//! either the clock or the current contents of the store, so callers pass
//! those in. Every rule runs; violations accumulate per field.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{
    person::MIN_AGE,
    BookForm, Person, PersonForm,
};

fn rule(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn derived_errors(form: &impl Validate) -> ValidationErrors {
    match form.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    }
}

fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a book form against the reference clock's `current_year`
pub fn validate_book(form: &BookForm, current_year: i32) -> Result<(), ValidationErrors> {
    let mut errors = derived_errors(form);

    if form.title.trim().is_empty() {
        errors.add("title", rule("blank", "Title must not be blank"));
    }
    if form.author.trim().is_empty() {
        errors.add("author", rule("blank", "Author must not be blank"));
    }
    if form.year > current_year {
        errors.add(
            "year",
            rule(
                "year_in_future",
                format!("Year must not be later than {}", current_year),
            ),
        );
    }

    finish(errors)
}

/// Validate a person form.
///
/// `namesake` is whatever the store holds under the submitted name.
/// `editing` is the id of the person being updated, which may keep its own
/// name; on create it is `None`.
pub fn validate_person(
    form: &PersonForm,
    current_year: i32,
    namesake: Option<&Person>,
    editing: Option<i32>,
) -> Result<(), ValidationErrors> {
    let mut errors = derived_errors(form);

    if form.name.trim().is_empty() {
        errors.add("name", rule("blank", "Name must not be blank"));
    }

    if let Some(existing) = namesake {
        if Some(existing.id) != editing {
            errors.add("name", rule("name_taken", "A person with this name already exists"));
        }
    }

    let latest_birth_year = current_year - MIN_AGE;
    if form.birth_year > latest_birth_year {
        errors.add(
            "birth_year",
            rule(
                "too_young",
                format!("Birth year must not be later than {}", latest_birth_year),
            ),
        );
    }

    finish(errors)
}
