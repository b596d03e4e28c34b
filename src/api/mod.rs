//! API handlers for Shelfkeeper endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod people;

use axum::response::{IntoResponse, Redirect, Response};

use crate::error::{field_errors, AppError, AppResult, FieldErrors};

/// Answer a form submission.
///
/// Success redirects (303) to `redirect_to`. A validation failure is not an
/// HTTP error: the form is rendered again, with its messages, as a 200.
pub(crate) fn form_outcome<T>(
    result: AppResult<T>,
    redirect_to: &'static str,
    rerender: impl FnOnce(FieldErrors) -> Response,
) -> AppResult<Response> {
    match result {
        Ok(_) => Ok(Redirect::to(redirect_to).into_response()),
        Err(AppError::Validation(errors)) => Ok(rerender(field_errors(&errors))),
        Err(e) => Err(e),
    }
}
