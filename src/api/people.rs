//! People (borrowers) endpoints

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Book, Person, PersonDetails, PersonForm},
    AppState,
};

use super::form_outcome;

/// Person form, empty or pre-filled, with the messages of a failed submission
#[derive(Serialize, ToSchema)]
pub struct PersonFormView {
    /// Form being shown (`people/new` or `people/edit`)
    pub view: String,
    pub id: Option<i32>,
    /// Form values; absent when the edited person does not exist
    pub person: Option<PersonForm>,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl PersonFormView {
    fn new(view: &str, id: Option<i32>, person: Option<PersonForm>) -> Self {
        Self {
            view: view.to_string(),
            id,
            person,
            errors: BTreeMap::new(),
        }
    }
}

/// List everyone registered
#[utoipa::path(
    get,
    path = "/people",
    tag = "people",
    responses(
        (status = 200, description = "All people", body = Vec<Person>)
    )
)]
pub async fn list_people(State(state): State<AppState>) -> AppResult<Json<Vec<Person>>> {
    let people = state.services.people.list_people().await?;
    Ok(Json(people))
}

/// Register a new person
#[utoipa::path(
    post,
    path = "/people",
    tag = "people",
    request_body = PersonForm,
    responses(
        (status = 303, description = "Created, redirect to /people"),
        (status = 200, description = "Invalid input, form shown again", body = PersonFormView)
    )
)]
pub async fn create_person(
    State(state): State<AppState>,
    Json(form): Json<PersonForm>,
) -> AppResult<Response> {
    let result = state.services.people.create_person(form.clone()).await;

    form_outcome(result, "/people", |errors| {
        Json(PersonFormView {
            errors,
            ..PersonFormView::new("people/new", None, Some(form))
        })
        .into_response()
    })
}

/// Empty registration form
#[utoipa::path(
    get,
    path = "/people/new",
    tag = "people",
    responses(
        (status = 200, description = "Registration form", body = PersonFormView)
    )
)]
pub async fn new_person() -> Json<PersonFormView> {
    Json(PersonFormView::new("people/new", None, Some(PersonForm::default())))
}

/// Edit form pre-filled with the person's current values
#[utoipa::path(
    get,
    path = "/people/{id}/edit",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Edit form, empty if the person does not exist", body = PersonFormView)
    )
)]
pub async fn edit_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PersonFormView>> {
    let person = state.services.people.get_person(id).await?;

    Ok(Json(PersonFormView::new(
        "people/edit",
        Some(id),
        person.as_ref().map(PersonForm::from),
    )))
}

/// Person details with the books they hold
#[utoipa::path(
    get,
    path = "/people/{id}",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Person and held books, null if unknown", body = PersonDetails)
    )
)]
pub async fn show_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Option<PersonDetails>>> {
    let details = state.services.people.get_person_details(id).await?;
    Ok(Json(details))
}

/// Books currently held by a person
#[utoipa::path(
    get,
    path = "/people/{id}/books",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Held books with expiry flags", body = Vec<Book>),
        (status = 404, description = "Person not found")
    )
)]
pub async fn held_books(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state
        .services
        .people
        .get_held_books(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Person with id {} not found", id)))?;

    Ok(Json(books))
}

/// Update a person's name and birth year
#[utoipa::path(
    patch,
    path = "/people/{id}",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    request_body = PersonForm,
    responses(
        (status = 303, description = "Updated, redirect to /people"),
        (status = 200, description = "Invalid input, form shown again", body = PersonFormView)
    )
)]
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<PersonForm>,
) -> AppResult<Response> {
    let result = state.services.people.update_person(id, form.clone()).await;

    form_outcome(result, "/people", |errors| {
        Json(PersonFormView {
            errors,
            ..PersonFormView::new("people/edit", Some(id), Some(form))
        })
        .into_response()
    })
}

/// Delete a person, returning their books to the shelf
#[utoipa::path(
    delete,
    path = "/people/{id}",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 303, description = "Redirect to /people")
    )
)]
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    state.services.people.delete_person(id).await?;
    Ok(Redirect::to("/people"))
}
