//! Book catalog and lending endpoints

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{AssignBook, BookSearch},
        Book, BookDetails, BookForm, BookQuery,
    },
    AppState,
};

use super::form_outcome;

/// Book form, empty or pre-filled, with the messages of a failed submission
#[derive(Serialize, ToSchema)]
pub struct BookFormView {
    /// Form being shown (`books/new` or `books/edit`)
    pub view: String,
    /// Book being edited, absent on the creation form
    pub id: Option<i32>,
    /// Form values; absent when the edited book does not exist
    pub book: Option<BookForm>,
    /// Field -> messages
    pub errors: BTreeMap<String, Vec<String>>,
}

impl BookFormView {
    fn new(view: &str, id: Option<i32>, book: Option<BookForm>) -> Self {
        Self {
            view: view.to_string(),
            id,
            book,
            errors: BTreeMap::new(),
        }
    }
}

/// Search page; `books` is absent until a title was submitted
#[derive(Serialize, ToSchema)]
pub struct SearchView {
    pub title: Option<String>,
    pub books: Option<Vec<Book>>,
}

/// List books with pagination and ordering
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Current page of books", body = Vec<Book>),
        (status = 400, description = "Invalid page parameters")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list_books(&query).await?;
    Ok(Json(books))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookForm,
    responses(
        (status = 303, description = "Created, redirect to /books"),
        (status = 200, description = "Invalid input, form shown again", body = BookFormView)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(form): Json<BookForm>,
) -> AppResult<Response> {
    let result = state.services.books.create_book(form.clone()).await;

    form_outcome(result, "/books", |errors| {
        Json(BookFormView {
            errors,
            ..BookFormView::new("books/new", None, Some(form))
        })
        .into_response()
    })
}

/// Empty book creation form
#[utoipa::path(
    get,
    path = "/books/new",
    tag = "books",
    responses(
        (status = 200, description = "Creation form", body = BookFormView)
    )
)]
pub async fn new_book() -> Json<BookFormView> {
    Json(BookFormView::new("books/new", None, Some(BookForm::default())))
}

/// Edit form pre-filled with the book's current values
#[utoipa::path(
    get,
    path = "/books/{id}/edit",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Edit form, empty if the book does not exist", body = BookFormView)
    )
)]
pub async fn edit_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookFormView>> {
    let book = state.services.books.get_book(id).await?;

    Ok(Json(BookFormView::new(
        "books/edit",
        Some(id),
        book.as_ref().map(BookForm::from),
    )))
}

/// Book details with its holder or the people it can be lent to
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails)
    )
)]
pub async fn show_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let details = state.services.books.get_book_details(id).await?;
    Ok(Json(details))
}

/// Update a book's title, author and year
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 303, description = "Updated, redirect to /books"),
        (status = 200, description = "Invalid input, form shown again", body = BookFormView)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<BookForm>,
) -> AppResult<Response> {
    let result = state.services.books.update_book(id, form.clone()).await;

    form_outcome(result, "/books", |errors| {
        Json(BookFormView {
            errors,
            ..BookFormView::new("books/edit", Some(id), Some(form))
        })
        .into_response()
    })
}

/// Lend a book to a person
#[utoipa::path(
    patch,
    path = "/books/{id}/assign",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = AssignBook,
    responses(
        (status = 303, description = "Redirect to /books")
    )
)]
pub async fn assign_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AssignBook>,
) -> AppResult<Redirect> {
    state.services.books.assign(id, request.person_id).await?;
    Ok(Redirect::to("/books"))
}

/// Return a lent book to the shelf
#[utoipa::path(
    patch,
    path = "/books/{id}/release",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Redirect to /books"),
        (status = 422, description = "Book is not lent to anyone")
    )
)]
pub async fn release_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    state.services.books.release(id).await?;
    Ok(Redirect::to("/books"))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Redirect to /books")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Redirect> {
    state.services.books.delete_book(id).await?;
    Ok(Redirect::to("/books"))
}

/// Empty search page
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    responses(
        (status = 200, description = "Search page", body = SearchView)
    )
)]
pub async fn search_page() -> Json<SearchView> {
    Json(SearchView {
        title: None,
        books: None,
    })
}

/// Search books by the beginning of their title
#[utoipa::path(
    post,
    path = "/books/search",
    tag = "books",
    request_body = BookSearch,
    responses(
        (status = 200, description = "Search page with results", body = SearchView)
    )
)]
pub async fn search_results(
    State(state): State<AppState>,
    Json(search): Json<BookSearch>,
) -> AppResult<Json<SearchView>> {
    let books = state
        .services
        .books
        .search_by_title(search.title.as_deref())
        .await?;

    Ok(Json(SearchView {
        title: search.title,
        books,
    }))
}
