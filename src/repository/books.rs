//! Books repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use super::BookStore;
use crate::{
    error::AppResult,
    models::{book::BookRow, Book, BookForm, PageWindow, Person},
};

/// Book columns joined with the holder, shared by every book read
const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.year, b.taken_at,
           p.id AS holder_id, p.name AS holder_name, p.birth_year AS holder_birth_year
    FROM book b
    LEFT JOIN person p ON p.id = b.person_id
"#;

/// Escape LIKE metacharacters so user input only ever matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn order_clause(sort_by_year: bool) -> &'static str {
    if sort_by_year {
        "b.year, b.id"
    } else {
        "b.id"
    }
}

/// The held set of a person, oldest loan first.
///
/// Takes a connection so callers can read it inside their own transaction.
pub(crate) async fn list_by_holder(
    conn: &mut PgConnection,
    person_id: i32,
) -> AppResult<Vec<Book>> {
    let rows = sqlx::query_as::<_, BookRow>(&format!(
        "{} WHERE b.person_id = $1 ORDER BY b.taken_at, b.id",
        BOOK_SELECT
    ))
    .bind(person_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(Book::from).collect())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    /// Get book by ID
    async fn get(&self, id: i32) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Book::from))
    }

    async fn list(&self, window: PageWindow, sort_by_year: bool) -> AppResult<Vec<Book>> {
        let sql = format!(
            "{} ORDER BY {} LIMIT $1 OFFSET $2",
            BOOK_SELECT,
            order_clause(sort_by_year)
        );

        // LIMIT NULL is "no limit" in PostgreSQL
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_title_prefix(&self, prefix: &str) -> AppResult<Vec<Book>> {
        let sql = format!(r"{} WHERE b.title LIKE $1 ESCAPE '\' ORDER BY b.id", BOOK_SELECT);

        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(format!("{}%", escape_like(prefix)))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn create(&self, form: &BookForm) -> AppResult<Book> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO book (title, author, year) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&form.title)
        .bind(&form.author)
        .bind(form.year)
        .fetch_one(&self.pool)
        .await?;

        Ok(Book {
            id,
            title: form.title.clone(),
            author: form.author.clone(),
            year: form.year,
            holder: None,
            taken_at: None,
            expired: false,
        })
    }

    async fn update_details(&self, id: i32, form: &BookForm) -> AppResult<Option<Book>> {
        let updated = sqlx::query_scalar::<_, i32>(
            "UPDATE book SET title = $2, author = $3, year = $4 WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(&form.title)
        .bind(&form.author)
        .bind(form.year)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    async fn assign(
        &self,
        book_id: i32,
        person_id: i32,
        taken_at: DateTime<Utc>,
    ) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        // Hold the person row so it cannot be deleted under the new loan
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, name, birth_year FROM person WHERE id = $1 FOR SHARE",
        )
        .bind(person_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(person) = person else {
            return Ok(None);
        };

        let updated = sqlx::query_as::<_, (i32, String, String, i32)>(
            r#"
            UPDATE book SET person_id = $2, taken_at = $3
            WHERE id = $1
            RETURNING id, title, author, year
            "#,
        )
        .bind(book_id)
        .bind(person.id)
        .bind(taken_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((id, title, author, year)) = updated else {
            return Ok(None);
        };

        tx.commit().await?;

        Ok(Some(Book {
            id,
            title,
            author,
            year,
            holder: Some(person),
            taken_at: Some(taken_at),
            expired: false,
        }))
    }

    async fn release(&self, book_id: i32) -> AppResult<Option<Book>> {
        let released = sqlx::query_as::<_, (i32, String, String, i32)>(
            r#"
            UPDATE book SET person_id = NULL, taken_at = NULL
            WHERE id = $1 AND person_id IS NOT NULL
            RETURNING id, title, author, year
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(released.map(|(id, title, author, year)| Book {
            id,
            title,
            author,
            year,
            holder: None,
            taken_at: None,
            expired: false,
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
