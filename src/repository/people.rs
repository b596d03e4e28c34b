//! People repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{books::list_by_holder, PersonStore};
use crate::{
    error::AppResult,
    models::{Book, Person, PersonForm},
};

#[derive(Clone)]
pub struct PeopleRepository {
    pool: Pool<Postgres>,
}

impl PeopleRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonStore for PeopleRepository {
    async fn get(&self, id: i32) -> AppResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, name, birth_year FROM person WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    async fn get_with_books(&self, id: i32) -> AppResult<Option<(Person, Vec<Book>)>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let person = sqlx::query_as::<_, Person>(
            "SELECT id, name, birth_year FROM person WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(person) = person else {
            return Ok(None);
        };

        let books = list_by_holder(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(Some((person, books)))
    }

    async fn list(&self) -> AppResult<Vec<Person>> {
        let people = sqlx::query_as::<_, Person>(
            "SELECT id, name, birth_year FROM person ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(people)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, name, birth_year FROM person WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    async fn create(&self, form: &PersonForm) -> AppResult<Person> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO person (name, birth_year)
            VALUES ($1, $2)
            RETURNING id, name, birth_year
            "#,
        )
        .bind(&form.name)
        .bind(form.birth_year)
        .fetch_one(&self.pool)
        .await?;

        Ok(person)
    }

    async fn update(&self, id: i32, form: &PersonForm) -> AppResult<Option<Person>> {
        // Held books reference the id, which never changes, so they follow along
        let person = sqlx::query_as::<_, Person>(
            r#"
            UPDATE person SET name = $2, birth_year = $3
            WHERE id = $1
            RETURNING id, name, birth_year
            "#,
        )
        .bind(id)
        .bind(&form.name)
        .bind(form.birth_year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let released = sqlx::query(
            "UPDATE book SET person_id = NULL, taken_at = NULL WHERE person_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM person WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if released.rows_affected() > 0 {
            tracing::debug!(
                "Released {} book(s) held by deleted person {}",
                released.rows_affected(),
                id
            );
        }

        Ok(deleted.rows_affected() > 0)
    }
}
