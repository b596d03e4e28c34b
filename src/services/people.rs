//! People (borrowers) service

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    config::LendingConfig,
    error::AppResult,
    models::{book::mark_expired, Book, Person, PersonDetails, PersonForm},
    repository::PersonStore,
    validation::validate_person,
};

#[derive(Clone)]
pub struct PeopleService {
    people: Arc<dyn PersonStore>,
    lending: LendingConfig,
}

impl PeopleService {
    pub fn new(people: Arc<dyn PersonStore>, lending: LendingConfig) -> Self {
        Self { people, lending }
    }

    fn loan_period(&self) -> Duration {
        Duration::days(self.lending.loan_period_days)
    }

    pub async fn list_people(&self) -> AppResult<Vec<Person>> {
        self.people.list().await
    }

    pub async fn get_person(&self, id: i32) -> AppResult<Option<Person>> {
        self.people.get(id).await
    }

    /// Person page with the held set and freshly computed expiry flags
    pub async fn get_person_details(&self, id: i32) -> AppResult<Option<PersonDetails>> {
        let Some((person, mut books)) = self.people.get_with_books(id).await? else {
            return Ok(None);
        };

        mark_expired(&mut books, Utc::now(), self.loan_period());
        Ok(Some(PersonDetails { person, books }))
    }

    /// Books held by a person, `None` if the person does not exist
    pub async fn get_held_books(&self, id: i32) -> AppResult<Option<Vec<Book>>> {
        let details = self.get_person_details(id).await?;
        Ok(details.map(|details| details.books))
    }

    pub async fn create_person(&self, form: PersonForm) -> AppResult<Person> {
        let namesake = self.people.find_by_name(&form.name).await?;
        validate_person(&form, self.lending.current_year()?, namesake.as_ref(), None)?;

        let person = self.people.create(&form).await?;
        tracing::info!("Registered person {} \"{}\"", person.id, person.name);
        Ok(person)
    }

    /// Replace a person's name and birth year. Their held books stay with them.
    pub async fn update_person(&self, id: i32, form: PersonForm) -> AppResult<Option<Person>> {
        let namesake = self.people.find_by_name(&form.name).await?;
        validate_person(&form, self.lending.current_year()?, namesake.as_ref(), Some(id))?;

        let updated = self.people.update(id, &form).await?;
        match &updated {
            Some(person) => tracing::info!("Updated person {}", person.id),
            None => tracing::warn!("Update skipped: person {} does not exist", id),
        }
        Ok(updated)
    }

    pub async fn delete_person(&self, id: i32) -> AppResult<bool> {
        let deleted = self.people.delete(id).await?;
        if deleted {
            tracing::info!("Deleted person {}", id);
        }
        Ok(deleted)
    }
}
