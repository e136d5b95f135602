use crate::models::{Person, PersonFields};
use crate::services::store::{parse_id, PersonStore};
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Mutex;

/// In-process store keeping records in insertion order.
///
/// Identifiers are parsed exactly like the MongoDB store, so malformed ids fail
/// the same way. Used to exercise the router without a database.
#[derive(Default)]
pub struct InMemoryPeople {
    people: Mutex<Vec<Person>>,
}

impl InMemoryPeople {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Person>>, AppError> {
        self.people
            .lock()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("People mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl PersonStore for InMemoryPeople {
    async fn list_all(&self) -> Result<Vec<Person>, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn create(&self, fields: PersonFields) -> Result<Person, AppError> {
        let person = Person::new(fields);
        self.lock()?.push(person.clone());
        Ok(person)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Person>, AppError> {
        let oid = parse_id(id)?;
        let mut people = self.lock()?;

        Ok(people
            .iter()
            .position(|p| p.id == oid)
            .map(|index| people.remove(index)))
    }

    async fn update_by_id(
        &self,
        id: &str,
        fields: PersonFields,
    ) -> Result<Option<Person>, AppError> {
        let oid = parse_id(id)?;
        let mut people = self.lock()?;

        Ok(people.iter_mut().find(|p| p.id == oid).map(|person| {
            person.apply(fields);
            person.clone()
        }))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
