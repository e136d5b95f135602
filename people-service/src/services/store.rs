use crate::models::{Person, PersonFields};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

/// Persistence operations over the people collection.
///
/// Every write is last-writer-wins; there are no transactions and no version
/// checks. "Not found" on delete/update is `Ok(None)`, not an error.
#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Person>, AppError>;

    async fn create(&self, fields: PersonFields) -> Result<Person, AppError>;

    /// Remove the record and return its prior state.
    async fn delete_by_id(&self, id: &str) -> Result<Option<Person>, AppError>;

    /// Apply a partial field set and return the post-update record.
    async fn update_by_id(&self, id: &str, fields: PersonFields)
        -> Result<Option<Person>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    /// Release the underlying connection. Called once at shutdown.
    async fn close(&self) {}
}

/// Parse a path identifier, failing the way the store does for a bad cast.
pub fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|e| {
        AppError::Query(anyhow::anyhow!(
            "Cast to ObjectId failed for value \"{}\" at path \"_id\": {}",
            id,
            e
        ))
    })
}
