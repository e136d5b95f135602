use crate::models::{Person, PersonFields};
use crate::services::metrics::record_store_operation;
use crate::services::store::{parse_id, PersonStore};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    event::sdam::{SdamEventHandler, ServerHeartbeatFailedEvent, ServerHeartbeatSucceededEvent},
    options::{ClientOptions, FindOneAndUpdateOptions, ReturnDocument},
    Client as MongoClient, Collection, Database,
};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const PEOPLE_COLLECTION: &str = "people";

/// Logs connection lifecycle transitions from the driver's server heartbeats.
///
/// Only changes are logged. The first successful heartbeat for a server, and
/// any recovery after a failure, logs that the connection is open. The first
/// failed heartbeat after being up, or before ever connecting, logs an error.
#[derive(Default)]
pub struct ConnectionMonitor {
    servers: Mutex<HashMap<String, bool>>,
}

impl ConnectionMonitor {
    /// Record a heartbeat outcome; returns true when the server changed state.
    fn transition(&self, address: String, reachable: bool) -> bool {
        let Ok(mut servers) = self.servers.lock() else {
            return false;
        };
        servers.insert(address, reachable) != Some(reachable)
    }
}

impl SdamEventHandler for ConnectionMonitor {
    fn handle_server_heartbeat_succeeded_event(&self, event: ServerHeartbeatSucceededEvent) {
        let address = event.server_address.to_string();
        if self.transition(address.clone(), true) {
            tracing::info!(server = %address, "Connected to MongoDB");
        }
    }

    fn handle_server_heartbeat_failed_event(&self, event: ServerHeartbeatFailedEvent) {
        let address = event.server_address.to_string();
        if self.transition(address.clone(), false) {
            tracing::error!(server = %address, error = %event.failure, "MongoDB connection error");
        }
    }
}

#[derive(Clone)]
pub struct PeopleDb {
    client: MongoClient,
    db: Database,
}

impl PeopleDb {
    /// Build the client. The driver connects lazily, so this only fails for a
    /// connection string it cannot parse or resolve. Reachability is logged
    /// for the whole run by [`ConnectionMonitor`].
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Invalid MongoDB connection string: {}", e);
            AppError::ConfigError(anyhow::anyhow!("Invalid MongoDB connection string: {}", e))
        })?;
        options.sdam_event_handler = Some(Arc::new(ConnectionMonitor::default()));

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::ConfigError(anyhow::anyhow!("Failed to create MongoDB client: {}", e))
        })?;
        let db = client.database(database);
        Ok(Self { client, db })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn people(&self) -> Collection<Person> {
        self.db.collection(PEOPLE_COLLECTION)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PersonStore for PeopleDb {
    async fn list_all(&self) -> Result<Vec<Person>, AppError> {
        let result = async {
            let cursor = self.people().find(None, None).await?;
            let people: Vec<Person> = cursor.try_collect().await?;
            Ok::<_, AppError>(people)
        }
        .await;

        record_store_operation("list_all", result.is_ok());
        result.map_err(|e| {
            tracing::error!("Failed to list people: {}", e);
            e
        })
    }

    async fn create(&self, fields: PersonFields) -> Result<Person, AppError> {
        let person = Person::new(fields);

        let result = self.people().insert_one(&person, None).await;
        record_store_operation("create", result.is_ok());
        result.map_err(|e| {
            tracing::error!("Failed to insert person: {}", e);
            AppError::from(e)
        })?;

        tracing::info!(person_id = %person.id, "Person created");
        Ok(person)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Person>, AppError> {
        let oid = parse_id(id).map_err(|e| {
            record_store_operation("delete_by_id", false);
            e
        })?;

        let result = self
            .people()
            .find_one_and_delete(doc! { "_id": oid }, None)
            .await;
        record_store_operation("delete_by_id", result.is_ok());

        let removed = result.map_err(|e| {
            tracing::error!(person_id = %id, "Failed to delete person: {}", e);
            AppError::from(e)
        })?;

        if removed.is_some() {
            tracing::info!(person_id = %id, "Person deleted");
        }
        Ok(removed)
    }

    async fn update_by_id(
        &self,
        id: &str,
        fields: PersonFields,
    ) -> Result<Option<Person>, AppError> {
        let oid = parse_id(id).map_err(|e| {
            record_store_operation("update_by_id", false);
            e
        })?;
        let filter = doc! { "_id": oid };

        // An empty modifier is rejected by the server; nothing to change means
        // the current record is the post-update record.
        let result = match fields.to_update() {
            Some(update) => {
                let options = FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build();
                self.people()
                    .find_one_and_update(filter, update, options)
                    .await
            }
            None => self.people().find_one(filter, None).await,
        };
        record_store_operation("update_by_id", result.is_ok());

        result.map_err(|e| {
            tracing::error!(person_id = %id, "Failed to update person: {}", e);
            AppError::from(e)
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.ping().await.map_err(|e| {
            tracing::error!("MongoDB health check failed: {}", e);
            e
        })
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("Disconnected from MongoDB");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_reports_only_state_changes() {
        let monitor = ConnectionMonitor::default();
        let host = "localhost:27017".to_string();

        assert!(monitor.transition(host.clone(), true));
        assert!(!monitor.transition(host.clone(), true));
        assert!(monitor.transition(host.clone(), false));
        assert!(!monitor.transition(host.clone(), false));
        assert!(monitor.transition(host, true));
    }

    #[test]
    fn monitor_tracks_servers_independently() {
        let monitor = ConnectionMonitor::default();

        assert!(monitor.transition("a:27017".to_string(), false));
        assert!(monitor.transition("b:27017".to_string(), true));
        assert!(!monitor.transition("a:27017".to_string(), false));
    }
}
