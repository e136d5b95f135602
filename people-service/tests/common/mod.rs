#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use people_service::config::{MongoConfig, PeopleConfig};
use people_service::services::{InMemoryPeople, PeopleDb};
use people_service::startup::{build_router, AppState, Application};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Router backed by a fresh in-memory store.
pub fn memory_app() -> Router {
    build_router(AppState::new(Arc::new(InMemoryPeople::new())))
}

/// Send one request through the router and decode the response body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    json_body: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match json_body {
        Some(raw) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(raw.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .expect("router is infallible");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };

    (status, value)
}

/// Service running on an ephemeral port against a live MongoDB.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: PeopleDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let uri = std::env::var("TEST_MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name = format!("people_test_{}", uuid::Uuid::new_v4().simple());

        let config = PeopleConfig {
            common: CoreConfig {
                port: 0,
                ..CoreConfig::default()
            },
            mongodb: MongoConfig {
                uri: uri.clone(),
                database: db_name.clone(),
            },
            otlp_endpoint: None,
        };

        let db = PeopleDb::connect(&uri, &db_name)
            .await
            .expect("Failed to connect to MongoDB");

        let app = Application::build_with_store(config, Arc::new(db.clone()))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
        }
    }

    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
