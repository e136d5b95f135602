use crate::middleware::JsonBody;
use crate::models::{PersonFields, PersonResponse};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

/// `GET /`
pub async fn root() -> &'static str {
    "hello world"
}

/// `GET /people`: every record, in store order.
#[tracing::instrument(skip(state))]
pub async fn list_people(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonResponse>>, AppError> {
    let people = state.store.list_all().await?;
    Ok(Json(people.into_iter().map(PersonResponse::from).collect()))
}

/// `POST /people`
#[tracing::instrument(skip(state, fields))]
pub async fn create_person(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<PersonFields>,
) -> Result<Json<PersonResponse>, AppError> {
    let person = state.store.create(fields).await?;
    Ok(Json(person.into()))
}

/// `DELETE /people/:id`: the removed record, or `null` when nothing matched.
///
/// A body is not used, but a malformed JSON body is still rejected.
#[tracing::instrument(skip(state, _body))]
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(_body): JsonBody<serde_json::Value>,
) -> Result<Json<Option<PersonResponse>>, AppError> {
    let removed = state.store.delete_by_id(&id).await?;
    Ok(Json(removed.map(PersonResponse::from)))
}

/// `PUT /people/:id`: the updated record, or `null` when nothing matched.
#[tracing::instrument(skip(state, fields))]
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(fields): JsonBody<PersonFields>,
) -> Result<Json<Option<PersonResponse>>, AppError> {
    let updated = state.store.update_by_id(&id, fields).await?;
    Ok(Json(updated.map(PersonResponse::from)))
}
