use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use service::records::User;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

fn decode_body(body: &Bytes) -> Result<User, JsonApiError> {
    serde_json::from_slice(body).map_err(|e| {
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "error while decoding request body", Some(e.to_string()))
    })
}

/// GET /:collection
pub async fn list_all(
    State(state): State<ServerState>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<User>>, JsonApiError> {
    state
        .users
        .list(&collection)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service("unable to read the collection", e))
}

/// GET /:collection/:resource
pub async fn get_one(
    State(state): State<ServerState>,
    Path((collection, resource)): Path<(String, String)>,
) -> Result<Json<User>, JsonApiError> {
    state
        .users
        .get(&collection, &resource)
        .await
        .map(Json)
        .map_err(|e| JsonApiError::from_service("unable to read the record", e))
}

/// POST /:collection
pub async fn create_one(
    State(state): State<ServerState>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, JsonApiError> {
    let user = decode_body(&body)?;
    let name = state
        .users
        .create(&collection, user)
        .await
        .map_err(|e| JsonApiError::from_service("error while writing the record", e))?;
    Ok(Json(json!({"status": "created", "resource_name": name})))
}

/// PUT /:collection/:resource
pub async fn update_one(
    State(state): State<ServerState>,
    Path((collection, resource)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, JsonApiError> {
    let patch = decode_body(&body)?;
    let name = state
        .users
        .update(&collection, &resource, patch)
        .await
        .map_err(|e| JsonApiError::from_service("unable to update the record", e))?;
    Ok(Json(json!({"status": "updated", "resource_name": name})))
}

/// DELETE /:collection
pub async fn delete_all(
    State(state): State<ServerState>,
    Path(collection): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    state
        .users
        .delete_all(&collection)
        .await
        .map_err(|e| JsonApiError::from_service("unable to delete the records", e))?;
    Ok(Json(json!({"status": "deleted", "collection_name": collection})))
}

/// DELETE /:collection/:resource
pub async fn delete_one(
    State(state): State<ServerState>,
    Path((collection, resource)): Path<(String, String)>,
) -> Result<Json<Value>, JsonApiError> {
    state
        .users
        .delete(&collection, &resource)
        .await
        .map_err(|e| JsonApiError::from_service("unable to delete the record", e))?;
    Ok(Json(json!({"status": "deleted", "resource_name": resource})))
}
