use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{ServerError, server::ServerState};

/// Liveness plus a store round-trip.
pub async fn health(State(state): State<ServerState>) -> Result<Json<Value>, ServerError> {
    state.engine.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
