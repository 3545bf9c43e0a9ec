//! Snapshot export/import API endpoints

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{ServerError, server::ServerState};
use engine::{SNAPSHOT_VERSION, Snapshot};

pub async fn export(State(state): State<ServerState>) -> Result<Json<Snapshot>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.export_snapshot(Utc::now())))
}

pub async fn import(
    State(state): State<ServerState>,
    Json(snapshot): Json<Snapshot>,
) -> Result<StatusCode, ServerError> {
    if !snapshot.version_matches() {
        tracing::warn!(
            "importing a version {} snapshot into a version {} store",
            snapshot.version,
            SNAPSHOT_VERSION
        );
    }

    let mut engine = state.engine.write().await;
    engine.import_snapshot(snapshot)?;
    Ok(StatusCode::NO_CONTENT)
}
