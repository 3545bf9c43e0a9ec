//! Movements API endpoints

use api_types::movement::{
    MovementCreated, MovementKind as ApiKind, MovementListResponse, MovementNew, MovementUpdate,
    MovementView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{ServerError, reports, server::ServerState};
use engine::{Engine, JsonStore, Liters, Movement, MovementDraft, Reading};

fn map_kind(kind: engine::MovementKind) -> ApiKind {
    match kind {
        engine::MovementKind::Consumption => ApiKind::Consumption,
        engine::MovementKind::CrusherRefill => ApiKind::CrusherRefill,
        engine::MovementKind::SiteRefill => ApiKind::SiteRefill,
    }
}

fn draft_kind(kind: ApiKind) -> engine::MovementKind {
    match kind {
        ApiKind::Consumption => engine::MovementKind::Consumption,
        ApiKind::CrusherRefill => engine::MovementKind::CrusherRefill,
        ApiKind::SiteRefill => engine::MovementKind::SiteRefill,
    }
}

pub(crate) fn map_movement(engine: &Engine<JsonStore>, movement: &Movement) -> MovementView {
    MovementView {
        id: movement.id.clone(),
        occurred_at: movement.occurred_at,
        kind: map_kind(movement.kind),
        liters: movement.signed_liters().centiliters(),
        asset_id: movement.asset_id.clone(),
        tank_id: movement.tank_id.clone(),
        odometer: movement.odometer.map(Reading::hundredths),
        hours: movement.hours.map(Reading::hundredths),
        operator: movement.operator.clone(),
        entered_by: movement.entered_by.clone(),
        note: movement.note.clone(),
        performance: engine
            .movement_performance(movement)
            .map(reports::map_row_performance),
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<MovementListResponse>, ServerError> {
    let engine = state.engine.read().await;

    let movements = engine
        .movements()
        .iter()
        .map(|movement| map_movement(&engine, movement))
        .collect();
    Ok(Json(MovementListResponse { movements }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MovementNew>,
) -> Result<(StatusCode, Json<MovementCreated>), ServerError> {
    let draft = MovementDraft {
        occurred_at: payload.occurred_at.with_timezone(&Utc),
        kind: draft_kind(payload.kind),
        liters: Liters::new(payload.liters),
        asset_id: payload.asset_id,
        tank_id: payload.tank_id,
        odometer: payload.odometer.map(Reading::new),
        hours: payload.hours.map(Reading::new),
        operator: payload.operator,
        note: payload.note,
    };

    let mut engine = state.engine.write().await;
    let movement = engine.commit_movement(draft, payload.recorded_by.as_deref())?;

    Ok((
        StatusCode::CREATED,
        Json(MovementCreated { id: movement.id }),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MovementUpdate>,
) -> Result<Json<MovementView>, ServerError> {
    let draft = MovementDraft {
        occurred_at: payload.occurred_at.with_timezone(&Utc),
        kind: draft_kind(payload.kind),
        liters: Liters::new(payload.liters),
        asset_id: payload.asset_id,
        tank_id: payload.tank_id,
        odometer: payload.odometer.map(Reading::new),
        hours: payload.hours.map(Reading::new),
        operator: payload.operator,
        note: payload.note,
    };

    let mut engine = state.engine.write().await;
    let movement = engine.update_movement(&id, draft)?;
    Ok(Json(map_movement(&engine, &movement)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_movement(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
