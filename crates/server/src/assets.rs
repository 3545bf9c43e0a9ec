//! Assets API endpoints

use api_types::asset::{
    AssetCreated, AssetKind as ApiKind, AssetNew, AssetUpdate as ApiUpdate, AssetView,
    MeterMode as ApiMeter,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{Asset, AssetKind, AssetUpdate, MeterMode, Reading};

pub(crate) fn map_kind(kind: AssetKind) -> ApiKind {
    match kind {
        AssetKind::Vehicle => ApiKind::Vehicle,
        AssetKind::Equipment => ApiKind::Equipment,
    }
}

fn draft_kind(kind: ApiKind) -> AssetKind {
    match kind {
        ApiKind::Vehicle => AssetKind::Vehicle,
        ApiKind::Equipment => AssetKind::Equipment,
    }
}

pub(crate) fn map_meter(meter: MeterMode) -> ApiMeter {
    match meter {
        MeterMode::Distance => ApiMeter::Distance,
        MeterMode::Hours => ApiMeter::Hours,
    }
}

fn draft_meter(meter: ApiMeter) -> MeterMode {
    match meter {
        ApiMeter::Distance => MeterMode::Distance,
        ApiMeter::Hours => MeterMode::Hours,
    }
}

pub(crate) fn map_asset(asset: &Asset) -> AssetView {
    AssetView {
        id: asset.id.clone(),
        kind: map_kind(asset.kind),
        label: asset.label.clone(),
        model: asset.model.clone(),
        meter: map_meter(asset.meter),
        initial_reading: asset.initial_reading.hundredths(),
        current_reading: asset.current_reading.hundredths(),
        active: asset.active,
        created_by: asset.created_by.clone(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AssetNew>,
) -> Result<(StatusCode, Json<AssetCreated>), ServerError> {
    let mut engine = state.engine.write().await;
    let asset = engine.register_asset(
        draft_kind(payload.kind),
        &payload.label,
        payload.model.as_deref().unwrap_or_default(),
        draft_meter(payload.meter),
        Reading::new(payload.initial_reading),
        payload.recorded_by.as_deref(),
    )?;

    Ok((StatusCode::CREATED, Json(AssetCreated { id: asset.id })))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ApiUpdate>,
) -> Result<Json<AssetView>, ServerError> {
    let update = AssetUpdate {
        kind: draft_kind(payload.kind),
        label: payload.label,
        model: payload.model.unwrap_or_default(),
        meter: draft_meter(payload.meter),
        initial_reading: Reading::new(payload.initial_reading),
        active: payload.active,
    };

    let mut engine = state.engine.write().await;
    let asset = engine.update_asset(&id, &update)?;
    Ok(Json(map_asset(&asset)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let mut engine = state.engine.write().await;
    engine.delete_asset(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
