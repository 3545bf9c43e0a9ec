//! Reports and dashboard API endpoints

use api_types::{
    data::DataResponse,
    report::{
        AnomalyKind, AssetReportView, EfficiencyView, FleetReport, ReportQuery,
        RowPerformanceView, TankStatusView, TotalsView, WindowUsageView,
    },
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use chrono_tz::Tz;

use crate::{ServerError, assets, movements, server::ServerState, users};
use engine::{
    Anomaly, AssetSummary, Efficiency, FleetTotals, RowPerformance, TankStatus, WindowUsage,
};

pub(crate) fn map_efficiency(efficiency: Efficiency) -> EfficiencyView {
    match efficiency {
        Efficiency::DistancePerLiter(value) => EfficiencyView::DistancePerLiter { value },
        Efficiency::LitersPerHour(value) => EfficiencyView::LitersPerHour { value },
        Efficiency::NotAvailable => EfficiencyView::NotAvailable,
        Efficiency::Anomaly(Anomaly::ReadingRegression) => EfficiencyView::Anomaly {
            kind: AnomalyKind::ReadingRegression,
        },
        Efficiency::Anomaly(Anomaly::UsageWithoutVolume) => EfficiencyView::Anomaly {
            kind: AnomalyKind::UsageWithoutVolume,
        },
    }
}

pub(crate) fn map_row_performance(row: RowPerformance) -> RowPerformanceView {
    RowPerformanceView {
        previous_reading: row.previous_reading.hundredths(),
        reading: row.reading.hundredths(),
        volume: row.volume.centiliters(),
        efficiency: map_efficiency(row.efficiency),
    }
}

fn map_window(window: WindowUsage) -> WindowUsageView {
    WindowUsageView {
        usage_delta: window.usage_delta.hundredths(),
        total_volume: window.total_volume.centiliters(),
        efficiency: map_efficiency(window.efficiency),
    }
}

fn map_summary(summary: AssetSummary) -> AssetReportView {
    AssetReportView {
        asset_id: summary.asset_id,
        label: summary.label,
        kind: assets::map_kind(summary.kind),
        meter: assets::map_meter(summary.meter),
        active: summary.active,
        current_reading: summary.current_reading.hundredths(),
        all_time: map_window(summary.all_time),
        month_to_date: map_window(summary.month_to_date),
        year_to_date: map_window(summary.year_to_date),
    }
}

fn map_tank(status: TankStatus) -> TankStatusView {
    TankStatusView {
        id: status.id.as_str().to_string(),
        name: status.name,
        balance: status.balance.centiliters(),
        capacity: status.capacity.centiliters(),
        free_space: status.free_space.centiliters(),
    }
}

fn map_totals(totals: FleetTotals) -> TotalsView {
    TotalsView {
        assets: totals.assets,
        movements: totals.movements,
        total_consumed: totals.total_consumed.centiliters(),
    }
}

pub async fn get_data(State(state): State<ServerState>) -> Result<Json<DataResponse>, ServerError> {
    let engine = state.engine.read().await;

    Ok(Json(DataResponse {
        assets: engine.assets().iter().map(assets::map_asset).collect(),
        movements: engine
            .movements()
            .iter()
            .map(|movement| movements::map_movement(&engine, movement))
            .collect(),
        users: engine.users().iter().map(users::map_user).collect(),
        tanks: engine.tank_statuses().into_iter().map(map_tank).collect(),
    }))
}

pub async fn get_report(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<FleetReport>, ServerError> {
    let tz = match query.timezone {
        Some(raw) => raw
            .parse::<Tz>()
            .map_err(|_| ServerError::Generic(format!("unknown timezone: {raw}")))?,
        None => state.tz,
    };

    let engine = state.engine.read().await;
    let now = Utc::now();

    Ok(Json(FleetReport {
        generated_at: now,
        assets: engine
            .fleet_summary(now, tz)
            .into_iter()
            .map(map_summary)
            .collect(),
        tanks: engine.tank_statuses().into_iter().map(map_tank).collect(),
        totals: map_totals(engine.fleet_totals()),
    }))
}

pub async fn get_tanks(
    State(state): State<ServerState>,
) -> Result<Json<Vec<TankStatusView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(
        engine.tank_statuses().into_iter().map(map_tank).collect(),
    ))
}
