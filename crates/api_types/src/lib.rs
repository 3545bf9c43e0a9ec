use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

pub mod movement {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MovementKind {
        Consumption,
        CrusherRefill,
        SiteRefill,
    }

    /// Request body for recording a movement.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementNew {
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub kind: MovementKind,
        /// Volume in hundredths of a liter. The sign is derived from the
        /// kind server-side; clients may send the magnitude.
        pub liters: i64,
        pub asset_id: Option<String>,
        /// Target tank; refills default to their kind's tank when absent.
        pub tank_id: Option<String>,
        /// Odometer in hundredths of a kilometer.
        pub odometer: Option<i64>,
        /// Hour meter in hundredths of an hour.
        pub hours: Option<i64>,
        pub operator: Option<String>,
        pub note: Option<String>,
        /// Id of the user recording the event.
        pub recorded_by: Option<String>,
    }

    /// Request body for editing a movement. Same shape as [`MovementNew`]
    /// minus the recorder: the original `entered_by` stamp survives edits.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementUpdate {
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub kind: MovementKind,
        pub liters: i64,
        pub asset_id: Option<String>,
        pub tank_id: Option<String>,
        pub odometer: Option<i64>,
        pub hours: Option<i64>,
        pub operator: Option<String>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementCreated {
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementView {
        pub id: String,
        pub occurred_at: DateTime<Utc>,
        pub kind: MovementKind,
        /// Signed volume in hundredths of a liter: negative for
        /// consumptions, positive for refills.
        pub liters: i64,
        pub asset_id: Option<String>,
        pub tank_id: Option<String>,
        pub odometer: Option<i64>,
        pub hours: Option<i64>,
        pub operator: Option<String>,
        pub entered_by: Option<String>,
        pub note: Option<String>,
        /// Point-in-time rating; absent for refills and orphaned rows.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub performance: Option<super::report::RowPerformanceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementListResponse {
        pub movements: Vec<MovementView>,
    }
}

pub mod asset {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AssetKind {
        Vehicle,
        Equipment,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MeterMode {
        Distance,
        Hours,
    }

    /// Request body for registering an asset.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetNew {
        pub kind: AssetKind,
        /// Plate or prefix shown on reports.
        pub label: String,
        pub model: Option<String>,
        pub meter: MeterMode,
        /// Meter value at registration, in hundredths of the meter's unit.
        pub initial_reading: i64,
        pub recorded_by: Option<String>,
    }

    /// Request body for editing an asset. The derived current reading is
    /// not editable and has no field here.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetUpdate {
        pub kind: AssetKind,
        pub label: String,
        pub model: Option<String>,
        pub meter: MeterMode,
        pub initial_reading: i64,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetCreated {
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetView {
        pub id: String,
        pub kind: AssetKind,
        pub label: String,
        pub model: String,
        pub meter: MeterMode,
        pub initial_reading: i64,
        /// Latest consumption reading, maintained by the server.
        pub current_reading: i64,
        pub active: bool,
        pub created_by: Option<String>,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        Admin,
        Operator,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub login: String,
        pub password: String,
        pub role: Role,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreated {
        pub id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub login: String,
        pub password: String,
        pub role: Role,
        pub name: String,
    }
}

pub mod report {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AnomalyKind {
        ReadingRegression,
        UsageWithoutVolume,
    }

    /// Efficiency figure or the reason there is none.
    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "status", rename_all = "snake_case")]
    pub enum EfficiencyView {
        /// Kilometers per liter; higher is better.
        DistancePerLiter { value: f64 },
        /// Liters per hour; lower is better.
        LitersPerHour { value: f64 },
        NotAvailable,
        Anomaly { kind: AnomalyKind },
    }

    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    pub struct WindowUsageView {
        /// Meter progress over the window, hundredths of the meter's unit.
        pub usage_delta: i64,
        /// Fuel consumed inside the window, hundredths of a liter.
        pub total_volume: i64,
        pub efficiency: EfficiencyView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetReportView {
        pub asset_id: String,
        pub label: String,
        pub kind: super::asset::AssetKind,
        pub meter: super::asset::MeterMode,
        pub active: bool,
        pub current_reading: i64,
        pub all_time: WindowUsageView,
        pub month_to_date: WindowUsageView,
        pub year_to_date: WindowUsageView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TankStatusView {
        pub id: String,
        pub name: String,
        /// Hundredths of a liter. May exceed the capacity or go negative;
        /// the ledger is reported as-is.
        pub balance: i64,
        pub capacity: i64,
        pub free_space: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TotalsView {
        pub assets: usize,
        pub movements: usize,
        /// Total fuel ever consumed, hundredths of a liter.
        pub total_consumed: i64,
    }

    /// Query string of the fleet report endpoint.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ReportQuery {
        /// IANA name overriding the configured report timezone.
        pub timezone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FleetReport {
        pub generated_at: DateTime<Utc>,
        pub assets: Vec<AssetReportView>,
        pub tanks: Vec<TankStatusView>,
        pub totals: TotalsView,
    }

    /// Rating of a single consumption row against its predecessor.
    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RowPerformanceView {
        pub previous_reading: i64,
        pub reading: i64,
        /// Magnitude of the row's volume, hundredths of a liter.
        pub volume: i64,
        pub efficiency: EfficiencyView,
    }
}

pub mod data {
    use super::*;

    /// Everything the dashboard needs in one call.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DataResponse {
        pub assets: Vec<super::asset::AssetView>,
        pub movements: Vec<super::movement::MovementView>,
        pub users: Vec<super::user::UserView>,
        pub tanks: Vec<super::report::TankStatusView>,
    }
}
