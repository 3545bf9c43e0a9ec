//! Consumption and performance reporting.
//!
//! Everything here is a pure function of a ledger snapshot: no cached state,
//! no mutation. Reports are computed over half-open time windows using
//! *boundary readings* — the latest consumption reading strictly before a
//! boundary instant, or the registration baseline when there is none — so an
//! edit or delete in the middle of a period is reflected exactly on the next
//! computation, with no running totals to drift.
//!
//! Data problems never abort a report. A reading that went backwards or fuel
//! usage with no recorded volume surfaces as an [`Anomaly`] status on the
//! affected figure, and the rest of the report stands.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{
    Liters, Reading,
    assets::{Asset, AssetKind, MeterMode},
    movements::Movement,
};

/// Half-open reporting window `[start, end)`.
///
/// `None` on either side means unbounded. The stock windows leave the end
/// open, so entries dated in the future still count toward the current
/// period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsageWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl UsageWindow {
    pub fn all_time() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// From midnight on the 1st of the current month, in `tz`.
    pub fn month_to_date(now: DateTime<Utc>, tz: Tz) -> Self {
        let local = now.with_timezone(&tz);
        let first = NaiveDate::from_ymd_opt(local.year(), local.month(), 1)
            .unwrap_or_else(|| local.date_naive());
        Self {
            start: Some(local_midnight(tz, first)),
            end: None,
        }
    }

    /// From midnight on January 1st of the current year, in `tz`.
    pub fn year_to_date(now: DateTime<Utc>, tz: Tz) -> Self {
        let local = now.with_timezone(&tz);
        let first = NaiveDate::from_ymd_opt(local.year(), 1, 1)
            .unwrap_or_else(|| local.date_naive());
        Self {
            start: Some(local_midnight(tz, first)),
            end: None,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at < end)
    }
}

fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    // A DST jump can skip midnight entirely; treat it as UTC then.
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
        .with_timezone(&Utc)
}

/// Why an efficiency figure could not be computed cleanly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anomaly {
    /// The meter went backwards over the period.
    ReadingRegression,
    /// The meter advanced but no fuel volume was recorded.
    UsageWithoutVolume,
}

/// Efficiency of an asset over a window, or the reason there is none.
///
/// Anomalies are statuses, not errors: a report always completes, flagging
/// the rows or windows that need a second look.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Efficiency {
    /// Distance mode, kilometers per liter. Higher is better.
    DistancePerLiter(f64),
    /// Hours mode, liters per hour. Lower is better.
    LitersPerHour(f64),
    /// Nothing to rate: no usage and/or no fuel in the window.
    NotAvailable,
    Anomaly(Anomaly),
}

impl Efficiency {
    /// Rates a usage delta against a (non-negative) total volume.
    ///
    /// A negative delta is a [`ReadingRegression`], never a negative rate; a
    /// positive delta with zero volume is [`UsageWithoutVolume`]; zero
    /// delta or zero volume is plain [`NotAvailable`].
    ///
    /// [`ReadingRegression`]: Anomaly::ReadingRegression
    /// [`UsageWithoutVolume`]: Anomaly::UsageWithoutVolume
    /// [`NotAvailable`]: Efficiency::NotAvailable
    pub fn compute(mode: MeterMode, usage_delta: Reading, total_volume: Liters) -> Self {
        if usage_delta.is_negative() {
            return Self::Anomaly(Anomaly::ReadingRegression);
        }
        if total_volume.is_zero() && usage_delta.is_positive() {
            return Self::Anomaly(Anomaly::UsageWithoutVolume);
        }
        if total_volume.is_zero() || usage_delta.is_zero() {
            return Self::NotAvailable;
        }

        match mode {
            MeterMode::Distance => {
                Self::DistancePerLiter(usage_delta.as_f64() / total_volume.as_f64())
            }
            MeterMode::Hours => Self::LitersPerHour(total_volume.as_f64() / usage_delta.as_f64()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::DistancePerLiter(_) | Self::LitersPerHour(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::DistancePerLiter(v) | Self::LitersPerHour(v) => Some(*v),
            Self::NotAvailable | Self::Anomaly(_) => None,
        }
    }
}

/// Usage figures for one asset over one window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowUsage {
    /// Boundary reading at the end minus boundary reading at the start.
    /// Negative when the meter regressed.
    pub usage_delta: Reading,
    /// Sum of absolute consumption volumes inside the window.
    pub total_volume: Liters,
    pub efficiency: Efficiency,
}

/// Boundary reading for `asset` at `cutoff`: the reading of its latest
/// consumption strictly before that instant, or the initial reading when
/// none exists. `None` means "no cutoff" and yields the latest reading
/// overall.
pub fn reading_before(
    asset: &Asset,
    movements: &[Movement],
    cutoff: Option<DateTime<Utc>>,
) -> Reading {
    movements
        .iter()
        .filter(|m| m.is_consumption_of(&asset.id))
        .filter(|m| cutoff.is_none_or(|c| m.occurred_at < c))
        .max_by_key(|m| m.occurred_at)
        .map(|m| m.reading_for(asset.meter).unwrap_or_default())
        .unwrap_or(asset.initial_reading)
}

/// Computes the usage figures for one asset over one window.
pub fn window_usage(asset: &Asset, movements: &[Movement], window: &UsageWindow) -> WindowUsage {
    let start_reading = match window.start {
        Some(start) => reading_before(asset, movements, Some(start)),
        None => asset.initial_reading,
    };
    let end_reading = reading_before(asset, movements, window.end);

    let usage_delta = end_reading - start_reading;
    let total_volume = movements
        .iter()
        .filter(|m| m.is_consumption_of(&asset.id))
        .filter(|m| window.contains(m.occurred_at))
        .map(|m| m.signed_liters().abs())
        .sum();

    WindowUsage {
        usage_delta,
        total_volume,
        efficiency: Efficiency::compute(asset.meter, usage_delta, total_volume),
    }
}

/// Per-asset entry of the fleet report.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetSummary {
    pub asset_id: String,
    pub label: String,
    pub kind: AssetKind,
    pub meter: MeterMode,
    pub active: bool,
    pub current_reading: Reading,
    pub all_time: WindowUsage,
    pub month_to_date: WindowUsage,
    pub year_to_date: WindowUsage,
}

pub fn asset_summary(
    asset: &Asset,
    movements: &[Movement],
    now: DateTime<Utc>,
    tz: Tz,
) -> AssetSummary {
    AssetSummary {
        asset_id: asset.id.clone(),
        label: asset.label.clone(),
        kind: asset.kind,
        meter: asset.meter,
        active: asset.active,
        current_reading: crate::readings::current_reading(asset, movements),
        all_time: window_usage(asset, movements, &UsageWindow::all_time()),
        month_to_date: window_usage(asset, movements, &UsageWindow::month_to_date(now, tz)),
        year_to_date: window_usage(asset, movements, &UsageWindow::year_to_date(now, tz)),
    }
}

pub fn fleet_summary(
    assets: &[Asset],
    movements: &[Movement],
    now: DateTime<Utc>,
    tz: Tz,
) -> Vec<AssetSummary> {
    assets
        .iter()
        .map(|asset| asset_summary(asset, movements, now, tz))
        .collect()
}

/// Headline counters for the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FleetTotals {
    pub assets: usize,
    pub movements: usize,
    pub total_consumed: Liters,
}

pub fn fleet_totals(assets: &[Asset], movements: &[Movement]) -> FleetTotals {
    let total_consumed = movements
        .iter()
        .filter(|m| m.kind.is_consumption())
        .map(|m| m.signed_liters().abs())
        .sum();

    FleetTotals {
        assets: assets.len(),
        movements: movements.len(),
        total_consumed,
    }
}

/// Point-in-time efficiency of a single consumption row, rated against the
/// immediately preceding consumption of the same asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowPerformance {
    /// Reading of the preceding consumption, or the initial reading for the
    /// asset's first fill-up.
    pub previous_reading: Reading,
    pub reading: Reading,
    /// Magnitude of the row's volume.
    pub volume: Liters,
    pub efficiency: Efficiency,
}

/// Rates one ledger row for the audit listing.
///
/// Returns `None` for refills and for consumptions whose asset is unknown —
/// orphaned rows stay in the ledger but cannot be rated.
pub fn movement_performance(
    assets: &[Asset],
    movements: &[Movement],
    movement: &Movement,
) -> Option<RowPerformance> {
    if !movement.kind.is_consumption() {
        return None;
    }
    let asset_id = movement.asset_id.as_deref()?;
    let asset = assets.iter().find(|a| a.id == asset_id)?;

    // Strictly earlier: a row never rates against itself, and same-instant
    // siblings are skipped rather than ordered arbitrarily.
    let previous_reading = movements
        .iter()
        .filter(|m| m.is_consumption_of(asset_id))
        .filter(|m| m.occurred_at < movement.occurred_at)
        .max_by_key(|m| m.occurred_at)
        .map(|m| m.reading_for(asset.meter).unwrap_or_default())
        .unwrap_or(asset.initial_reading);

    let reading = movement.reading_for(asset.meter).unwrap_or_default();
    let volume = movement.signed_liters().abs();

    Some(RowPerformance {
        previous_reading,
        reading,
        volume,
        efficiency: Efficiency::compute(asset.meter, reading - previous_reading, volume),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::movements::MovementKind;

    fn vehicle(initial: i64) -> Asset {
        let mut asset = Asset::new(
            AssetKind::Vehicle,
            "ABC-1234",
            "F4000",
            MeterMode::Distance,
            Reading::new(initial),
            None,
        )
        .unwrap();
        asset.id = "asset-1".to_string();
        asset
    }

    fn excavator(initial: i64) -> Asset {
        let mut asset = Asset::new(
            AssetKind::Equipment,
            "EX-01",
            "PC200",
            MeterMode::Hours,
            Reading::new(initial),
            None,
        )
        .unwrap();
        asset.id = "asset-1".to_string();
        asset
    }

    fn consumption(at: DateTime<Utc>, liters: i64, reading: Option<i64>) -> Movement {
        consumption_hours(at, liters, reading, None)
    }

    fn consumption_hours(
        at: DateTime<Utc>,
        liters: i64,
        odometer: Option<i64>,
        hours: Option<i64>,
    ) -> Movement {
        Movement {
            id: format!("m-{at}-{liters}"),
            occurred_at: at,
            kind: MovementKind::Consumption,
            liters: Liters::new(liters),
            asset_id: Some("asset-1".to_string()),
            tank_id: Some("crusher".to_string()),
            odometer: odometer.map(Reading::new),
            hours: hours.map(Reading::new),
            operator: None,
            entered_by: None,
            note: None,
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 10, h, 0, 0).unwrap()
    }

    #[test]
    fn all_time_distance_scenario() {
        let asset = vehicle(1_000_000);
        let movements = vec![
            consumption(at(8), -2_000, Some(1_010_000)),
            consumption(at(12), -3_000, Some(1_025_000)),
        ];

        let usage = window_usage(&asset, &movements, &UsageWindow::all_time());
        assert_eq!(usage.usage_delta, Reading::new(25_000));
        assert_eq!(usage.total_volume, Liters::new(5_000));
        assert_eq!(usage.efficiency, Efficiency::DistancePerLiter(5.0));
    }

    #[test]
    fn all_time_duration_scenario() {
        let asset = excavator(10_000);
        let movements = vec![consumption_hours(at(8), -1_000, None, Some(10_500))];

        let usage = window_usage(&asset, &movements, &UsageWindow::all_time());
        assert_eq!(usage.usage_delta, Reading::new(500));
        assert_eq!(usage.total_volume, Liters::new(1_000));
        assert_eq!(usage.efficiency, Efficiency::LitersPerHour(2.0));
    }

    #[test]
    fn efficiency_rules_cover_every_degenerate_case() {
        for mode in [MeterMode::Distance, MeterMode::Hours] {
            // No usage.
            assert_eq!(
                Efficiency::compute(mode, Reading::ZERO, Liters::new(5_000)),
                Efficiency::NotAvailable
            );
            // Nothing at all.
            assert_eq!(
                Efficiency::compute(mode, Reading::ZERO, Liters::ZERO),
                Efficiency::NotAvailable
            );
            // Meter went backwards.
            assert_eq!(
                Efficiency::compute(mode, Reading::new(-100), Liters::new(5_000)),
                Efficiency::Anomaly(Anomaly::ReadingRegression)
            );
            assert_eq!(
                Efficiency::compute(mode, Reading::new(-100), Liters::ZERO),
                Efficiency::Anomaly(Anomaly::ReadingRegression)
            );
            // Usage with no recorded fuel.
            assert_eq!(
                Efficiency::compute(mode, Reading::new(100), Liters::ZERO),
                Efficiency::Anomaly(Anomaly::UsageWithoutVolume)
            );
        }
    }

    #[test]
    fn not_available_figures_carry_no_value() {
        assert!(!Efficiency::NotAvailable.is_available());
        assert!(!Efficiency::Anomaly(Anomaly::ReadingRegression).is_available());
        assert_eq!(Efficiency::NotAvailable.value(), None);
        assert_eq!(Efficiency::DistancePerLiter(5.0).value(), Some(5.0));
    }

    #[test]
    fn month_boundary_uses_the_last_reading_before_the_window() {
        let asset = vehicle(1_000_000);
        let july = Utc.with_ymd_and_hms(2026, 7, 20, 10, 0, 0).unwrap();
        let august = Utc.with_ymd_and_hms(2026, 8, 10, 10, 0, 0).unwrap();
        let movements = vec![
            consumption(july, -2_000, Some(1_010_000)),
            consumption(august, -3_000, Some(1_025_000)),
        ];

        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        let usage = window_usage(
            &asset,
            &movements,
            &UsageWindow::month_to_date(now, chrono_tz::UTC),
        );

        // Start boundary is July's 10100.00, not the initial 10000.00.
        assert_eq!(usage.usage_delta, Reading::new(15_000));
        assert_eq!(usage.total_volume, Liters::new(3_000));
        assert_eq!(usage.efficiency, Efficiency::DistancePerLiter(5.0));
    }

    #[test]
    fn quiet_month_reports_nothing_to_rate() {
        let asset = vehicle(1_000_000);
        let july = Utc.with_ymd_and_hms(2026, 7, 20, 10, 0, 0).unwrap();
        let movements = vec![consumption(july, -2_000, Some(1_010_000))];

        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        let usage = window_usage(
            &asset,
            &movements,
            &UsageWindow::month_to_date(now, chrono_tz::UTC),
        );

        assert_eq!(usage.usage_delta, Reading::ZERO);
        assert_eq!(usage.total_volume, Liters::ZERO);
        assert_eq!(usage.efficiency, Efficiency::NotAvailable);
    }

    #[test]
    fn open_ended_windows_count_future_dated_entries() {
        let asset = vehicle(1_000_000);
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        let tomorrow = now + Duration::days(1);
        let movements = vec![consumption(tomorrow, -2_000, Some(1_010_000))];

        let usage = window_usage(
            &asset,
            &movements,
            &UsageWindow::month_to_date(now, chrono_tz::UTC),
        );
        assert_eq!(usage.total_volume, Liters::new(2_000));
    }

    #[test]
    fn window_starts_follow_the_report_timezone() {
        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();

        let utc = UsageWindow::month_to_date(now, chrono_tz::UTC);
        assert_eq!(
            utc.start,
            Some(Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(utc.end, None);

        // Rome is UTC+2 in August; its midnight is 22:00 UTC the day before.
        let rome = UsageWindow::month_to_date(now, chrono_tz::Europe::Rome);
        assert_eq!(
            rome.start,
            Some(Utc.with_ymd_and_hms(2026, 7, 31, 22, 0, 0).unwrap())
        );

        let year = UsageWindow::year_to_date(now, chrono_tz::UTC);
        assert_eq!(
            year.start,
            Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn recomputing_a_window_is_idempotent() {
        let asset = vehicle(1_000_000);
        let movements = vec![consumption(at(8), -2_000, Some(1_010_000))];
        let window = UsageWindow::all_time();

        let first = window_usage(&asset, &movements, &window);
        let second = window_usage(&asset, &movements, &window);
        assert_eq!(first, second);
    }

    #[test]
    fn first_row_rates_against_the_initial_reading() {
        let asset = vehicle(1_000_000);
        let movements = vec![
            consumption(at(8), -2_000, Some(1_010_000)),
            consumption(at(12), -3_000, Some(1_025_000)),
        ];

        let first = movement_performance(
            std::slice::from_ref(&asset),
            &movements,
            &movements[0],
        )
        .unwrap();
        assert_eq!(first.previous_reading, Reading::new(1_000_000));
        assert_eq!(first.efficiency, Efficiency::DistancePerLiter(5.0));

        let second = movement_performance(
            std::slice::from_ref(&asset),
            &movements,
            &movements[1],
        )
        .unwrap();
        assert_eq!(second.previous_reading, Reading::new(1_010_000));
        assert_eq!(second.volume, Liters::new(3_000));
        assert_eq!(second.efficiency, Efficiency::DistancePerLiter(5.0));
    }

    #[test]
    fn row_regression_is_flagged_not_rated() {
        let asset = vehicle(1_000_000);
        let movements = vec![
            consumption(at(8), -2_000, Some(1_010_000)),
            consumption(at(12), -3_000, Some(1_005_000)),
        ];

        let row = movement_performance(
            std::slice::from_ref(&asset),
            &movements,
            &movements[1],
        )
        .unwrap();
        assert_eq!(
            row.efficiency,
            Efficiency::Anomaly(Anomaly::ReadingRegression)
        );
    }

    #[test]
    fn same_instant_siblings_are_not_each_others_previous() {
        let asset = vehicle(1_000_000);
        let movements = vec![
            consumption(at(8), -2_000, Some(1_010_000)),
            consumption(at(8), -3_000, Some(1_012_000)),
        ];

        let row = movement_performance(
            std::slice::from_ref(&asset),
            &movements,
            &movements[1],
        )
        .unwrap();
        // Rated against the initial reading, not the same-instant sibling.
        assert_eq!(row.previous_reading, Reading::new(1_000_000));
    }

    #[test]
    fn refills_and_orphans_are_not_rated() {
        let asset = vehicle(1_000_000);
        let mut refill = consumption(at(8), 50_000, None);
        refill.kind = MovementKind::CrusherRefill;
        let mut orphan = consumption(at(9), -2_000, Some(1_010_000));
        orphan.asset_id = Some("long-gone".to_string());
        let movements = vec![refill, orphan];

        assert!(
            movement_performance(std::slice::from_ref(&asset), &movements, &movements[0])
                .is_none()
        );
        assert!(
            movement_performance(std::slice::from_ref(&asset), &movements, &movements[1])
                .is_none()
        );
    }

    #[test]
    fn totals_count_consumption_magnitudes_only() {
        let asset = vehicle(1_000_000);
        let mut refill = consumption(at(8), 50_000, None);
        refill.kind = MovementKind::CrusherRefill;
        let movements = vec![
            refill,
            consumption(at(9), -2_000, Some(1_010_000)),
            consumption(at(10), -3_000, Some(1_025_000)),
        ];

        let totals = fleet_totals(std::slice::from_ref(&asset), &movements);
        assert_eq!(totals.assets, 1);
        assert_eq!(totals.movements, 3);
        assert_eq!(totals.total_consumed, Liters::new(5_000));
    }

    #[test]
    fn summary_reports_all_three_windows() {
        let asset = vehicle(1_000_000);
        let july = Utc.with_ymd_and_hms(2026, 7, 20, 10, 0, 0).unwrap();
        let august = Utc.with_ymd_and_hms(2026, 8, 10, 10, 0, 0).unwrap();
        let movements = vec![
            consumption(july, -2_000, Some(1_010_000)),
            consumption(august, -3_000, Some(1_025_000)),
        ];

        let now = Utc.with_ymd_and_hms(2026, 8, 21, 12, 0, 0).unwrap();
        let summary = asset_summary(&asset, &movements, now, chrono_tz::UTC);

        assert_eq!(summary.current_reading, Reading::new(1_025_000));
        assert_eq!(summary.all_time.usage_delta, Reading::new(25_000));
        assert_eq!(summary.month_to_date.usage_delta, Reading::new(15_000));
        assert_eq!(summary.year_to_date.usage_delta, Reading::new(25_000));
    }
}
