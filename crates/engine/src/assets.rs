//! Fleet asset primitives.
//!
//! An [`Asset`] is a tracked vehicle or piece of equipment. Each asset meters
//! its usage on exactly one axis — kilometers for vehicles on the road, hours
//! for stationary equipment — declared once at registration and never mixed.
//!
//! `current_reading` is a denormalized cache of the latest consumption
//! reading (see [`crate::readings`]); it is recomputed after every ledger
//! mutation and must never be edited by hand.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Reading, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Vehicle,
    Equipment,
}

/// The axis an asset meters its usage on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterMode {
    /// Odometer, kilometers. Efficiency reads as distance per liter.
    Distance,
    /// Hour meter. Efficiency reads as liters per hour.
    Hours,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub kind: AssetKind,
    /// Plate or prefix shown on reports. Unique by convention, not enforced.
    pub label: String,
    #[serde(default)]
    pub model: String,
    pub meter: MeterMode,
    /// Meter value at registration, in the declared mode's unit.
    pub initial_reading: Reading,
    /// Cache of the latest consumption reading; recomputed, never hand-edited.
    pub current_reading: Reading,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub created_by: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Asset {
    pub fn new(
        kind: AssetKind,
        label: &str,
        model: &str,
        meter: MeterMode,
        initial_reading: Reading,
        created_by: Option<&str>,
    ) -> ResultEngine<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(EngineError::InvalidAsset(
                "label must not be blank".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            kind,
            label: label.to_string(),
            model: model.trim().to_string(),
            meter,
            initial_reading,
            current_reading: initial_reading,
            active: true,
            created_by: created_by.map(str::to_string),
        })
    }
}

/// User-editable fields of an asset; the derived cache and ownership stamp
/// are excluded so an edit can never smuggle them in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetUpdate {
    pub kind: AssetKind,
    pub label: String,
    #[serde(default)]
    pub model: String,
    pub meter: MeterMode,
    pub initial_reading: Reading,
    pub active: bool,
}

impl AssetUpdate {
    pub(crate) fn apply_to(&self, asset: &mut Asset) -> ResultEngine<()> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(EngineError::InvalidAsset(
                "label must not be blank".to_string(),
            ));
        }

        asset.kind = self.kind;
        asset.label = label.to_string();
        asset.model = self.model.trim().to_string();
        asset.meter = self.meter;
        asset.initial_reading = self.initial_reading;
        asset.active = self.active;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_starts_at_the_initial_reading() {
        let asset = Asset::new(
            AssetKind::Vehicle,
            "ABC-1234",
            "F4000",
            MeterMode::Distance,
            Reading::new(1_000_000),
            Some("admin-id"),
        )
        .unwrap();

        assert_eq!(asset.current_reading, asset.initial_reading);
        assert!(asset.active);
        assert_eq!(asset.created_by.as_deref(), Some("admin-id"));
    }

    #[test]
    fn new_rejects_blank_label() {
        let err = Asset::new(
            AssetKind::Equipment,
            "  ",
            "",
            MeterMode::Hours,
            Reading::ZERO,
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAsset("label must not be blank".to_string())
        );
    }

    #[test]
    fn update_cannot_touch_the_derived_cache() {
        let mut asset = Asset::new(
            AssetKind::Vehicle,
            "ABC-1234",
            "F4000",
            MeterMode::Distance,
            Reading::new(1_000_000),
            None,
        )
        .unwrap();
        asset.current_reading = Reading::new(1_020_000);

        let update = AssetUpdate {
            kind: AssetKind::Vehicle,
            label: "DEF-5678".to_string(),
            model: "F4000".to_string(),
            meter: MeterMode::Distance,
            initial_reading: Reading::new(1_000_000),
            active: false,
        };
        update.apply_to(&mut asset).unwrap();

        assert_eq!(asset.label, "DEF-5678");
        assert!(!asset.active);
        assert_eq!(asset.current_reading, Reading::new(1_020_000));
    }
}
