//! Movement primitives.
//!
//! A `Movement` is a single fuel event in the ledger: a refill into one of
//! the two tanks, or a consumption drawn from a tank into an asset. The
//! ledger is the source of truth; tank balances and asset readings are
//! derived from it and never updated independently.
//!
//! The stored volume is signed, but the sign is fully determined by the
//! kind. Readers must go through [`Movement::signed_liters`], which
//! re-derives the sign instead of trusting what was stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Liters, MeterMode, Reading, ResultEngine, tanks::TankId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Fuel drawn from a tank into an asset. Negative volume.
    Consumption,
    /// Delivery into the crusher tank. Positive volume.
    CrusherRefill,
    /// Delivery into the site tank. Positive volume.
    SiteRefill,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Consumption => "consumption",
            Self::CrusherRefill => "crusher_refill",
            Self::SiteRefill => "site_refill",
        }
    }

    pub fn is_consumption(self) -> bool {
        matches!(self, Self::Consumption)
    }

    /// The tank a refill kind targets when the record carries no explicit
    /// tank reference. Early ledgers tagged refills by kind only, so this
    /// doubles as the legacy fallback in [`Movement::tank`].
    pub fn implicit_tank(self) -> Option<TankId> {
        match self {
            Self::Consumption => None,
            Self::CrusherRefill => Some(TankId::Crusher),
            Self::SiteRefill => Some(TankId::Site),
        }
    }

    /// Applies the kind's sign to a volume, preserving the magnitude.
    pub fn signed(self, volume: Liters) -> Liters {
        match self {
            Self::Consumption => -volume.abs(),
            Self::CrusherRefill | Self::SiteRefill => volume.abs(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: String,
    pub occurred_at: DateTime<Utc>,
    pub kind: MovementKind,
    /// Stored signed volume. Use [`Movement::signed_liters`] when summing.
    pub liters: Liters,
    /// Consumption: the asset that received the fuel. Kept loose so imported
    /// ledgers may reference assets that no longer exist.
    #[serde(default)]
    pub asset_id: Option<String>,
    /// Explicit tank reference. Kept loose for the same reason; an unknown
    /// id resolves to no tank at all.
    #[serde(default)]
    pub tank_id: Option<String>,
    /// Odometer captured at the event, hundredths of a kilometer.
    #[serde(default)]
    pub odometer: Option<Reading>,
    /// Hour meter captured at the event, hundredths of an hour.
    #[serde(default)]
    pub hours: Option<Reading>,
    /// Driver or machine operator, free text.
    #[serde(default)]
    pub operator: Option<String>,
    /// Id of the user who recorded the event.
    #[serde(default)]
    pub entered_by: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Movement {
    /// The volume with its sign re-derived from the kind. The stored sign is
    /// never trusted: a consumption always counts negative, a refill always
    /// positive, whatever an old ledger happens to contain.
    pub fn signed_liters(&self) -> Liters {
        self.kind.signed(self.liters)
    }

    /// Resolves the tank this movement belongs to.
    ///
    /// An explicit tank reference wins; a reference to an unknown tank puts
    /// the movement in no tank rather than falling back. Only records with
    /// *no* reference at all use the legacy kind mapping.
    pub fn tank(&self) -> Option<TankId> {
        match self.tank_id.as_deref() {
            Some(raw) => TankId::try_from(raw).ok(),
            None => self.kind.implicit_tank(),
        }
    }

    /// The reading captured for one meter axis. Never substitutes the other
    /// axis, even when this one is empty.
    pub fn reading_for(&self, mode: MeterMode) -> Option<Reading> {
        match mode {
            MeterMode::Distance => self.odometer,
            MeterMode::Hours => self.hours,
        }
    }

    pub fn is_consumption_of(&self, asset_id: &str) -> bool {
        self.kind.is_consumption() && self.asset_id.as_deref() == Some(asset_id)
    }
}

/// A movement being composed, before it enters the ledger.
///
/// Drafts carry the user-entered volume with whatever sign the caller sent;
/// committing normalizes the sign from the kind and assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementDraft {
    pub occurred_at: DateTime<Utc>,
    pub kind: MovementKind,
    pub liters: Liters,
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub tank_id: Option<String>,
    #[serde(default)]
    pub odometer: Option<Reading>,
    #[serde(default)]
    pub hours: Option<Reading>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl MovementDraft {
    pub fn validate(&self) -> ResultEngine<()> {
        validate_fields(self.kind, self.asset_id.as_deref(), self.odometer, self.hours)
    }

    pub(crate) fn into_movement(self, recorded_by: Option<&str>) -> Movement {
        // Refills recorded without a tank get stamped with their kind's tank,
        // so only pre-existing ledgers rely on the legacy fallback.
        let tank_id = self
            .tank_id
            .or_else(|| self.kind.implicit_tank().map(|t| t.as_str().to_string()));

        Movement {
            id: Uuid::new_v4().to_string(),
            occurred_at: self.occurred_at,
            kind: self.kind,
            liters: self.kind.signed(self.liters),
            asset_id: self.asset_id,
            tank_id,
            odometer: self.odometer,
            hours: self.hours,
            operator: normalize_optional_text(self.operator),
            entered_by: recorded_by.map(str::to_string),
            note: normalize_optional_text(self.note),
        }
    }
}

fn validate_fields(
    kind: MovementKind,
    asset_id: Option<&str>,
    odometer: Option<Reading>,
    hours: Option<Reading>,
) -> ResultEngine<()> {
    if !kind.is_consumption() {
        return Ok(());
    }

    match asset_id {
        Some(id) if !id.trim().is_empty() => {}
        _ => {
            return Err(EngineError::InvalidMovement(
                "consumption requires an asset".to_string(),
            ));
        }
    }

    if odometer.is_none() && hours.is_none() {
        return Err(EngineError::InvalidMovement(
            "consumption requires a meter reading".to_string(),
        ));
    }

    Ok(())
}

fn normalize_optional_text(value: Option<String>) -> Option<String> {
    match value {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => None,
    }
}
