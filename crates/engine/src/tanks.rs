//! The two depot tanks and the balance derivation.
//!
//! Tanks are fixed infrastructure: nobody creates or deletes one through the
//! API, and their balances are nothing but a cached sum over the movement
//! ledger. [`balance_of`] is that sum; the engine re-runs it for both tanks
//! after every ledger mutation and persists the result, so readers never see
//! a stale cache.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Liters, movements::Movement};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankId {
    Crusher,
    Site,
}

impl TankId {
    pub const ALL: [TankId; 2] = [TankId::Crusher, TankId::Site];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crusher => "crusher",
            Self::Site => "site",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Crusher => "Crusher tank",
            Self::Site => "Site tank",
        }
    }

    pub const fn capacity(self) -> Liters {
        match self {
            Self::Crusher => Liters::new(1_100_000),
            Self::Site => Liters::new(300_000),
        }
    }
}

impl TryFrom<&str> for TankId {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "crusher" => Ok(Self::Crusher),
            "site" => Ok(Self::Site),
            other => Err(EngineError::KeyNotFound(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub id: TankId,
    pub name: String,
    pub capacity: Liters,
    /// Derived cache; see [`balance_of`]. Not clamped to the capacity.
    pub balance: Liters,
}

impl Tank {
    pub fn new(id: TankId) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            capacity: id.capacity(),
            balance: Liters::ZERO,
        }
    }

    /// Capacity minus balance. Negative when overfilled — surfaced as-is.
    pub fn free_space(&self) -> Liters {
        self.capacity - self.balance
    }

    pub fn status(&self) -> TankStatus {
        TankStatus {
            id: self.id,
            name: self.name.clone(),
            balance: self.balance,
            capacity: self.capacity,
            free_space: self.free_space(),
        }
    }
}

/// Both tanks, empty. The canonical set for a fresh store.
pub fn defaults() -> Vec<Tank> {
    TankId::ALL.into_iter().map(Tank::new).collect()
}

/// Signed sum of every movement resolving to `tank`.
///
/// Membership is [`Movement::tank`]: the explicit reference when present,
/// otherwise the legacy kind mapping. Volumes go through
/// [`Movement::signed_liters`] so a mis-signed stored record cannot skew the
/// balance. No clamping — an over- or under-filled tank is reported as such.
pub fn balance_of(movements: &[Movement], tank: TankId) -> Liters {
    movements
        .iter()
        .filter(|m| m.tank() == Some(tank))
        .map(Movement::signed_liters)
        .sum()
}

/// Point-in-time view of one tank for the reporting surface.
#[derive(Clone, Debug, PartialEq)]
pub struct TankStatus {
    pub id: TankId,
    pub name: String,
    pub balance: Liters,
    pub capacity: Liters,
    pub free_space: Liters,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::movements::MovementKind;

    fn movement(kind: MovementKind, liters: i64, tank_id: Option<&str>) -> Movement {
        Movement {
            id: format!("m-{kind:?}-{liters}"),
            occurred_at: Utc::now(),
            kind,
            liters: Liters::new(liters),
            asset_id: None,
            tank_id: tank_id.map(str::to_string),
            odometer: None,
            hours: None,
            operator: None,
            entered_by: None,
            note: None,
        }
    }

    #[test]
    fn balance_sums_only_the_named_tank() {
        let movements = vec![
            movement(MovementKind::CrusherRefill, 50_000, Some("crusher")),
            movement(MovementKind::Consumption, -8_000, Some("crusher")),
            movement(MovementKind::SiteRefill, 10_000, Some("site")),
        ];

        assert_eq!(balance_of(&movements, TankId::Crusher), Liters::new(42_000));
        assert_eq!(balance_of(&movements, TankId::Site), Liters::new(10_000));
    }

    #[test]
    fn legacy_untagged_refills_count_via_their_kind() {
        let movements = vec![
            movement(MovementKind::CrusherRefill, 30_000, None),
            movement(MovementKind::SiteRefill, 5_000, None),
        ];

        assert_eq!(balance_of(&movements, TankId::Crusher), Liters::new(30_000));
        assert_eq!(balance_of(&movements, TankId::Site), Liters::new(5_000));
    }

    #[test]
    fn untagged_consumption_drains_no_tank() {
        let movements = vec![movement(MovementKind::Consumption, -8_000, None)];

        assert_eq!(balance_of(&movements, TankId::Crusher), Liters::ZERO);
        assert_eq!(balance_of(&movements, TankId::Site), Liters::ZERO);
    }

    #[test]
    fn unknown_tank_reference_counts_nowhere() {
        let movements = vec![movement(MovementKind::CrusherRefill, 30_000, Some("barrel"))];

        assert_eq!(balance_of(&movements, TankId::Crusher), Liters::ZERO);
        assert_eq!(balance_of(&movements, TankId::Site), Liters::ZERO);
    }

    #[test]
    fn balance_is_not_clamped_to_capacity() {
        let movements = vec![
            movement(MovementKind::SiteRefill, 400_000, Some("site")),
            movement(MovementKind::Consumption, -900_000, Some("crusher")),
        ];

        let site = balance_of(&movements, TankId::Site);
        assert!(site > TankId::Site.capacity());

        let tank = Tank {
            balance: site,
            ..Tank::new(TankId::Site)
        };
        assert!(tank.free_space().is_negative());

        assert_eq!(balance_of(&movements, TankId::Crusher), Liters::new(-900_000));
    }

    #[test]
    fn mis_signed_stored_volumes_cannot_skew_the_sum() {
        // A consumption stored with a positive volume still drains the tank.
        let movements = vec![movement(MovementKind::Consumption, 8_000, Some("crusher"))];
        assert_eq!(balance_of(&movements, TankId::Crusher), Liters::new(-8_000));
    }

    #[test]
    fn tank_totals_match_the_resolvable_volume_sum() {
        let movements = vec![
            movement(MovementKind::CrusherRefill, 50_000, None),
            movement(MovementKind::SiteRefill, 10_000, Some("site")),
            movement(MovementKind::Consumption, -8_000, Some("crusher")),
            movement(MovementKind::Consumption, -2_000, None),
            movement(MovementKind::CrusherRefill, 1_000, Some("barrel")),
        ];

        let per_tank: Liters = TankId::ALL
            .into_iter()
            .map(|t| balance_of(&movements, t))
            .sum();
        let resolvable: Liters = movements
            .iter()
            .filter(|m| m.tank().is_some())
            .map(Movement::signed_liters)
            .sum();

        assert_eq!(per_tank, resolvable);
        assert_eq!(per_tank, Liters::new(52_000));
    }
}
