//! Portable snapshot of the whole dataset.
//!
//! One self-describing JSON document bundling every record collection, used
//! for backups and for moving a site's history between installations. Import
//! replaces the dataset wholesale; merging two histories is out of scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ResultEngine, assets::Asset, movements::Movement, tanks::Tank, users::User};

/// Format tag written into every export. Imports with a different tag are
/// still accepted; collaborators may warn about the mismatch.
pub const SNAPSHOT_VERSION: &str = "5.0";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub movements: Vec<Movement>,
    #[serde(default)]
    pub users: Vec<User>,
    /// Carried for inspection only; an import rebuilds the tanks from the
    /// movement ledger rather than trusting these cached balances.
    #[serde(default)]
    pub tanks: Vec<Tank>,
}

impl Snapshot {
    pub fn capture(
        assets: &[Asset],
        movements: &[Movement],
        users: &[User],
        tanks: &[Tank],
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            exported_at,
            assets: assets.to_vec(),
            movements: movements.to_vec(),
            users: users.to_vec(),
            tanks: tanks.to_vec(),
        }
    }

    pub fn version_matches(&self) -> bool {
        self.version == SNAPSHOT_VERSION
    }

    pub fn to_json(&self) -> ResultEngine<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> ResultEngine<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
