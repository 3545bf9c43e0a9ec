use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

pub use assets::{Asset, AssetKind, AssetUpdate, MeterMode};
pub use error::EngineError;
pub use movements::{Movement, MovementDraft, MovementKind};
pub use reading::Reading;
pub use reports::{
    Anomaly, AssetSummary, Efficiency, FleetTotals, RowPerformance, UsageWindow, WindowUsage,
};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};
pub use store::{JsonStore, MemoryStore, RecordKind, RecordStore, StoreDocument, StoreError};
pub use tanks::{Tank, TankId, TankStatus};
pub use users::{ADMIN_ID, Role, User};
pub use volume::Liters;

mod assets;
mod error;
mod movements;
mod reading;
mod readings;
mod reports;
mod snapshot;
mod store;
mod tanks;
mod users;
mod volume;

type ResultEngine<T> = Result<T, EngineError>;

/// The ledger engine: every record collection in memory, one store behind
/// it. All mutations go through here so the derived caches (tank balances,
/// asset readings) can never drift from the movement ledger.
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
    assets: Vec<Asset>,
    movements: Vec<Movement>,
    users: Vec<User>,
    tanks: Vec<Tank>,
}

impl Engine<MemoryStore> {
    /// Return a builder for `Engine`.
    pub fn builder() -> EngineBuilder<MemoryStore> {
        EngineBuilder::default()
    }
}

impl<S: RecordStore> Engine<S> {
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn asset(&self, id: &str) -> ResultEngine<&Asset> {
        self.assets
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    pub fn movement(&self, id: &str) -> ResultEngine<&Movement> {
        self.movements
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    /// Validate a draft and append it to the ledger, then refresh every
    /// derived balance and reading.
    pub fn commit_movement(
        &mut self,
        draft: MovementDraft,
        recorded_by: Option<&str>,
    ) -> ResultEngine<Movement> {
        draft.validate()?;
        let movement = draft.into_movement(recorded_by);

        self.store
            .put(RecordKind::Movements, serde_json::to_value(&movement)?)?;
        self.movements.push(movement.clone());

        self.refresh_derived();
        self.persist_derived()?;
        Ok(movement)
    }

    /// Replace an existing ledger row with the draft's fields.
    ///
    /// The id and the original `entered_by` stamp survive the edit; volume
    /// sign, tank stamp and free-text fields are re-normalized exactly as on
    /// commit, so changing the kind flips the sign while keeping the entered
    /// magnitude.
    pub fn update_movement(&mut self, id: &str, draft: MovementDraft) -> ResultEngine<Movement> {
        let index = self.movement_index(id)?;
        draft.validate()?;

        let entered_by = self.movements[index].entered_by.clone();
        let mut updated = draft.into_movement(entered_by.as_deref());
        updated.id = id.to_string();

        self.store
            .put(RecordKind::Movements, serde_json::to_value(&updated)?)?;
        self.movements[index] = updated.clone();

        self.refresh_derived();
        self.persist_derived()?;
        Ok(updated)
    }

    /// Remove a ledger row. Balances and readings are re-derived from the
    /// remaining rows, as if the entry had never existed.
    pub fn delete_movement(&mut self, id: &str) -> ResultEngine<()> {
        let index = self.movement_index(id)?;

        self.store.delete(RecordKind::Movements, id)?;
        self.movements.remove(index);

        self.refresh_derived();
        self.persist_derived()?;
        Ok(())
    }

    /// Register a fleet asset. Its current reading starts at the initial
    /// reading and follows the ledger from then on.
    pub fn register_asset(
        &mut self,
        kind: AssetKind,
        label: &str,
        model: &str,
        meter: MeterMode,
        initial_reading: Reading,
        created_by: Option<&str>,
    ) -> ResultEngine<Asset> {
        let asset = Asset::new(kind, label, model, meter, initial_reading, created_by)?;

        self.store
            .put(RecordKind::Assets, serde_json::to_value(&asset)?)?;
        self.assets.push(asset.clone());
        Ok(asset)
    }

    pub fn update_asset(&mut self, id: &str, update: &AssetUpdate) -> ResultEngine<Asset> {
        let index = self.asset_index(id)?;
        update.apply_to(&mut self.assets[index])?;

        // A meter or baseline change moves the derived reading too.
        self.refresh_derived();
        self.persist_derived()?;
        Ok(self.assets[index].clone())
    }

    /// Remove an asset. Its ledger rows stay: they keep counting against the
    /// tanks but drop out of every per-asset figure.
    pub fn delete_asset(&mut self, id: &str) -> ResultEngine<()> {
        let index = self.asset_index(id)?;

        self.store.delete(RecordKind::Assets, id)?;
        self.assets.remove(index);
        Ok(())
    }

    pub fn create_user(
        &mut self,
        login: &str,
        password: &str,
        role: Role,
        name: &str,
    ) -> ResultEngine<User> {
        let user = User::new(login, password, role, name)?;
        if self.users.iter().any(|u| u.login == user.login) {
            return Err(EngineError::InvalidUser(format!(
                "login {} already taken",
                user.login
            )));
        }

        self.store
            .put(RecordKind::Users, serde_json::to_value(&user)?)?;
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn delete_user(&mut self, id: &str) -> ResultEngine<()> {
        let index = self.user_index(id)?;
        if self.users[index].is_builtin_admin() {
            return Err(EngineError::InvalidUser(
                "the built-in administrator cannot be deleted".to_string(),
            ));
        }

        self.store.delete(RecordKind::Users, id)?;
        self.users.remove(index);
        Ok(())
    }

    pub fn tank_statuses(&self) -> Vec<TankStatus> {
        self.tanks.iter().map(Tank::status).collect()
    }

    pub fn fleet_summary(&self, now: DateTime<Utc>, tz: Tz) -> Vec<AssetSummary> {
        reports::fleet_summary(&self.assets, &self.movements, now, tz)
    }

    pub fn fleet_totals(&self) -> FleetTotals {
        reports::fleet_totals(&self.assets, &self.movements)
    }

    pub fn movement_performance(&self, movement: &Movement) -> Option<RowPerformance> {
        reports::movement_performance(&self.assets, &self.movements, movement)
    }

    pub fn export_snapshot(&self, exported_at: DateTime<Utc>) -> Snapshot {
        Snapshot::capture(
            &self.assets,
            &self.movements,
            &self.users,
            &self.tanks,
            exported_at,
        )
    }

    /// Replace the whole dataset with the snapshot's.
    ///
    /// The version tag is not enforced here; callers may warn on a mismatch.
    /// Tanks are rebuilt rather than imported — capacities are fixed
    /// infrastructure and balances are derived — and an empty user list is
    /// re-seeded with the built-in administrator.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> ResultEngine<()> {
        self.assets = snapshot.assets;
        self.movements = snapshot.movements;
        self.users = snapshot.users;
        self.tanks = tanks::defaults();
        if self.users.is_empty() {
            self.users.push(User::builtin_admin());
        }

        self.refresh_derived();
        self.persist_all()
    }

    fn movement_index(&self, id: &str) -> ResultEngine<usize> {
        self.movements
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    fn asset_index(&self, id: &str) -> ResultEngine<usize> {
        self.assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    fn user_index(&self, id: &str) -> ResultEngine<usize> {
        self.users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    /// Recompute every tank balance and asset reading from the ledger.
    fn refresh_derived(&mut self) {
        for tank in &mut self.tanks {
            tank.balance = tanks::balance_of(&self.movements, tank.id);
        }
        for asset in &mut self.assets {
            asset.current_reading = readings::current_reading(asset, &self.movements);
        }
    }

    /// Write the cache-carrying collections back to the store.
    fn persist_derived(&mut self) -> ResultEngine<()> {
        for tank in &self.tanks {
            self.store
                .put(RecordKind::Tanks, serde_json::to_value(tank)?)?;
        }
        for asset in &self.assets {
            self.store
                .put(RecordKind::Assets, serde_json::to_value(asset)?)?;
        }
        Ok(())
    }

    fn persist_all(&mut self) -> ResultEngine<()> {
        let document = StoreDocument {
            assets: encode_all(&self.assets)?,
            movements: encode_all(&self.movements)?,
            users: encode_all(&self.users)?,
            tanks: encode_all(&self.tanks)?,
        };
        self.store.replace_all(document)?;
        Ok(())
    }
}

fn encode_all<T: Serialize>(records: &[T]) -> ResultEngine<Vec<Value>> {
    records
        .iter()
        .map(|record| serde_json::to_value(record).map_err(EngineError::from))
        .collect()
}

fn decode_all<T: DeserializeOwned>(
    store: &impl RecordStore,
    kind: RecordKind,
) -> ResultEngine<Vec<T>> {
    store
        .get_all(kind)?
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(EngineError::from))
        .collect()
}

/// The builder for `Engine`.
pub struct EngineBuilder<S> {
    store: S,
}

impl Default for EngineBuilder<MemoryStore> {
    fn default() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }
}

impl<S: RecordStore> EngineBuilder<S> {
    /// Pass the backing store. An in-memory store is used when none is set.
    pub fn store<T: RecordStore>(self, store: T) -> EngineBuilder<T> {
        EngineBuilder { store }
    }

    /// Construct `Engine`.
    ///
    /// Loads every collection, seeds an empty store with the two tanks and
    /// the built-in administrator, then re-derives and persists the caches —
    /// so a hand-edited or freshly imported file is squared up on boot.
    pub fn build(self) -> ResultEngine<Engine<S>> {
        let assets = decode_all(&self.store, RecordKind::Assets)?;
        let movements = decode_all(&self.store, RecordKind::Movements)?;
        let mut users: Vec<User> = decode_all(&self.store, RecordKind::Users)?;
        let mut tanks: Vec<Tank> = decode_all(&self.store, RecordKind::Tanks)?;

        if tanks.is_empty() {
            tanks = tanks::defaults();
        }
        if users.is_empty() {
            users.push(User::builtin_admin());
        }

        let mut engine = Engine {
            store: self.store,
            assets,
            movements,
            users,
            tanks,
        };
        engine.refresh_derived();
        engine.persist_all()?;
        Ok(engine)
    }
}
