//! Record persistence.
//!
//! The whole dataset lives in one JSON document with a collection per record
//! kind. [`JsonStore`] keeps that document on disk and rewrites the file on
//! every mutation — small-fleet volumes make the simplicity worth far more
//! than incremental writes would. [`MemoryStore`] backs tests.
//!
//! Records cross this boundary as raw [`Value`]s keyed by their `"id"`
//! field. The store knows nothing about domain shapes; decoding problems
//! belong to the engine, not to persistence.

use std::{fs, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The collections a store persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Assets,
    Movements,
    Users,
    Tanks,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Assets,
        RecordKind::Movements,
        RecordKind::Users,
        RecordKind::Tanks,
    ];
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store document is corrupt: {0}")]
    Corrupt(String),
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Corrupt(a), Self::Corrupt(b)) => a == b,
            _ => false,
        }
    }
}

/// On-disk / in-memory shape of the dataset. Unknown collections in an
/// existing file are dropped on the first rewrite; absent ones read as
/// empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub assets: Vec<Value>,
    #[serde(default)]
    pub movements: Vec<Value>,
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub tanks: Vec<Value>,
}

impl StoreDocument {
    fn collection(&self, kind: RecordKind) -> &Vec<Value> {
        match kind {
            RecordKind::Assets => &self.assets,
            RecordKind::Movements => &self.movements,
            RecordKind::Users => &self.users,
            RecordKind::Tanks => &self.tanks,
        }
    }

    fn collection_mut(&mut self, kind: RecordKind) -> &mut Vec<Value> {
        match kind {
            RecordKind::Assets => &mut self.assets,
            RecordKind::Movements => &mut self.movements,
            RecordKind::Users => &mut self.users,
            RecordKind::Tanks => &mut self.tanks,
        }
    }
}

fn id_of(record: &Value) -> Result<&str, StoreError> {
    record
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Corrupt("record without a string \"id\"".to_string()))
}

fn upsert(collection: &mut Vec<Value>, record: Value) -> Result<(), StoreError> {
    let id = id_of(&record)?.to_string();
    let slot = collection
        .iter_mut()
        .find(|existing| existing.get("id").and_then(Value::as_str) == Some(id.as_str()));
    match slot {
        Some(existing) => *existing = record,
        None => collection.push(record),
    }
    Ok(())
}

/// Storage seam for the engine.
///
/// `put` upserts by id, `delete` is idempotent, `replace_all` swaps the
/// whole document in one call (snapshot import).
pub trait RecordStore {
    fn get_all(&self, kind: RecordKind) -> Result<Vec<Value>, StoreError>;
    fn put(&mut self, kind: RecordKind, record: Value) -> Result<(), StoreError>;
    fn delete(&mut self, kind: RecordKind, id: &str) -> Result<(), StoreError>;
    fn replace_all(&mut self, document: StoreDocument) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    document: StoreDocument,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get_all(&self, kind: RecordKind) -> Result<Vec<Value>, StoreError> {
        Ok(self.document.collection(kind).clone())
    }

    fn put(&mut self, kind: RecordKind, record: Value) -> Result<(), StoreError> {
        upsert(self.document.collection_mut(kind), record)
    }

    fn delete(&mut self, kind: RecordKind, id: &str) -> Result<(), StoreError> {
        self.document
            .collection_mut(kind)
            .retain(|record| record.get("id").and_then(Value::as_str) != Some(id));
        Ok(())
    }

    fn replace_all(&mut self, document: StoreDocument) -> Result<(), StoreError> {
        self.document = document;
        Ok(())
    }
}

/// Single-file JSON store. Every mutation rewrites the file, so the document
/// on disk is always complete and loadable with nothing but a text editor.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    document: StoreDocument,
}

impl JsonStore {
    /// Loads the document at `path`. A missing file is an empty dataset, not
    /// an error; the file appears on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, document })
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.document)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl RecordStore for JsonStore {
    fn get_all(&self, kind: RecordKind) -> Result<Vec<Value>, StoreError> {
        Ok(self.document.collection(kind).clone())
    }

    fn put(&mut self, kind: RecordKind, record: Value) -> Result<(), StoreError> {
        upsert(self.document.collection_mut(kind), record)?;
        self.flush()
    }

    fn delete(&mut self, kind: RecordKind, id: &str) -> Result<(), StoreError> {
        self.document
            .collection_mut(kind)
            .retain(|record| record.get("id").and_then(Value::as_str) != Some(id));
        self.flush()
    }

    fn replace_all(&mut self, document: StoreDocument) -> Result<(), StoreError> {
        self.document = document;
        self.flush()
    }
}
