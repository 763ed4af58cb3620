use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to each stored record. Starts at 1 and is never reused.
pub type Identifier = i64;

/// Which record variant a store keeps. Fixed when the store is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Plain,
    Timestamped,
}

impl Backend {
    /// `"simple"` selects the plain backend; anything else is timestamped.
    pub fn from_selector(selector: &str) -> Self {
        if selector == "simple" {
            Backend::Plain
        } else {
            Backend::Timestamped
        }
    }
}

/// A value with its creation and last-update instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredValue {
    pub id: Identifier,
    pub value: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// What a read hands back. Plain records serialize as a bare JSON string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Plain(String),
    Timestamped(StoredValue),
}

#[cfg(test)]
impl Record {
    pub fn value(&self) -> &str {
        match self {
            Record::Plain(value) => value,
            Record::Timestamped(stored) => &stored.value,
        }
    }
}

/// Identifier sequence plus the guarded id → entry map.
#[derive(Debug)]
pub struct ValueTable<T> {
    id_counter: AtomicI64,
    values: RwLock<HashMap<Identifier, T>>,
}

impl<T> Default for ValueTable<T> {
    fn default() -> Self {
        Self {
            id_counter: AtomicI64::new(0),
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> ValueTable<T> {
    /// Hand out the next identifier. Safe to call from many threads at once.
    pub fn next_id(&self) -> Identifier {
        self.id_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<Identifier, T>> {
        self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, HashMap<Identifier, T>> {
        self.values.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// The single value store of a running service.
#[derive(Debug)]
pub enum ValueStore {
    Plain(ValueTable<String>),
    Timestamped(ValueTable<StoredValue>),
}

/// Shared store handle passed to the route handlers.
pub type SharedStore = Arc<ValueStore>;

impl ValueStore {
    pub fn new(backend: Backend) -> Self {
        match backend {
            Backend::Plain => ValueStore::Plain(ValueTable::default()),
            Backend::Timestamped => ValueStore::Timestamped(ValueTable::default()),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            ValueStore::Plain(_) => Backend::Plain,
            ValueStore::Timestamped(_) => Backend::Timestamped,
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        match self {
            ValueStore::Plain(table) => table.read().len(),
            ValueStore::Timestamped(table) => table.read().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Create a new, empty shared store.
pub fn new_store(backend: Backend) -> SharedStore {
    Arc::new(ValueStore::new(backend))
}
