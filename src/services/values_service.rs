use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::state::values::{Identifier, Record, StoredValue, ValueStore};

/// Store a new value under the next identifier and return that identifier.
pub fn store(store: &ValueStore, value: String) -> Identifier {
    let id = match store {
        ValueStore::Plain(table) => {
            let mut map = table.write();
            let id = table.next_id();
            map.insert(id, value);
            id
        }
        ValueStore::Timestamped(table) => {
            let now = Utc::now();
            let mut map = table.write();
            let id = table.next_id();
            map.insert(
                id,
                StoredValue {
                    id,
                    value,
                    created: now,
                    updated: now,
                },
            );
            id
        }
    };

    tracing::debug!(id, "stored value");
    id
}

/// Look up a single record.
pub fn retrieve(store: &ValueStore, id: Identifier) -> Option<Record> {
    match store {
        ValueStore::Plain(table) => table.read().get(&id).cloned().map(Record::Plain),
        ValueStore::Timestamped(table) => {
            table.read().get(&id).cloned().map(Record::Timestamped)
        }
    }
}

/// Snapshot of every record currently held.
pub fn retrieve_all(store: &ValueStore) -> HashMap<Identifier, Record> {
    match store {
        ValueStore::Plain(table) => table
            .read()
            .iter()
            .map(|(id, value)| (*id, Record::Plain(value.clone())))
            .collect(),
        ValueStore::Timestamped(table) => table
            .read()
            .iter()
            .map(|(id, stored)| (*id, Record::Timestamped(stored.clone())))
            .collect(),
    }
}

/// Replace the value of an existing record. Returns false if `id` is absent.
pub fn update(store: &ValueStore, id: Identifier, value: String) -> bool {
    let updated = match store {
        ValueStore::Plain(table) => match table.write().get_mut(&id) {
            Some(existing) => {
                *existing = value;
                true
            }
            None => false,
        },
        ValueStore::Timestamped(table) => match table.write().get_mut(&id) {
            Some(existing) => {
                existing.value = value;
                existing.updated = advance(existing.updated);
                true
            }
            None => false,
        },
    };

    if updated {
        tracing::debug!(id, "updated value");
    }
    updated
}

/// Remove a record. Returns false if `id` is absent.
pub fn delete(store: &ValueStore, id: Identifier) -> bool {
    let removed = match store {
        ValueStore::Plain(table) => table.write().remove(&id).is_some(),
        ValueStore::Timestamped(table) => table.write().remove(&id).is_some(),
    };

    if removed {
        tracing::debug!(id, "deleted value");
    }
    removed
}

/// Current time, or one nanosecond past `previous` if the clock has not moved.
fn advance(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}
