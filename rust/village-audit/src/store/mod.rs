//! Document store abstraction over the four village collections.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::{
    error::{AuditError, Result},
    models::{ConsumptionRecord, ControlActivity, Snapshot, User, Well},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Wells,
    Consumption,
    ControlActivities,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Wells,
        Collection::Consumption,
        Collection::ControlActivities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Wells => "registered_wells",
            Collection::Consumption => "water_consumption",
            Collection::ControlActivities => "control_activities",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal document-store surface the generator and auditor need.
///
/// Filtering, grouping and joins run in-process over a loaded [`Snapshot`],
/// so implementations only have to move whole documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Removes every document in `collection`. Dropping an absent collection is a no-op.
    async fn drop_collection(&self, collection: Collection) -> Result<()>;

    /// Appends `documents` in one batch and returns how many were written.
    async fn insert_many(&self, collection: Collection, documents: Vec<Value>) -> Result<usize>;

    /// Returns every document in insertion order.
    async fn find_all(&self, collection: Collection) -> Result<Vec<Value>>;
}

pub async fn drop_all(store: &dyn DocumentStore) -> Result<()> {
    for collection in Collection::ALL {
        store.drop_collection(collection).await?;
    }
    Ok(())
}

/// Serializes `items` and writes them in chunks of `batch_size` documents.
pub async fn insert_batched<T: Serialize>(
    store: &dyn DocumentStore,
    collection: Collection,
    items: &[T],
    batch_size: usize,
) -> Result<usize> {
    let mut written = 0;
    for (index, chunk) in items.chunks(batch_size.max(1)).enumerate() {
        let documents = chunk
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        written += store.insert_many(collection, documents).await?;
        debug!(collection = %collection, batch = index, written, "inserted batch");
    }
    Ok(written)
}

pub async fn load_typed<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
) -> Result<Vec<T>> {
    store
        .find_all(collection)
        .await?
        .into_iter()
        .enumerate()
        .map(|(position, value)| {
            serde_json::from_value(value).map_err(|source| AuditError::MalformedDocument {
                collection,
                position,
                source,
            })
        })
        .collect()
}

pub async fn load_snapshot(store: &dyn DocumentStore) -> Result<Snapshot> {
    let users: Vec<User> = load_typed(store, Collection::Users).await?;
    let wells: Vec<Well> = load_typed(store, Collection::Wells).await?;
    let consumption: Vec<ConsumptionRecord> = load_typed(store, Collection::Consumption).await?;
    let activities: Vec<ControlActivity> =
        load_typed(store, Collection::ControlActivities).await?;

    debug!(
        users = users.len(),
        wells = wells.len(),
        consumption = consumption.len(),
        activities = activities.len(),
        "loaded snapshot"
    );

    Ok(Snapshot {
        users,
        wells,
        consumption,
        activities,
    })
}

/// Persists every collection of `snapshot`, replacing whatever was stored before.
pub async fn save_snapshot(
    store: &dyn DocumentStore,
    snapshot: &Snapshot,
    batch_size: usize,
) -> Result<()> {
    drop_all(store).await?;
    insert_batched(store, Collection::Users, &snapshot.users, batch_size).await?;
    insert_batched(store, Collection::Wells, &snapshot.wells, batch_size).await?;
    insert_batched(store, Collection::Consumption, &snapshot.consumption, batch_size).await?;
    insert_batched(
        store,
        Collection::ControlActivities,
        &snapshot.activities,
        batch_size,
    )
    .await?;
    Ok(())
}
