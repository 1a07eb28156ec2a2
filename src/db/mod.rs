//! Database layer (Firestore, or an in-memory stand-in).

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryDb;

use crate::error::AppError;
use crate::models::{NewTimer, ResetMetadata, Timer, TimerQuery, TimerUpdate};
use crate::stores::{Subscription, TimerCollection};

/// Collection names as constants.
pub mod collections {
    pub const TIMERS: &str = "timers";
    pub const SYSTEM: &str = "system";
    /// Document ID of the reset metadata inside `system`
    pub const METADATA_DOC: &str = "metadata";
}

/// Typed document operations over the configured backend.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    pub fn in_memory() -> Self {
        Database::Memory(MemoryDb::new())
    }

    /// Get a timer by document ID.
    pub async fn get_timer(&self, id: &str) -> Result<Option<Timer>, AppError> {
        match self {
            Database::Firestore(db) => db.get_timer(id).await,
            Database::Memory(db) => db.get_timer(id),
        }
    }

    /// Store a new timer with server-assigned timestamps. Returns its ID.
    pub async fn create_timer(&self, timer: &NewTimer) -> Result<String, AppError> {
        match self {
            Database::Firestore(db) => db.create_timer(timer).await,
            Database::Memory(db) => db.create_timer(timer),
        }
    }

    /// Merge `update` into a timer and stamp `lastUpdated`.
    pub async fn update_timer(&self, id: &str, update: &TimerUpdate) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.update_timer(id, update).await,
            Database::Memory(db) => db.update_timer(id, update),
        }
    }

    pub async fn delete_timer(&self, id: &str) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.delete_timer(id).await,
            Database::Memory(db) => db.delete_timer(id),
        }
    }

    /// One-shot query, ordered by `createdAt` ascending.
    pub async fn query_timers(&self, query: &TimerQuery) -> Result<Vec<Timer>, AppError> {
        match self {
            Database::Firestore(db) => db.query_timers(query).await,
            Database::Memory(db) => Ok(db.query_timers(query)),
        }
    }

    /// Keep `sink` equal to the query result until the subscription ends.
    pub async fn watch_timers(
        &self,
        query: TimerQuery,
        sink: TimerCollection,
    ) -> Result<Subscription, AppError> {
        match self {
            Database::Firestore(db) => db.watch_timers(query, sink).await,
            Database::Memory(db) => Ok(db.watch_timers(query, sink)),
        }
    }

    pub async fn get_reset_metadata(&self) -> Result<Option<ResetMetadata>, AppError> {
        match self {
            Database::Firestore(db) => db.get_reset_metadata().await,
            Database::Memory(db) => db.get_reset_metadata(),
        }
    }

    /// Upsert `lastResetDate` and a server `lastResetTimestamp`, leaving
    /// other metadata fields untouched.
    pub async fn merge_reset_metadata(&self, last_reset_date: &str) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.merge_reset_metadata(last_reset_date).await,
            Database::Memory(db) => db.merge_reset_metadata(last_reset_date),
        }
    }
}

impl From<FirestoreDb> for Database {
    fn from(db: FirestoreDb) -> Self {
        Database::Firestore(db)
    }
}

impl From<MemoryDb> for Database {
    fn from(db: MemoryDb) -> Self {
        Database::Memory(db)
    }
}
