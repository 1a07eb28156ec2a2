// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store with realtime snapshots.
//!
//! Behaves like the Firestore backend as seen from the services: database
//! assigned IDs and timestamps, merge semantics on update, ordered queries,
//! and listeners that receive a full snapshot after every matching write.
//! Used by tests and by the daemon when `TIMERS_BACKEND=memory`.

use crate::error::AppError;
use crate::ids;
use crate::models::{NewTimer, ResetMetadata, Timer, TimerQuery, TimerUpdate};
use crate::stores::{Subscription, TimerCollection};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

struct Watcher {
    query: TimerQuery,
    sink: TimerCollection,
}

/// The `system/metadata` document: known fields plus anything else
/// other writers stored there.
#[derive(Default)]
struct MetadataDoc {
    record: ResetMetadata,
    other: Map<String, Value>,
}

#[derive(Default)]
struct Inner {
    timers: DashMap<String, Timer>,
    metadata: Mutex<Option<MetadataDoc>>,
    watchers: Mutex<Vec<(u64, Watcher)>>,
    next_watcher: AtomicU64,
    last_server_time: Mutex<Option<DateTime<Utc>>>,
    metadata_unavailable: AtomicBool,
    timer_writes_unavailable: AtomicBool,
    metadata_writes: AtomicUsize,
}

/// In-memory database.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Inner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly increasing "server" time, so creation order is total.
    fn server_now(&self) -> DateTime<Utc> {
        let mut last = lock(&self.inner.last_server_time);
        let now = match *last {
            Some(prev) if Utc::now() <= prev => prev + Duration::microseconds(1),
            _ => Utc::now(),
        };
        *last = Some(now);
        now
    }

    fn sorted(mut timers: Vec<Timer>) -> Vec<Timer> {
        timers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        timers
    }

    fn check_timer_writes(&self) -> Result<(), AppError> {
        if self.inner.timer_writes_unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database("timers collection unavailable".to_string()));
        }
        Ok(())
    }

    /// Push fresh snapshots to every listener whose query matches `timer`.
    fn notify(&self, timer: &Timer) {
        let watchers = lock(&self.inner.watchers);
        for (_, watcher) in watchers.iter().filter(|(_, w)| timer.matches(&w.query)) {
            watcher.sink.set(self.query_timers(&watcher.query));
        }
    }

    // ─── Timer Operations ────────────────────────────────────────

    pub fn get_timer(&self, id: &str) -> Result<Option<Timer>, AppError> {
        Ok(self.inner.timers.get(id).map(|t| t.value().clone()))
    }

    pub fn create_timer(&self, timer: &NewTimer) -> Result<String, AppError> {
        self.check_timer_writes()?;

        let id = ids::document_id()?;
        let stored = timer.clone().into_timer(id.clone(), self.server_now());
        self.inner.timers.insert(id.clone(), stored.clone());
        self.notify(&stored);
        Ok(id)
    }

    /// Merge `update` into an existing timer; a missing id is `NotFound`.
    pub fn update_timer(&self, id: &str, update: &TimerUpdate) -> Result<(), AppError> {
        self.check_timer_writes()?;

        let now = self.server_now();
        let updated = match self.inner.timers.get_mut(id) {
            Some(mut entry) => {
                update.apply_to(&mut entry);
                entry.last_updated = Some(now);
                entry.clone()
            }
            None => return Err(AppError::NotFound(format!("Timer {} not found", id))),
        };

        self.notify(&updated);
        Ok(())
    }

    pub fn delete_timer(&self, id: &str) -> Result<(), AppError> {
        self.check_timer_writes()?;

        if let Some((_, removed)) = self.inner.timers.remove(id) {
            self.notify(&removed);
        }
        Ok(())
    }

    pub fn query_timers(&self, query: &TimerQuery) -> Vec<Timer> {
        let matching = self
            .inner
            .timers
            .iter()
            .filter(|entry| entry.value().matches(query))
            .map(|entry| entry.value().clone())
            .collect();
        Self::sorted(matching)
    }

    /// Register a listener and deliver the initial snapshot immediately.
    pub fn watch_timers(&self, query: TimerQuery, sink: TimerCollection) -> Subscription {
        let watcher_id = self.inner.next_watcher.fetch_add(1, Ordering::SeqCst);
        sink.set(self.query_timers(&query));
        lock(&self.inner.watchers).push((watcher_id, Watcher { query, sink }));

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.watchers).retain(|(id, _)| *id != watcher_id);
            }
        })
    }

    /// Number of active listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.watchers).len()
    }

    // ─── Metadata Operations ─────────────────────────────────────

    pub fn get_reset_metadata(&self) -> Result<Option<ResetMetadata>, AppError> {
        if self.inner.metadata_unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database("system/metadata unavailable".to_string()));
        }
        Ok(lock(&self.inner.metadata)
            .as_ref()
            .map(|doc| doc.record.clone()))
    }

    pub fn merge_reset_metadata(&self, last_reset_date: &str) -> Result<(), AppError> {
        if self.inner.metadata_unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database("system/metadata unavailable".to_string()));
        }

        let now = self.server_now();
        let mut metadata = lock(&self.inner.metadata);
        let doc = metadata.get_or_insert_with(MetadataDoc::default);
        doc.record.last_reset_date = Some(last_reset_date.to_string());
        doc.record.last_reset_timestamp = Some(now);
        self.inner.metadata_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    // ─── Test Hooks ──────────────────────────────────────────────

    /// Replace the metadata document. `other` holds fields outside
    /// [`ResetMetadata`].
    pub fn seed_metadata(&self, record: ResetMetadata, other: Map<String, Value>) {
        *lock(&self.inner.metadata) = Some(MetadataDoc { record, other });
    }

    /// A field of the metadata document not covered by [`ResetMetadata`].
    pub fn metadata_field(&self, name: &str) -> Option<Value> {
        lock(&self.inner.metadata)
            .as_ref()
            .and_then(|doc| doc.other.get(name).cloned())
    }

    /// How many times the reset marker was written.
    pub fn metadata_write_count(&self) -> usize {
        self.inner.metadata_writes.load(Ordering::SeqCst)
    }

    /// Make metadata reads and writes fail.
    pub fn set_metadata_unavailable(&self, unavailable: bool) {
        self.inner
            .metadata_unavailable
            .store(unavailable, Ordering::SeqCst);
    }

    /// Make timer writes fail.
    pub fn set_timer_writes_unavailable(&self, unavailable: bool) {
        self.inner
            .timer_writes_unavailable
            .store(unavailable, Ordering::SeqCst);
    }
}
