// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Team Timers: data-access layer for a shared countdown timer app
//!
//! Wraps Firestore and Firebase Authentication behind reactive stores,
//! ownership-checked timer CRUD, and the daily midnight reset.

pub mod color;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod models;
pub mod services;
pub mod stores;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{AuthProvider, ResetScheduler, SessionStore, TimerRepository};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state: owns every store and service.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub session: Arc<SessionStore>,
    pub timers: TimerRepository,
    pub scheduler: ResetScheduler,
}

impl AppState {
    /// Wire the services together. Must be called inside a Tokio runtime.
    pub fn new(config: Config, db: Database, auth: AuthProvider, clock: Arc<dyn Clock>) -> Self {
        let session = Arc::new(SessionStore::new(auth));
        let timers = TimerRepository::new(db.clone(), session.clone());
        let scheduler = ResetScheduler::new(
            db.clone(),
            timers.clone(),
            session.clone(),
            clock,
            config.reset_utc_offset,
        );

        Self {
            config,
            db,
            session,
            timers,
            scheduler,
        }
    }
}
