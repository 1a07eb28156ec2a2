// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use team_timers::config::Config;
use team_timers::db::{Database, FirestoreDb, MemoryDb};
use team_timers::models::{SessionState, Timer};
use team_timers::services::AuthProvider;
use team_timers::time_utils::ManualClock;
use team_timers::AppState;
use tokio::sync::watch;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Local offset used by the in-memory harness (UTC-7).
#[allow(dead_code)]
pub fn test_offset() -> FixedOffset {
    FixedOffset::west_opt(7 * 3600).unwrap()
}

/// Wall-clock time in the harness offset.
#[allow(dead_code)]
pub fn local_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    test_offset()
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .unwrap()
        .with_timezone(&Utc)
}

/// An app wired to in-memory backends and a manual clock.
#[allow(dead_code)]
pub struct TestApp {
    pub state: AppState,
    pub memory: MemoryDb,
    pub clock: Arc<ManualClock>,
}

/// Create a test app with in-memory dependencies, clock at 10:30 local.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let memory = MemoryDb::new();
    let clock = Arc::new(ManualClock::new(local_time(2026, 10, 19, 10, 30, 0)));
    let config = Config {
        reset_utc_offset: test_offset(),
        ..Config::default()
    };

    let state = AppState::new(
        config,
        Database::from(memory.clone()),
        AuthProvider::in_memory(),
        clock.clone(),
    );

    TestApp {
        state,
        memory,
        clock,
    }
}

impl TestApp {
    /// Register (and thereby sign in) a user, returning their UID.
    #[allow(dead_code)]
    pub async fn sign_up(&self, email: &str) -> String {
        self.state
            .session
            .register(email, "correct-horse")
            .await
            .expect("register should succeed")
            .uid
    }
}

/// Wait until a collection satisfies `pred`.
#[allow(dead_code)]
pub async fn wait_for_timers<F>(rx: &mut watch::Receiver<Vec<Timer>>, pred: F) -> Vec<Timer>
where
    F: FnMut(&Vec<Timer>) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for timers")
        .expect("timer channel closed")
        .clone()
}

/// Wait until the session satisfies `pred`.
#[allow(dead_code)]
pub async fn wait_for_session<F>(rx: &mut watch::Receiver<SessionState>, pred: F) -> SessionState
where
    F: FnMut(&SessionState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
        .await
        .expect("timed out waiting for session")
        .expect("session channel closed")
        .clone()
}
