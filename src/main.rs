// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team Timers reset daemon
//!
//! Keeps the timer caches subscribed and runs the daily reset check on a
//! fixed interval, so timers are reset even when no browser is open at
//! midnight.

use std::sync::Arc;
use team_timers::{
    config::{Backend, Config},
    db::{Database, FirestoreDb},
    services::AuthProvider,
    time_utils::SystemClock,
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        backend = ?config.backend,
        interval_secs = config.reset_check_interval.as_secs(),
        utc_offset = %config.reset_utc_offset,
        "Starting Team Timers reset daemon"
    );

    let db = match config.backend {
        Backend::Firestore => Database::from(FirestoreDb::new(&config.gcp_project_id).await?),
        Backend::Memory => {
            tracing::warn!("Using in-memory database; nothing will be persisted");
            Database::in_memory()
        }
    };

    let auth = match &config.firebase_api_key {
        Some(api_key) => AuthProvider::firebase(api_key.clone(), config.auth_emulator_host.as_deref()),
        None => {
            tracing::warn!("FIREBASE_API_KEY not set, using in-memory accounts");
            AuthProvider::in_memory()
        }
    };

    let state = AppState::new(config.clone(), db, auth, Arc::new(SystemClock));

    // Personal timers are only reset for a signed-in user
    let mut subscriptions = Vec::new();
    if let Some(reset_user) = &config.reset_user {
        let user = state
            .session
            .login(&reset_user.email, &reset_user.password)
            .await?;
        tracing::info!(uid = %user.uid, "Signed in reset user");
        subscriptions.push(state.timers.subscribe_user_timers(&user.uid).await?);
    }
    subscriptions.push(state.timers.subscribe_team_timers().await?);

    let mut interval = tokio::time::interval(config.reset_check_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if state.scheduler.check_and_reset_if_needed().await {
                    tracing::info!("Daily reset performed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    for subscription in subscriptions {
        subscription.cancel();
    }
    if config.reset_user.is_some() {
        state.session.logout().await?;
    }

    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("team_timers=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
