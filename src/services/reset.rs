// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily timer reset.
//!
//! The only state is `lastResetDate` in `system/metadata`. A reset is due
//! when that date is before today (a missed reset) or when the wall clock
//! reads exactly midnight. The midnight branch only fires if a check
//! happens to land in that second; the date comparison is what actually
//! drives resets.

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{SessionState, Timer, TimerUpdate};
use crate::services::{SessionStore, TimerRepository};
use crate::stores::project_my_timers;
use crate::time_utils::{self, Clock};
use chrono::{DateTime, FixedOffset, Utc};
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Checks for and performs the daily reset of timers.
#[derive(Clone)]
pub struct ResetScheduler {
    db: Database,
    timers: TimerRepository,
    session: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    /// Serializes checks within this process
    check_lock: Arc<Mutex<()>>,
}

impl ResetScheduler {
    pub fn new(
        db: Database,
        timers: TimerRepository,
        session: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            db,
            timers,
            session,
            clock,
            offset,
            check_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Local wall-clock time in the configured offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    /// Start of the day of the last recorded reset.
    ///
    /// Falls back to the start of yesterday when nothing usable is stored
    /// or the read fails, so a missing record always looks like a missed
    /// reset.
    pub async fn last_reset_date(&self) -> DateTime<FixedOffset> {
        let fallback = time_utils::start_of_yesterday(self.now());

        let metadata = match self.db.get_reset_metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(error = %e, "Error getting last reset date, assuming yesterday");
                return fallback;
            }
        };

        let Some(stored) = metadata.and_then(|m| m.last_reset_date) else {
            tracing::debug!("No reset recorded yet");
            return fallback;
        };

        match time_utils::parse_in_offset(&stored, self.offset) {
            Some(date) => time_utils::start_of_day(date),
            None => {
                tracing::warn!(stored = %stored, "Unparsable lastResetDate, assuming yesterday");
                fallback
            }
        }
    }

    /// Timers the next reset would touch: team timers, plus the signed-in
    /// user's own cached timers (unless `team_only`).
    ///
    /// The user collection may still hold a previous user's timers while
    /// their subscription is alive; those are left out.
    pub fn timers_to_reset(&self, team_only: bool) -> Vec<Timer> {
        let mut timers = self.timers.team_timers().get();
        if !team_only {
            let session = SessionState::from(self.session.current_user());
            timers.extend(project_my_timers(&session, &self.timers.user_timers().get()));
        }

        let mut seen = HashSet::new();
        timers.retain(|timer| seen.insert(timer.id.clone()));
        timers
    }

    /// Reset cached timers to one hour, stopped, and record today as the
    /// last reset day. Returns the start of today.
    ///
    /// All writes are issued at once and awaited together. Any failure is
    /// reported as [`AppError::ResetIncomplete`]; writes that succeeded
    /// stay applied.
    pub async fn reset_all(&self, team_only: bool) -> Result<DateTime<FixedOffset>> {
        let today = time_utils::start_of_day(self.now());
        let targets = self.timers_to_reset(team_only);
        let marker = time_utils::format_utc_millis(today.with_timezone(&Utc));

        tracing::info!(count = targets.len(), team_only, "Resetting timers");

        let update = TimerUpdate::reset();
        let timer_writes = targets
            .iter()
            .map(|timer| self.timers.update(&timer.id, &update));

        let (timer_results, metadata_result) = tokio::join!(
            join_all(timer_writes),
            self.db.merge_reset_metadata(&marker)
        );

        let total = timer_results.len() + 1;
        let failures: Vec<AppError> = timer_results
            .into_iter()
            .chain(std::iter::once(metadata_result))
            .filter_map(|result| result.err())
            .collect();

        if let Some(first) = failures.first() {
            tracing::error!(
                failed = failures.len(),
                total,
                error = %first,
                "Error resetting timers"
            );
            return Err(AppError::ResetIncomplete {
                failed: failures.len(),
                total,
                first_error: first.to_string(),
            });
        }

        tracing::info!(date = %marker, "Timers reset");
        Ok(today)
    }

    /// Run [`reset_all`](Self::reset_all) for every timer if a reset is due.
    ///
    /// Returns whether a reset ran. Failures are logged and reported as
    /// `false`.
    pub async fn check_and_reset_if_needed(&self) -> bool {
        let _guard = self.check_lock.lock().await;

        let now = self.now();
        let today = time_utils::start_of_day(now);
        let last_reset = self.last_reset_date().await;

        let missed_reset = last_reset < today;
        let is_midnight = time_utils::is_exact_midnight(now);

        if !(missed_reset || is_midnight) {
            return false;
        }

        tracing::info!(
            %last_reset,
            %today,
            missed_reset,
            is_midnight,
            "Daily reset due"
        );

        match self.reset_all(false).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Error checking midnight reset");
                false
            }
        }
    }
}
