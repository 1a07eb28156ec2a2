// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timer repository: CRUD and realtime subscriptions on `timers`.
//!
//! Ownership rules are enforced here, against the session's current user:
//! - anyone may create a team timer; personal timers need a signed-in user
//! - team timers may be changed by anyone
//! - a personal timer may not be changed by a different signed-in user

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{NewTimer, Timer, TimerQuery, TimerUpdate};
use crate::services::SessionStore;
use crate::stores::{MyTimersView, Subscription, TimerCollection};
use std::sync::Arc;

/// Timer CRUD gated by ownership, plus the two shared collections.
#[derive(Clone)]
pub struct TimerRepository {
    db: Database,
    session: Arc<SessionStore>,
    user_timers: TimerCollection,
    team_timers: TimerCollection,
}

impl TimerRepository {
    pub fn new(db: Database, session: Arc<SessionStore>) -> Self {
        Self {
            db,
            session,
            user_timers: TimerCollection::new(),
            team_timers: TimerCollection::new(),
        }
    }

    /// Timers of the subscribed user, in creation order.
    pub fn user_timers(&self) -> &TimerCollection {
        &self.user_timers
    }

    /// Team timers, in creation order.
    pub fn team_timers(&self) -> &TimerCollection {
        &self.team_timers
    }

    /// The signed-in user's own timers.
    pub fn my_timers(&self) -> MyTimersView {
        MyTimersView::new(self.session.subscribe(), self.user_timers.subscribe())
    }

    /// Stream `user_id`'s timers into the user collection.
    pub async fn subscribe_user_timers(&self, user_id: &str) -> Result<Subscription> {
        tracing::debug!(user_id, "Subscribing to user timers");
        self.db
            .watch_timers(
                TimerQuery::OwnedBy(user_id.to_string()),
                self.user_timers.clone(),
            )
            .await
    }

    /// Stream team timers into the team collection.
    pub async fn subscribe_team_timers(&self) -> Result<Subscription> {
        tracing::debug!("Subscribing to team timers");
        self.db
            .watch_timers(TimerQuery::Team, self.team_timers.clone())
            .await
    }

    /// Create a timer. Returns the new document ID.
    ///
    /// Personal timers belong to the signed-in user; team timers belong to
    /// nobody and get a color derived from `name`.
    pub async fn add(&self, name: &str, label: Option<&str>, is_team_timer: bool) -> Result<String> {
        let timer = if is_team_timer {
            NewTimer::team(name, label)
        } else {
            let user = self.session.current_user().ok_or_else(|| {
                AppError::Validation("You must be logged in to add a personal timer".to_string())
            })?;
            NewTimer::personal(name, label, &user.uid, user.email.as_deref())
        };

        let id = self.db.create_timer(&timer).await.map_err(|e| {
            tracing::error!(error = %e, timer_name = name, "Error adding timer");
            e
        })?;

        tracing::info!(timer_id = %id, team = is_team_timer, "Timer added");
        Ok(id)
    }

    /// Merge `update` into a timer and stamp `lastUpdated`.
    ///
    /// The ownership check and the write are separate round trips; a
    /// concurrent writer in between wins or loses by write order.
    pub async fn update(&self, id: &str, update: &TimerUpdate) -> Result<()> {
        self.authorize(id, "update").await?;

        self.db.update_timer(id, update).await.map_err(|e| {
            tracing::error!(error = %e, timer_id = id, "Error updating timer");
            e
        })
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.authorize(id, "delete").await?;

        self.db.delete_timer(id).await.map_err(|e| {
            tracing::error!(error = %e, timer_id = id, "Error removing timer");
            e
        })?;

        tracing::info!(timer_id = id, "Timer removed");
        Ok(())
    }

    /// Load the timer and check the current user may modify it.
    async fn authorize(&self, id: &str, action: &str) -> Result<Timer> {
        let timer = self
            .db
            .get_timer(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Timer {} not found", id)))?;

        let user = self.session.current_user();
        if !timer.can_be_modified_by(user.as_ref().map(|u| u.uid.as_str())) {
            tracing::warn!(timer_id = id, action, "Timer permission denied");
            return Err(AppError::PermissionDenied(format!(
                "You don't have permission to {} this timer",
                action
            )));
        }

        Ok(timer)
    }
}
