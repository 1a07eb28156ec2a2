// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Timer model for storage and the reactive stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A fresh timer starts with one hour on the clock.
pub const DEFAULT_TIME_REMAINING_SECS: i64 = 60 * 60;

/// Countdown timer stored in the `timers` collection.
///
/// Either a personal timer (`is_team_timer == false`, owned by `user_id`)
/// or a team timer (`is_team_timer == true`, no owner, colored by name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    /// Document ID (assigned by the database)
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Human label, defaults to "<name>'s Timer"
    pub timer_label: String,
    /// Seconds left on the countdown
    pub time_remaining: i64,
    pub is_running: bool,
    /// Owner UID (None for team timers)
    #[serde(default)]
    pub user_id: Option<String>,
    /// Owner email (None for team timers)
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub is_team_timer: bool,
    /// Palette color (team timers only)
    #[serde(default)]
    pub color: Option<String>,
    /// Server time of creation
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub created_at: Option<DateTime<Utc>>,
    /// Server time of the last write
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Timer {
    /// Whether `uid` may modify this timer.
    ///
    /// Team timers are open to everyone. Personal timers are guarded only
    /// when someone is signed in; a signed-out caller is not checked.
    pub fn can_be_modified_by(&self, uid: Option<&str>) -> bool {
        if self.is_team_timer {
            return true;
        }
        match uid {
            Some(uid) => self.user_id.as_deref() == Some(uid),
            None => true,
        }
    }

    /// Whether this timer belongs to the query's result set.
    pub fn matches(&self, query: &TimerQuery) -> bool {
        match query {
            TimerQuery::OwnedBy(uid) => self.user_id.as_deref() == Some(uid.as_str()),
            TimerQuery::Team => self.is_team_timer,
        }
    }
}

/// Document written when a timer is created.
///
/// `createdAt` and `lastUpdated` are not part of it: the database
/// assigns both at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimer {
    pub name: String,
    pub timer_label: String,
    pub time_remaining: i64,
    pub is_running: bool,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub is_team_timer: bool,
    pub color: Option<String>,
}

impl NewTimer {
    /// A personal timer owned by `uid`.
    pub fn personal(name: &str, label: Option<&str>, uid: &str, email: Option<&str>) -> Self {
        Self {
            user_id: Some(uid.to_string()),
            user_email: email.map(str::to_string),
            ..Self::base(name, label)
        }
    }

    /// A team timer, colored by its name.
    pub fn team(name: &str, label: Option<&str>) -> Self {
        Self {
            is_team_timer: true,
            color: Some(crate::color::color_for(name).to_string()),
            ..Self::base(name, label)
        }
    }

    fn base(name: &str, label: Option<&str>) -> Self {
        let timer_label = match label {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => format!("{}'s Timer", name),
        };

        Self {
            name: name.to_string(),
            timer_label,
            time_remaining: DEFAULT_TIME_REMAINING_SECS,
            is_running: false,
            user_id: None,
            user_email: None,
            is_team_timer: false,
            color: None,
        }
    }

    /// Materialize the stored timer once the database assigned id and time.
    pub fn into_timer(self, id: String, server_time: DateTime<Utc>) -> Timer {
        Timer {
            id,
            name: self.name,
            timer_label: self.timer_label,
            time_remaining: self.time_remaining,
            is_running: self.is_running,
            user_id: self.user_id,
            user_email: self.user_email,
            is_team_timer: self.is_team_timer,
            color: self.color,
            created_at: Some(server_time),
            last_updated: Some(server_time),
        }
    }
}

/// Partial set of timer fields to merge into an existing document.
///
/// Only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TimerUpdate {
    /// Back to one hour, stopped.
    pub fn reset() -> Self {
        Self {
            time_remaining: Some(DEFAULT_TIME_REMAINING_SECS),
            is_running: Some(false),
            ..Default::default()
        }
    }

    pub fn running(is_running: bool) -> Self {
        Self {
            is_running: Some(is_running),
            ..Default::default()
        }
    }

    pub fn time_remaining(seconds: i64) -> Self {
        Self {
            time_remaining: Some(seconds),
            ..Default::default()
        }
    }

    /// Stored field names this update writes (the update mask).
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.name.is_some() {
            paths.push("name");
        }
        if self.timer_label.is_some() {
            paths.push("timerLabel");
        }
        if self.time_remaining.is_some() {
            paths.push("timeRemaining");
        }
        if self.is_running.is_some() {
            paths.push("isRunning");
        }
        if self.color.is_some() {
            paths.push("color");
        }
        paths
    }

    /// Merge into an in-memory timer.
    pub fn apply_to(&self, timer: &mut Timer) {
        if let Some(name) = &self.name {
            timer.name = name.clone();
        }
        if let Some(label) = &self.timer_label {
            timer.timer_label = label.clone();
        }
        if let Some(seconds) = self.time_remaining {
            timer.time_remaining = seconds;
        }
        if let Some(is_running) = self.is_running {
            timer.is_running = is_running;
        }
        if let Some(color) = &self.color {
            timer.color = Some(color.clone());
        }
    }
}

/// The two realtime queries the stores subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerQuery {
    /// Personal timers of one user (`userId == uid`)
    OwnedBy(String),
    /// All team timers (`isTeamTimer == true`)
    Team,
}
