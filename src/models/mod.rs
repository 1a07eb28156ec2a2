// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod metadata;
pub mod session;
pub mod timer;

pub use metadata::{ResetMarker, ResetMetadata};
pub use session::{AuthUser, Credentials, SessionState};
pub use timer::{NewTimer, Timer, TimerQuery, TimerUpdate, DEFAULT_TIME_REMAINING_SECS};
