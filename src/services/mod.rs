// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod reset;
pub mod session;
pub mod timers;

pub use auth::AuthProvider;
pub use reset::ResetScheduler;
pub use session::SessionStore;
pub use timers::TimerRepository;
