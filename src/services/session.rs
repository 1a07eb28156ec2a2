// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reactive session store over the auth provider.
//!
//! Mirrors the provider's current user into a [`SessionState`] channel
//! (starting at `Loading`) and keeps the last auth error for the UI.

use crate::error::AppError;
use crate::models::{AuthUser, SessionState};
use crate::services::AuthProvider;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Session state and credential operations.
pub struct SessionStore {
    provider: AuthProvider,
    state: Arc<watch::Sender<SessionState>>,
    last_error: watch::Sender<Option<String>>,
    forwarder: JoinHandle<()>,
}

impl SessionStore {
    /// Start mirroring `provider`. Must be called inside a Tokio runtime.
    pub fn new(provider: AuthProvider) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        let state = Arc::new(state);
        let (last_error, _) = watch::channel(None);

        let mut users = provider.watch();
        let forward_to = state.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                let user = users.borrow_and_update().clone();
                tracing::debug!(uid = ?user.as_ref().map(|u| &u.uid), "Auth state changed");
                forward_to.send_replace(SessionState::from(user));

                if users.changed().await.is_err() {
                    break;
                }
            }
        });

        Self {
            provider,
            state,
            last_error,
            forwarder,
        }
    }

    /// Observe the session. Emits on every sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current session value (may still be `Loading`).
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Synchronous snapshot straight from the provider.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.provider.current_user()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        self.last_error.subscribe()
    }

    /// Create an account; the provider signs it in.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        self.last_error.send_replace(None);
        let result = self.provider.create_user(email, password).await;
        self.record(result, "register")
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        self.last_error.send_replace(None);
        let result = self.provider.sign_in(email, password).await;
        self.record(result, "login")
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.last_error.send_replace(None);
        let result = self.provider.sign_out().await;
        self.record(result, "logout")
    }

    /// Copy a failure into the shared error value and hand it back.
    fn record<T>(&self, result: Result<T, AppError>, operation: &str) -> Result<T, AppError> {
        result.map_err(|e| {
            let message = match &e {
                AppError::Auth { message } => message.clone(),
                other => other.to_string(),
            };
            tracing::warn!(operation, error = %message, "Auth operation failed");
            self.last_error.send_replace(Some(message.clone()));
            match e {
                AppError::Auth { .. } => e,
                _ => AppError::Auth { message },
            }
        })
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}
