// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reactive state containers shared between the services and the UI.
//!
//! Each store has exactly one writer (the service that owns it) and any
//! number of readers, who either take a snapshot or subscribe to changes.

use crate::models::{SessionState, Timer};
use std::sync::Arc;
use tokio::sync::watch;

/// Ordered collection of timers fed by a realtime subscription.
#[derive(Clone)]
pub struct TimerCollection {
    tx: Arc<watch::Sender<Vec<Timer>>>,
}

impl Default for TimerCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerCollection {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the current contents.
    pub fn get(&self) -> Vec<Timer> {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Timer>> {
        self.tx.subscribe()
    }

    /// Replace the whole collection.
    pub fn set(&self, timers: Vec<Timer>) {
        self.tx.send_replace(timers);
    }
}

/// Handle to a live subscription. The listener stops when the handle is
/// cancelled or dropped, whichever happens first.
#[must_use = "dropping a Subscription stops it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop receiving updates.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// The signed-in user's own timers, or nothing while signed out.
pub fn project_my_timers(session: &SessionState, timers: &[Timer]) -> Vec<Timer> {
    match session.user() {
        Some(user) => timers
            .iter()
            .filter(|timer| timer.user_id.as_deref() == Some(user.uid.as_str()))
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// "My timers": [`project_my_timers`] over the session and the user
/// collection, re-applied whenever either source changes.
pub struct MyTimersView {
    session: watch::Receiver<SessionState>,
    timers: watch::Receiver<Vec<Timer>>,
}

impl MyTimersView {
    pub fn new(session: watch::Receiver<SessionState>, timers: watch::Receiver<Vec<Timer>>) -> Self {
        Self { session, timers }
    }

    /// Current projection.
    pub fn get(&self) -> Vec<Timer> {
        project_my_timers(&self.session.borrow(), &self.timers.borrow())
    }

    /// Wait until either source changes, then return the new projection.
    ///
    /// Returns `None` once both sources are closed.
    pub async fn changed(&mut self) -> Option<Vec<Timer>> {
        tokio::select! {
            res = self.session.changed() => {
                if res.is_err() {
                    self.timers.changed().await.ok()?;
                }
            }
            res = self.timers.changed() => {
                if res.is_err() {
                    self.session.changed().await.ok()?;
                }
            }
        }
        self.session.mark_unchanged();
        self.timers.mark_unchanged();
        Some(self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthUser, NewTimer};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn timer(id: &str, owner: &str) -> Timer {
        NewTimer::personal(id, None, owner, None).into_timer(id.to_string(), Utc::now())
    }

    fn signed_in(uid: &str) -> SessionState {
        SessionState::SignedIn(AuthUser {
            uid: uid.to_string(),
            email: None,
        })
    }

    #[test]
    fn test_projection_filters_by_owner() {
        let timers = vec![timer("a", "alice"), timer("b", "bob"), timer("c", "alice")];

        let mine = project_my_timers(&signed_in("alice"), &timers);
        let ids: Vec<_> = mine.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        assert!(project_my_timers(&SessionState::SignedOut, &timers).is_empty());
        assert!(project_my_timers(&SessionState::Loading, &timers).is_empty());
    }

    #[test]
    fn test_subscription_cancels_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let counter = calls.clone();
        {
            let _sub = Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_view_follows_both_sources() {
        let (session_tx, session_rx) = watch::channel(SessionState::Loading);
        let timers = TimerCollection::new();
        let mut view = MyTimersView::new(session_rx, timers.subscribe());

        timers.set(vec![timer("a", "alice"), timer("b", "bob")]);
        assert!(view.changed().await.unwrap().is_empty());

        session_tx.send_replace(signed_in("bob"));
        let mine = view.changed().await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "b");
        assert_eq!(view.get(), mine);
    }
}
