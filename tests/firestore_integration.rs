// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with: firebase emulators:exec --only firestore 'cargo test'
//!
//! The emulator provides a clean state for each test run.

use std::time::Duration;
use team_timers::error::AppError;
use team_timers::models::{NewTimer, TimerQuery, TimerUpdate, DEFAULT_TIME_REMAINING_SECS};
use team_timers::stores::TimerCollection;

mod common;
use common::{test_db, wait_for_timers};

/// Generate a unique owner ID for test isolation.
fn unique_uid() -> String {
    format!("uid-{}", team_timers::ids::random_id(12).unwrap())
}

// ═══════════════════════════════════════════════════════════════════════════
// TIMER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_timer_create_update_delete() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();

    let new_timer = NewTimer::personal("Alice", None, &uid, Some("alice@example.com"));
    let id = db.create_timer(&new_timer).await.unwrap();
    assert_eq!(id.len(), team_timers::ids::DOCUMENT_ID_LEN);

    let created = db.get_timer(&id).await.unwrap().expect("timer should exist");
    assert_eq!(created.id, id);
    assert_eq!(created.name, "Alice");
    assert_eq!(created.timer_label, "Alice's Timer");
    assert_eq!(created.time_remaining, DEFAULT_TIME_REMAINING_SECS);
    assert_eq!(created.user_id.as_deref(), Some(uid.as_str()));
    assert!(created.created_at.is_some(), "createdAt set by the server");
    assert!(created.last_updated.is_some(), "lastUpdated set by the server");

    db.update_timer(&id, &TimerUpdate::running(true)).await.unwrap();
    let updated = db.get_timer(&id).await.unwrap().unwrap();
    assert!(updated.is_running);
    assert_eq!(updated.name, "Alice", "masked update keeps other fields");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.last_updated >= created.last_updated);

    db.delete_timer(&id).await.unwrap();
    assert!(db.get_timer(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_of_deleted_timer_is_not_found() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();

    let id = db
        .create_timer(&NewTimer::personal("Gone", None, &uid, None))
        .await
        .unwrap();
    db.delete_timer(&id).await.unwrap();

    let err = db.update_timer(&id, &TimerUpdate::reset()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
    assert!(
        db.get_timer(&id).await.unwrap().is_none(),
        "update must not recreate the document"
    );
}

#[tokio::test]
async fn test_owned_query_is_ordered_by_creation() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();

    let mut ids = Vec::new();
    for name in ["Zulu", "Alpha", "Mike"] {
        let timer = NewTimer::personal(name, None, &uid, None);
        ids.push(db.create_timer(&timer).await.unwrap());
    }

    let timers = db
        .query_timers(&TimerQuery::OwnedBy(uid.clone()))
        .await
        .unwrap();
    let found: Vec<_> = timers.iter().map(|t| t.id.clone()).collect();
    assert_eq!(found, ids);

    for id in ids {
        db.delete_timer(&id).await.unwrap();
    }
}

#[tokio::test]
async fn test_team_query_excludes_personal_timers() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();

    let team_id = db.create_timer(&NewTimer::team("Pizza", None)).await.unwrap();
    let personal_id = db
        .create_timer(&NewTimer::personal("Alice", None, &uid, None))
        .await
        .unwrap();

    let team = db.query_timers(&TimerQuery::Team).await.unwrap();
    assert!(team.iter().any(|t| t.id == team_id));
    assert!(team.iter().all(|t| t.is_team_timer));
    assert!(team.iter().all(|t| t.id != personal_id));

    db.delete_timer(&team_id).await.unwrap();
    db.delete_timer(&personal_id).await.unwrap();
}

#[tokio::test]
async fn test_listener_tracks_changes() {
    require_emulator!();

    let db = test_db().await;
    let uid = unique_uid();
    let sink = TimerCollection::new();
    let mut rx = sink.subscribe();

    let subscription = db
        .watch_timers(TimerQuery::OwnedBy(uid.clone()), sink.clone())
        .await
        .unwrap();

    let id = db
        .create_timer(&NewTimer::personal("Alice", None, &uid, None))
        .await
        .unwrap();
    wait_for_timers(&mut rx, |t| t.iter().any(|timer| timer.id == id)).await;

    db.update_timer(&id, &TimerUpdate::time_remaining(90)).await.unwrap();
    wait_for_timers(&mut rx, |t| t.iter().any(|timer| timer.time_remaining == 90)).await;

    db.delete_timer(&id).await.unwrap();
    wait_for_timers(&mut rx, |t| t.is_empty()).await;

    subscription.cancel();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let late = db
        .create_timer(&NewTimer::personal("Late", None, &uid, None))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(sink.get().is_empty(), "cancelled listener must not deliver");

    db.delete_timer(&late).await.unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════
// METADATA TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_reset_metadata_merge() {
    require_emulator!();

    let db = test_db().await;

    db.merge_reset_metadata("2026-10-19T07:00:00.000Z")
        .await
        .unwrap();
    let first = db.get_reset_metadata().await.unwrap().expect("metadata exists");
    assert_eq!(
        first.last_reset_date.as_deref(),
        Some("2026-10-19T07:00:00.000Z")
    );
    assert!(first.last_reset_timestamp.is_some());

    db.merge_reset_metadata("2026-10-20T07:00:00.000Z")
        .await
        .unwrap();
    let second = db.get_reset_metadata().await.unwrap().unwrap();
    assert_eq!(
        second.last_reset_date.as_deref(),
        Some("2026-10-20T07:00:00.000Z")
    );
    assert!(second.last_reset_timestamp >= first.last_reset_timestamp);
}
