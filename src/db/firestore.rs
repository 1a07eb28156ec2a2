// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Timers (CRUD, ordered queries and realtime listeners)
//! - Reset metadata (`system/metadata`, merged on write)
//!
//! Timestamps are never sent by the client: `createdAt`, `lastUpdated` and
//! `lastResetTimestamp` are set with `REQUEST_TIME` field transforms.

use crate::db::collections;
use crate::error::AppError;
use crate::ids;
use crate::models::{NewTimer, ResetMarker, ResetMetadata, Timer, TimerQuery, TimerUpdate};
use crate::stores::{Subscription, TimerCollection};
use firestore::errors::FirestoreError;
use firestore::{
    FirestoreListenerTarget, FirestoreMemListenStateStorage, FirestoreQueryDirection,
    FirestoreTransformServerValue, FirestoreWritePrecondition,
};
use tokio::sync::{mpsc, oneshot};

/// Every listener carries a single target.
const LISTEN_TARGET_ID: u32 = 1;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. All database operations return an error.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Timer Operations ────────────────────────────────────────

    /// Get a timer by document ID.
    pub async fn get_timer(&self, id: &str) -> Result<Option<Timer>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TIMERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a timer under a fresh auto ID.
    pub async fn create_timer(&self, timer: &NewTimer) -> Result<String, AppError> {
        let id = ids::document_id()?;

        let _created: Timer = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TIMERS)
            .document_id(&id)
            .object(timer)
            .transforms(|t| {
                t.fields([
                    t.field("createdAt")
                        .server_value(FirestoreTransformServerValue::RequestTime),
                    t.field("lastUpdated")
                        .server_value(FirestoreTransformServerValue::RequestTime),
                ])
            })
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(timer_id = %id, team = timer.is_team_timer, "Timer created");
        Ok(id)
    }

    /// Write only the fields present in `update`, stamping `lastUpdated`.
    ///
    /// Fails with `NotFound` instead of creating a partial document when
    /// the timer no longer exists.
    pub async fn update_timer(&self, id: &str, update: &TimerUpdate) -> Result<(), AppError> {
        let _updated: Timer = self
            .get_client()?
            .fluent()
            .update()
            .fields(update.field_paths())
            .in_col(collections::TIMERS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .object(update)
            .transforms(|t| {
                t.fields([t
                    .field("lastUpdated")
                    .server_value(FirestoreTransformServerValue::RequestTime)])
            })
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataNotFoundError(_) => {
                    AppError::NotFound(format!("Timer {} not found", id))
                }
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    pub async fn delete_timer(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TIMERS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Run one of the timer queries, ordered by creation time.
    pub async fn query_timers(&self, query: &TimerQuery) -> Result<Vec<Timer>, AppError> {
        let query = query.clone();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::TIMERS)
            .filter(move |q| match &query {
                TimerQuery::OwnedBy(uid) => q.field("userId").eq(uid.clone()),
                TimerQuery::Team => q.field("isTeamTimer").eq(true),
            })
            .order_by([("createdAt", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mirror a query into `sink` until the returned subscription ends.
    ///
    /// The listen stream only tells us that something under the target
    /// changed; each notification triggers a fresh ordered query so the
    /// sink always holds a complete, sorted snapshot.
    pub async fn watch_timers(
        &self,
        query: TimerQuery,
        sink: TimerCollection,
    ) -> Result<Subscription, AppError> {
        let client = self.get_client()?;

        let mut listener = client
            .create_listener(FirestoreMemListenStateStorage::new())
            .await
            .map_err(|e| AppError::Database(format!("Failed to create listener: {}", e)))?;

        let target_query = query.clone();
        client
            .fluent()
            .select()
            .from(collections::TIMERS)
            .filter(move |q| match &target_query {
                TimerQuery::OwnedBy(uid) => q.field("userId").eq(uid.clone()),
                TimerQuery::Team => q.field("isTeamTimer").eq(true),
            })
            .listen()
            .add_target(FirestoreListenerTarget::new(LISTEN_TARGET_ID), &mut listener)
            .map_err(|e| AppError::Database(format!("Failed to add listen target: {}", e)))?;

        sink.set(self.query_timers(&query).await?);

        let (changed_tx, mut changed_rx) = mpsc::unbounded_channel::<()>();
        listener
            .start(move |_event| {
                let changed_tx = changed_tx.clone();
                async move {
                    let _ = changed_tx.send(());
                    Ok(())
                }
            })
            .await
            .map_err(|e| AppError::Database(format!("Failed to start listener: {}", e)))?;

        tracing::debug!(?query, "Timer listener started");

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let db = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    changed = changed_rx.recv() => {
                        if changed.is_none() {
                            break;
                        }
                        // Coalesce bursts into one refresh
                        while changed_rx.try_recv().is_ok() {}

                        match db.query_timers(&query).await {
                            Ok(timers) => sink.set(timers),
                            Err(e) => {
                                tracing::error!(error = %e, ?query, "Failed to refresh timers")
                            }
                        }
                    }
                }
            }

            if let Err(e) = listener.shutdown().await {
                tracing::warn!(error = %e, "Timer listener shutdown failed");
            }
            tracing::debug!(?query, "Timer listener stopped");
        });

        Ok(Subscription::new(move || {
            let _ = stop_tx.send(());
        }))
    }

    // ─── Metadata Operations ─────────────────────────────────────

    pub async fn get_reset_metadata(&self) -> Result<Option<ResetMetadata>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SYSTEM)
            .obj()
            .one(collections::METADATA_DOC)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Upsert the reset marker. The update mask limits the write to
    /// `lastResetDate`; the timestamp comes from a server transform.
    pub async fn merge_reset_metadata(&self, last_reset_date: &str) -> Result<(), AppError> {
        let marker = ResetMarker {
            last_reset_date: last_reset_date.to_string(),
        };

        let _merged: ResetMetadata = self
            .get_client()?
            .fluent()
            .update()
            .fields(["lastResetDate"])
            .in_col(collections::SYSTEM)
            .document_id(collections::METADATA_DOC)
            .object(&marker)
            .transforms(|t| {
                t.fields([t
                    .field("lastResetTimestamp")
                    .server_value(FirestoreTransformServerValue::RequestTime)])
            })
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use serde::Serialize;

    /// Shape the fluent update builder requires of a written object.
    fn writable<T: Serialize + DeserializeOwned>() {}

    #[test]
    fn test_written_models_are_update_objects() {
        writable::<NewTimer>();
        writable::<TimerUpdate>();
        writable::<ResetMarker>();
    }

    #[test]
    fn test_partial_update_reads_back_from_stored_fields() {
        let update: TimerUpdate =
            serde_json::from_value(serde_json::json!({ "timeRemaining": 3600, "isRunning": false }))
                .unwrap();
        assert_eq!(update, TimerUpdate::reset());
    }
}
