// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication provider.
//!
//! Two backends:
//! - Firebase Authentication through its REST API (production, or the
//!   auth emulator when `FIREBASE_AUTH_EMULATOR_HOST` is set)
//! - An in-memory account table for tests and offline runs
//!
//! Either way the provider owns the "current user" and publishes every
//! change on a watch channel, the way the Firebase SDK's auth state
//! listener does.

use crate::error::AppError;
use crate::ids;
use crate::models::{AuthUser, Credentials};
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;

const FIREBASE_AUTH_HOST: &str = "https://identitytoolkit.googleapis.com";

/// Authentication provider shared by the session store.
#[derive(Clone)]
pub struct AuthProvider {
    backend: Backend,
    current: Arc<watch::Sender<Option<AuthUser>>>,
}

#[derive(Clone)]
enum Backend {
    Firebase(FirebaseAuthClient),
    Memory(Arc<MemoryAccounts>),
}

impl AuthProvider {
    /// Firebase Auth REST backend.
    pub fn firebase(api_key: String, emulator_host: Option<&str>) -> Self {
        let base_url = match emulator_host {
            Some(host) => {
                tracing::info!(host, "Using Firebase Auth emulator");
                format!("http://{}/identitytoolkit.googleapis.com", host)
            }
            None => FIREBASE_AUTH_HOST.to_string(),
        };
        Self::with_backend(Backend::Firebase(FirebaseAuthClient::new(api_key, base_url)))
    }

    /// In-memory backend with no accounts.
    pub fn in_memory() -> Self {
        Self::with_backend(Backend::Memory(Arc::new(MemoryAccounts::default())))
    }

    fn with_backend(backend: Backend) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            backend,
            current: Arc::new(current),
        }
    }

    /// Create an account and sign it in.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let credentials = Credentials::new(email, password);
        credentials.check().map_err(AppError::auth)?;

        let user = match &self.backend {
            Backend::Firebase(client) => client.sign_up(&credentials).await?,
            Backend::Memory(accounts) => accounts.create(&credentials)?,
        };

        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign in an existing account.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        let credentials = Credentials::new(email, password);

        let user = match &self.backend {
            Backend::Firebase(client) => client.sign_in(&credentials).await?,
            Backend::Memory(accounts) => accounts.verify(&credentials)?,
        };

        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }

    /// Sign out. The REST API keeps no server-side session, so this only
    /// clears local state.
    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.current.send_replace(None);
        Ok(())
    }

    /// Synchronous snapshot of the signed-in user.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    /// Observe auth state changes. The receiver's first value is the
    /// state at subscription time.
    pub fn watch(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }

    /// Drop the session from the provider side (expired or revoked token).
    pub fn revoke_session(&self) {
        tracing::info!("Auth session revoked by provider");
        self.current.send_replace(None);
    }
}

// ─── Firebase REST ───────────────────────────────────────────────

/// Response of `accounts:signUp` and `accounts:signInWithPassword`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
struct FirebaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FirebaseAuthClient {
    fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<AuthUser, AppError> {
        self.password_request("accounts:signUp", credentials).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthUser, AppError> {
        self.password_request("accounts:signInWithPassword", credentials)
            .await
    }

    async fn password_request(
        &self,
        method: &str,
        credentials: &Credentials,
    ) -> Result<AuthUser, AppError> {
        let url = format!("{}/v1/{}", self.base_url, method);

        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::auth(format!("Network request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, text));
            tracing::debug!(method, %status, error = %message, "Firebase Auth rejected request");
            return Err(AppError::auth(message));
        }

        let signed_in: SignInResponse = response
            .json()
            .await
            .map_err(|e| AppError::auth(format!("JSON parse error: {}", e)))?;

        Ok(AuthUser {
            uid: signed_in.local_id,
            email: signed_in.email,
        })
    }
}

// ─── In-memory accounts ──────────────────────────────────────────

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
struct MemoryAccounts {
    /// Keyed by lowercased email
    accounts: DashMap<String, Account>,
}

impl MemoryAccounts {
    fn create(&self, credentials: &Credentials) -> Result<AuthUser, AppError> {
        let key = credentials.email.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(AppError::auth("EMAIL_EXISTS"));
        }

        let uid = ids::random_id(ids::USER_ID_LEN)?;
        self.accounts.insert(
            key,
            Account {
                uid: uid.clone(),
                password: credentials.password.clone(),
            },
        );

        Ok(AuthUser {
            uid,
            email: Some(credentials.email.clone()),
        })
    }

    fn verify(&self, credentials: &Credentials) -> Result<AuthUser, AppError> {
        match self.accounts.get(&credentials.email.to_lowercase()) {
            Some(account) if account.password == credentials.password => Ok(AuthUser {
                uid: account.uid.clone(),
                email: Some(credentials.email.clone()),
            }),
            _ => Err(AppError::auth("INVALID_LOGIN_CREDENTIALS")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sign_up_then_sign_in() {
        let auth = AuthProvider::in_memory();
        let created = auth.create_user("Alice@Example.com", "hunter22").await.unwrap();
        assert_eq!(auth.current_user(), Some(created.clone()));

        auth.sign_out().await.unwrap();
        assert_eq!(auth.current_user(), None);

        let signed_in = auth.sign_in("alice@example.com", "hunter22").await.unwrap();
        assert_eq!(signed_in.uid, created.uid);
    }

    #[tokio::test]
    async fn test_memory_rejections_use_provider_messages() {
        let auth = AuthProvider::in_memory();
        auth.create_user("bob@example.com", "hunter22").await.unwrap();

        let err = auth.create_user("bob@example.com", "hunter22").await.unwrap_err();
        assert!(matches!(err, AppError::Auth { message } if message == "EMAIL_EXISTS"));

        let err = auth.sign_in("bob@example.com", "wrong-password").await.unwrap_err();
        assert!(
            matches!(err, AppError::Auth { message } if message == "INVALID_LOGIN_CREDENTIALS")
        );

        let err = auth.create_user("carol@example.com", "abc").await.unwrap_err();
        assert!(matches!(err, AppError::Auth { message } if message.starts_with("WEAK_PASSWORD")));
    }

    #[test]
    fn test_firebase_error_envelope_parses() {
        let text = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[]}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(text).unwrap();
        assert_eq!(envelope.error.message, "EMAIL_NOT_FOUND");
    }

    #[test]
    fn test_emulator_base_url() {
        let auth = AuthProvider::firebase("key".to_string(), Some("localhost:9099"));
        match &auth.backend {
            Backend::Firebase(client) => assert_eq!(
                client.base_url,
                "http://localhost:9099/identitytoolkit.googleapis.com"
            ),
            Backend::Memory(_) => panic!("expected firebase backend"),
        }
    }
}
