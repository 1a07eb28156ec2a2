// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use team_timers::error::AppError;

#[test]
fn test_is_caller_error_matches() {
    assert!(AppError::Validation("Must be logged in".to_string()).is_caller_error());
    assert!(AppError::NotFound("Timer not found".to_string()).is_caller_error());
    assert!(AppError::PermissionDenied("no".to_string()).is_caller_error());
}

#[test]
fn test_is_caller_error_no_match() {
    assert!(!AppError::auth("EMAIL_EXISTS").is_caller_error());
    assert!(!AppError::Database("unavailable".to_string()).is_caller_error());
    assert!(!AppError::Internal(anyhow::anyhow!("boom")).is_caller_error());

    let err = AppError::ResetIncomplete {
        failed: 1,
        total: 4,
        first_error: "timeout".to_string(),
    };
    assert!(!err.is_caller_error());
}

#[test]
fn test_reset_incomplete_display() {
    let err = AppError::ResetIncomplete {
        failed: 2,
        total: 5,
        first_error: "Database error: deadline exceeded".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Reset incomplete: 2 of 5 writes failed (first error: Database error: deadline exceeded)"
    );
}

#[test]
fn test_auth_error_carries_provider_message() {
    let err = AppError::auth("WEAK_PASSWORD : Password should be at least 6 characters");
    match &err {
        AppError::Auth { message } => assert!(message.starts_with("WEAK_PASSWORD")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Authentication failed: WEAK_PASSWORD : Password should be at least 6 characters"
    );
}
