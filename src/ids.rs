// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random document and user identifiers.

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of Firestore auto-generated document IDs.
pub const DOCUMENT_ID_LEN: usize = 20;
/// Length of Firebase Auth user IDs.
pub const USER_ID_LEN: usize = 28;

/// Generate a random alphanumeric identifier of `len` characters.
pub fn random_id(len: usize) -> Result<String, AppError> {
    let rng = SystemRandom::new();
    let mut id = String::with_capacity(len);

    while id.len() < len {
        let mut bytes = [0u8; 32];
        rng.fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG unavailable")))?;
        // Rejection sampling keeps the distribution uniform: 248 = 4 * 62
        id.extend(
            bytes
                .iter()
                .filter(|b| **b < 248)
                .map(|b| ALPHABET[(*b as usize) % ALPHABET.len()] as char)
                .take(len - id.len()),
        );
    }

    Ok(id)
}

/// Auto ID for a new document.
pub fn document_id() -> Result<String, AppError> {
    random_id(DOCUMENT_ID_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_alphanumeric_and_distinct() {
        let a = document_id().unwrap();
        let b = document_id().unwrap();
        assert_eq!(a.len(), DOCUMENT_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
        assert_eq!(random_id(USER_ID_LEN).unwrap().len(), USER_ID_LEN);
    }
}
