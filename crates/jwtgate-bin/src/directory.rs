// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration-backed user directory.
//!
//! Users live in the `users` section of the configuration file with argon2
//! password hashes. The directory is the [`AuthProvider`] the server runs
//! with.

use std::collections::HashMap;

use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use async_trait::async_trait;
use jwtgate_core::{AuthError, AuthProvider, AuthResult, UserData};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

// =============================================================================
// UserEntry
// =============================================================================

/// One user of the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    /// Login subject.
    pub username: String,
    /// Argon2 PHC string, see `jwtgate hash-password`.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Disabled users pass the password check but get no tokens.
    #[serde(default)]
    pub disabled: bool,
    /// Signed into every access token issued to this user.
    #[serde(default = "empty_user_data")]
    pub user_data: UserData,
}

fn empty_user_data() -> UserData {
    UserData::Object(Default::default())
}

impl UserEntry {
    /// Creates an enabled user with empty user data.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            disabled: false,
            user_data: empty_user_data(),
        }
    }

    /// Sets the user data.
    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = user_data;
        self
    }

    /// Marks the user as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)?;

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verifies a password against a PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// =============================================================================
// DirectoryProvider
// =============================================================================

/// [`AuthProvider`] over a fixed set of users.
#[derive(Debug, Default)]
pub struct DirectoryProvider {
    users: HashMap<String, UserEntry>,
}

impl DirectoryProvider {
    /// Creates a directory from configured users. Later duplicates win.
    pub fn new(users: impl IntoIterator<Item = UserEntry>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
        }
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if the directory has no users.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl AuthProvider for DirectoryProvider {
    async fn check_credential(&self, subject: &str, secret: &str) -> bool {
        let Some(user) = self.users.get(subject) else {
            return false;
        };

        let hash = user.password_hash.clone();
        let secret = secret.to_owned();

        // argon2 is deliberately slow
        tokio::task::spawn_blocking(move || verify_password(&secret, &hash))
            .await
            .unwrap_or(false)
    }

    async fn create_user_data(&self, subject: &str) -> AuthResult<UserData> {
        match self.users.get(subject) {
            None => Err(AuthError::invalid_subject("unknown subject")),
            Some(user) if user.disabled => Err(AuthError::invalid_subject("subject is disabled")),
            Some(user) => Ok(user.user_data.clone()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
