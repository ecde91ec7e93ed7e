//! User domain model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Opaque reference to a resolved identity
///
/// Handles are only minted by the credential store after a successful
/// authenticate or resolve, so holding one means the identity exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserHandle(i64);

impl UserHandle {
    pub(crate) fn from_raw(id: i64) -> Self {
        Self(id)
    }

    pub(crate) fn raw(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

/// A registered user as stored by the credential store
///
/// `secret_hash` is an Argon2id PHC string; it is never serialized.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    #[serde(skip)]
    pub handle: UserHandle,
    pub username: String,
    #[serde(skip)]
    pub secret_hash: String,
}

impl User {
    pub fn new(handle: UserHandle, username: impl Into<String>, secret_hash: impl Into<String>) -> Self {
        Self {
            handle,
            username: username.into(),
            secret_hash: secret_hash.into(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("handle", &self.handle)
            .field("username", &self.username)
            .field("secret_hash", &"<redacted>")
            .finish()
    }
}

/// Username and secret presented by a caller
///
/// Used both as the registration payload and as per-request credentials.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(rename = "password")]
    secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Reject empty usernames and secrets
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::invalid_input("username must not be empty"));
        }
        if self.secret.is_empty() {
            return Err(Error::invalid_input("password must not be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}
