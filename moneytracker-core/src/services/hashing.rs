//! Secret hashing with Argon2id
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`),
//! so verification always uses the salt and cost recorded at hashing time.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;

use crate::domain::{Error, HashingParams, Result};

/// Salt length in bytes
const SALT_LEN: usize = 16;

/// Hashes and verifies user secrets
#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl SecretHasher {
    /// Build a hasher for the given work factor
    ///
    /// Fails when Argon2 rejects the parameters (e.g. memory below 8 KiB per lane).
    pub fn new(params: &HashingParams) -> Result<Self> {
        let argon2_params = Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            None,
        )
        .map_err(|e| Error::Hashing(format!("invalid argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params),
        })
    }

    /// Hash a secret under a fresh random salt
    pub fn hash(&self, secret: &str) -> Result<String> {
        let salt_bytes: [u8; SALT_LEN] = rand::thread_rng().gen();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| Error::Hashing(format!("failed to encode salt: {}", e)))?;

        let hash = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| Error::Hashing(format!("failed to hash secret: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check a secret against a stored PHC string
    ///
    /// The digest comparison is constant time. A malformed stored hash is an
    /// error rather than a mismatch.
    pub fn verify(&self, secret: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| Error::Hashing(format!("malformed stored hash: {}", e)))?;

        match self.argon2.verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Hashing(format!("failed to verify secret: {}", e))),
        }
    }
}
