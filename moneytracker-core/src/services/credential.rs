//! Credential store - registration and secret verification
//!
//! Owns user identity records. Plaintext secrets only live for the duration
//! of a call; the repository sees Argon2id hashes.

use std::sync::Arc;

use tracing::{debug, info};

use super::hashing::SecretHasher;
use crate::domain::{Credentials, Error, HashingParams, Result, User, UserHandle};
use crate::ports::UserRepository;

/// Hashed when authenticating an unknown username so both failure paths
/// spend one Argon2 verification
const DUMMY_SECRET: &str = "moneytracker-unknown-identity";

/// Registration, authentication and identity resolution
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    hasher: SecretHasher,
    dummy_hash: String,
}

impl CredentialStore {
    /// Create a credential store over a user repository
    pub fn new(users: Arc<dyn UserRepository>, params: &HashingParams) -> Result<Self> {
        let hasher = SecretHasher::new(params)?;
        let dummy_hash = hasher.hash(DUMMY_SECRET)?;
        Ok(Self {
            users,
            hasher,
            dummy_hash,
        })
    }

    /// Register a new user
    ///
    /// Fails with `InvalidInput` for an empty username or secret and with
    /// `DuplicateIdentity` when the username is taken. The existing record is
    /// never modified.
    pub fn register(&self, credentials: &Credentials) -> Result<User> {
        credentials.validate()?;

        let secret_hash = self.hasher.hash(credentials.secret())?;
        let user = self.users.insert_user(&credentials.username, &secret_hash)?;

        info!(handle = %user.handle, "registered user");
        Ok(user)
    }

    /// Verify a username and secret and return the owner's handle
    pub fn authenticate(&self, credentials: &Credentials) -> Result<UserHandle> {
        let Some(user) = self.users.find_user(&credentials.username)? else {
            // Burn the same work as a real check before reporting
            let _ = self.hasher.verify(credentials.secret(), &self.dummy_hash);
            debug!("authentication failed: unknown identity");
            return Err(Error::UnknownIdentity);
        };

        if self.hasher.verify(credentials.secret(), &user.secret_hash)? {
            Ok(user.handle)
        } else {
            debug!(handle = %user.handle, "authentication failed: secret mismatch");
            Err(Error::BadSecret)
        }
    }

    /// Look up the handle for a username without checking a secret
    ///
    /// Only for identities already proven by another path.
    pub fn resolve(&self, username: &str) -> Result<UserHandle> {
        self.users
            .find_user(username)?
            .map(|user| user.handle)
            .ok_or(Error::UnknownIdentity)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    pub(crate) fn cheap_params() -> HashingParams {
        HashingParams {
            time_cost: 1,
            memory_cost: 1024,
            parallelism: 1,
        }
    }

    /// In-memory user repository for unit tests
    #[derive(Default)]
    pub(crate) struct MemoryUsers {
        users: Mutex<HashMap<String, User>>,
        fail: bool,
    }

    impl MemoryUsers {
        pub(crate) fn failing() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
                fail: true,
            }
        }

        pub(crate) fn stored_hash(&self, username: &str) -> Option<String> {
            self.users
                .lock()
                .unwrap()
                .get(username)
                .map(|u| u.secret_hash.clone())
        }
    }

    impl UserRepository for MemoryUsers {
        fn insert_user(&self, username: &str, secret_hash: &str) -> Result<User> {
            if self.fail {
                return Err(Error::persistence("storage offline"));
            }
            let mut users = self.users.lock().unwrap();
            if users.contains_key(username) {
                return Err(Error::DuplicateIdentity(username.to_string()));
            }
            let handle = UserHandle::from_raw(users.len() as i64 + 1);
            let user = User::new(handle, username, secret_hash);
            users.insert(username.to_string(), user.clone());
            Ok(user)
        }

        fn find_user(&self, username: &str) -> Result<Option<User>> {
            if self.fail {
                return Err(Error::persistence("storage offline"));
            }
            Ok(self.users.lock().unwrap().get(username).cloned())
        }
    }

    fn store() -> (Arc<MemoryUsers>, CredentialStore) {
        let users = Arc::new(MemoryUsers::default());
        let store = CredentialStore::new(users.clone(), &cheap_params()).unwrap();
        (users, store)
    }

    #[test]
    fn test_register_then_authenticate() {
        let (_, store) = store();
        let creds = Credentials::new("alice", "pw123");

        let user = store.register(&creds).unwrap();
        assert_eq!(user.username, "alice");

        let first = store.authenticate(&creds).unwrap();
        let second = store.authenticate(&creds).unwrap();
        assert_eq!(first, user.handle);
        assert_eq!(first, second);
    }

    #[test]
    fn test_register_stores_hash_not_secret() {
        let (users, store) = store();
        store.register(&Credentials::new("alice", "pw123")).unwrap();

        let hash = users.stored_hash("alice").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("pw123"));
    }

    #[test]
    fn test_duplicate_registration_keeps_original_hash() {
        let (users, store) = store();
        store.register(&Credentials::new("alice", "pw123")).unwrap();
        let before = users.stored_hash("alice").unwrap();

        let err = store
            .register(&Credentials::new("alice", "other"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentity(_)));
        assert_eq!(users.stored_hash("alice").unwrap(), before);
        assert!(store.authenticate(&Credentials::new("alice", "pw123")).is_ok());
    }

    #[test]
    fn test_register_rejects_empty_fields() {
        let (users, store) = store();
        assert!(matches!(
            store.register(&Credentials::new("", "pw")),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.register(&Credentials::new("bob", "")),
            Err(Error::InvalidInput(_))
        ));
        assert!(users.stored_hash("bob").is_none());
    }

    #[test]
    fn test_wrong_secret_is_bad_secret() {
        let (_, store) = store();
        store.register(&Credentials::new("alice", "pw123")).unwrap();

        for wrong in ["pw124", "pw12", "pw1234", "PW123", " pw123", ""] {
            assert!(matches!(
                store.authenticate(&Credentials::new("alice", wrong)),
                Err(Error::BadSecret)
            ));
        }
    }

    #[test]
    fn test_unknown_identity() {
        let (_, store) = store();
        assert!(matches!(
            store.authenticate(&Credentials::new("ghost", "pw123")),
            Err(Error::UnknownIdentity)
        ));
        assert!(matches!(store.resolve("ghost"), Err(Error::UnknownIdentity)));
    }

    #[test]
    fn test_resolve_matches_authenticate() {
        let (_, store) = store();
        store.register(&Credentials::new("alice", "pw123")).unwrap();

        let authenticated = store.authenticate(&Credentials::new("alice", "pw123")).unwrap();
        assert_eq!(store.resolve("alice").unwrap(), authenticated);
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        let (_, store) = store();
        store.register(&Credentials::new("alice", "pw123")).unwrap();
        assert!(matches!(store.resolve("Alice"), Err(Error::UnknownIdentity)));
    }

    #[test]
    fn test_storage_failure_propagates() {
        let store =
            CredentialStore::new(Arc::new(MemoryUsers::failing()), &cheap_params()).unwrap();
        assert!(matches!(
            store.register(&Credentials::new("alice", "pw123")),
            Err(Error::Persistence(_))
        ));
        assert!(matches!(
            store.authenticate(&Credentials::new("alice", "pw123")),
            Err(Error::Persistence(_))
        ));
    }
}
