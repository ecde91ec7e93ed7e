//! Ownership gate - binds every ledger call to a resolved identity
//!
//! The gate holds no state of its own. Each call proves or resolves its
//! identity again and passes only the resulting handle to the ledger.

use std::sync::Arc;

use super::credential::CredentialStore;
use super::ledger::LedgerStore;
use crate::domain::{Credentials, NewTransaction, Result, Transaction, User, UserHandle};

/// How a request establishes who it acts for
#[derive(Debug, Clone)]
pub enum IdentityClaim {
    /// Username and secret, verified on this call
    Credentials(Credentials),
    /// Username already verified by the dispatcher on this request
    Verified(String),
}

impl From<Credentials> for IdentityClaim {
    fn from(credentials: Credentials) -> Self {
        Self::Credentials(credentials)
    }
}

/// Entry points consumed by a dispatch layer
pub struct OwnershipGate {
    credentials: Arc<CredentialStore>,
    ledger: Arc<LedgerStore>,
}

impl OwnershipGate {
    pub fn new(credentials: Arc<CredentialStore>, ledger: Arc<LedgerStore>) -> Self {
        Self {
            credentials,
            ledger,
        }
    }

    /// Create a new account
    pub fn register(&self, credentials: &Credentials) -> Result<User> {
        self.credentials.register(credentials)
    }

    /// Verify credentials and return the owner's handle
    pub fn authenticate(&self, credentials: &Credentials) -> Result<UserHandle> {
        self.credentials.authenticate(credentials)
    }

    /// Turn a claim into a handle: authenticate credentials or resolve a
    /// verified username
    pub fn establish(&self, claim: &IdentityClaim) -> Result<UserHandle> {
        match claim {
            IdentityClaim::Credentials(credentials) => self.credentials.authenticate(credentials),
            IdentityClaim::Verified(username) => self.credentials.resolve(username),
        }
    }

    /// Add a transaction for the claimed identity
    pub fn add_transaction(&self, claim: &IdentityClaim, entry: &NewTransaction) -> Result<Transaction> {
        let owner = self.establish(claim)?;
        self.ledger.add(&owner, &entry.description, entry.amount)
    }

    /// List the claimed identity's transactions
    pub fn list_transactions(&self, claim: &IdentityClaim) -> Result<Vec<Transaction>> {
        let owner = self.establish(claim)?;
        self.ledger.list_by_owner(&owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::services::credential::tests::{cheap_params, MemoryUsers};
    use crate::services::ledger::tests::MemoryLedger;

    fn gate() -> (Arc<MemoryLedger>, OwnershipGate) {
        let users = Arc::new(MemoryUsers::default());
        let ledger_repo = Arc::new(MemoryLedger::default());
        let credentials = Arc::new(CredentialStore::new(users, &cheap_params()).unwrap());
        let ledger = Arc::new(LedgerStore::new(ledger_repo.clone()));
        (ledger_repo, OwnershipGate::new(credentials, ledger))
    }

    #[test]
    fn test_add_and_list_with_credentials() {
        let (_, gate) = gate();
        let creds = Credentials::new("alice", "pw123");
        gate.register(&creds).unwrap();

        let claim = IdentityClaim::from(creds);
        let tx = gate
            .add_transaction(&claim, &NewTransaction::new("rent", -1200.0))
            .unwrap();
        assert_eq!(gate.list_transactions(&claim).unwrap(), vec![tx]);
    }

    #[test]
    fn test_wrong_secret_never_reaches_ledger() {
        let (repo, gate) = gate();
        gate.register(&Credentials::new("alice", "pw123")).unwrap();

        let claim = IdentityClaim::from(Credentials::new("alice", "wrong"));
        assert!(matches!(
            gate.add_transaction(&claim, &NewTransaction::new("rent", -1.0)),
            Err(Error::BadSecret)
        ));
        assert!(matches!(gate.list_transactions(&claim), Err(Error::BadSecret)));
        assert_eq!(repo.len(), 0);
    }

    #[test]
    fn test_verified_claim_resolves_same_owner() {
        let (_, gate) = gate();
        let creds = Credentials::new("alice", "pw123");
        gate.register(&creds).unwrap();

        let by_secret = gate.establish(&IdentityClaim::from(creds)).unwrap();
        let by_name = gate
            .establish(&IdentityClaim::Verified("alice".to_string()))
            .unwrap();
        assert_eq!(by_secret, by_name);
    }

    #[test]
    fn test_unknown_verified_claim_fails_like_authenticate() {
        let (_, gate) = gate();
        assert!(matches!(
            gate.establish(&IdentityClaim::Verified("ghost".to_string())),
            Err(Error::UnknownIdentity)
        ));
        assert!(matches!(
            gate.establish(&IdentityClaim::from(Credentials::new("ghost", "pw"))),
            Err(Error::UnknownIdentity)
        ));
    }

    #[test]
    fn test_owners_do_not_see_each_other() {
        let (_, gate) = gate();
        let alice = Credentials::new("alice", "pw-a");
        let bob = Credentials::new("bob", "pw-b");
        gate.register(&alice).unwrap();
        gate.register(&bob).unwrap();

        let alice = IdentityClaim::from(alice);
        let bob = IdentityClaim::from(bob);
        gate.add_transaction(&alice, &NewTransaction::new("coffee", -4.5))
            .unwrap();
        let bobs = gate
            .add_transaction(&bob, &NewTransaction::new("salary", 3000.0))
            .unwrap();

        let listed = gate.list_transactions(&alice).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed.contains(&bobs));
    }
}
