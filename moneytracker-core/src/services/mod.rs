//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod credential;
mod gate;
mod hashing;
mod ledger;
pub mod migration;

pub use credential::CredentialStore;
pub use gate::{IdentityClaim, OwnershipGate};
pub use hashing::SecretHasher;
pub use ledger::LedgerStore;
pub use migration::{MigrationResult, MigrationService};
