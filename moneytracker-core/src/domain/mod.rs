//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O.

mod hashing;
pub mod result;
mod transaction;
mod user;

pub use hashing::HashingParams;
pub use result::{Error, ErrorKind, OperationResult, Result};
pub use transaction::{parse_amount, NewTransaction, Transaction};
pub use user::{Credentials, User, UserHandle};
