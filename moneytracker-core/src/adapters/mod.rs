//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the UserRepository and TransactionRepository ports

pub mod duckdb;
