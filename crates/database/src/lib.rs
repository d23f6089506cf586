//! # Shiftboard Database Crate
//!
//! This crate is the storage layer of the scheduling service. It hides every
//! storage detail behind two traits and ships two implementations of them.
//!
//! ## Architectural Principles
//!
//! - **One contract, two deployments:** [`Store`] and [`StoreTx`] describe
//!   filtered, ordered, windowed reads and transactional writes. [`PgStore`]
//!   implements them on PostgreSQL; [`MemoryStore`] implements them in process
//!   for tests and single-node runs.
//! - **Soft delete:** rows are never removed by the API; `deleted_at` marks
//!   them and default reads skip them. Unique keys only bind live rows.
//! - **Transactional writes:** a dropped transaction rolls back, so a
//!   cancelled request never leaves partial writes behind.
//!
//! ## Public API
//!
//! - `connect`: establishes the PostgreSQL connection pool from the storage settings.
//! - `run_migrations`: applies the embedded schema migrations.
//! - `Store` / `StoreTx` / `Stored`: the storage contract.
//! - `PgStore`, `MemoryStore`: the two implementations.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::{MemoryStore, MemoryTx};
pub use postgres::{PgStore, PgTx};
pub use store::{Store, StoreTx, Stored};
