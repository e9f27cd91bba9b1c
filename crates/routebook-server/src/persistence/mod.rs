//! Persistence layer for the Routebook server.
//!
//! Provides SQLite-backed storage for saved routes.

pub mod db;
pub mod routes;

pub use db::{init_database, Database};
pub use routes::{CreateOutcome, ReplaceOutcome};
