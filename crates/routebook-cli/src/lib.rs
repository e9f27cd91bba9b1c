//! Routebook CLI - command line client for the Routebook API.
//!
//! Saves and browses routes on a server and keeps a local ranking of the
//! most searched origin/destination pairs.

pub mod cli;
pub mod client;
pub mod error;

pub use client::{Health, RoutebookClient, SaveOutcome};
pub use error::ClientError;
