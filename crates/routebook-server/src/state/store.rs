//! Shared application state.

use anyhow::Result;
use routebook_core::models::{Pagination, Route, RouteInput, RoutePage};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::persistence::routes::{self, CreateOutcome, ReplaceOutcome};
use crate::persistence::Database;

/// Application state: the route store plus read-only process facts.
pub struct AppState {
    db: Database,
    config: Config,
    started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            config,
            started_at: Instant::now(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Time since the state was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Save a route unless its label pair is already stored.
    pub async fn create_route(&self, input: &RouteInput) -> Result<CreateOutcome> {
        let outcome = routes::create_route(self.db.pool(), input).await?;
        match &outcome {
            CreateOutcome::Created(route) => tracing::info!(
                "Saved route {} ('{}' -> '{}')",
                route.id,
                route.from.label,
                route.to.label
            ),
            CreateOutcome::Duplicate => tracing::debug!(
                "Route '{}' -> '{}' already saved",
                input.from.label,
                input.to.label
            ),
        }
        Ok(outcome)
    }

    pub async fn list_routes(&self, page: Pagination) -> Result<RoutePage> {
        routes::list_routes(self.db.pool(), page).await
    }

    pub async fn get_route(&self, id: i64) -> Result<Option<Route>> {
        routes::get_route(self.db.pool(), id).await
    }

    pub async fn replace_route(&self, id: i64, input: &RouteInput) -> Result<ReplaceOutcome> {
        let outcome = routes::replace_route(self.db.pool(), id, input).await?;
        match &outcome {
            ReplaceOutcome::Replaced(route) => tracing::info!("Replaced route {}", route.id),
            ReplaceOutcome::NotFound => tracing::debug!("Replace of unknown route {}", id),
            ReplaceOutcome::Conflict => tracing::debug!(
                "Replace of route {} collides with saved pair '{}' -> '{}'",
                id,
                input.from.label,
                input.to.label
            ),
        }
        Ok(outcome)
    }

    pub async fn delete_route(&self, id: i64) -> Result<bool> {
        let deleted = routes::delete_route(self.db.pool(), id).await?;
        if deleted {
            tracing::info!("Deleted route {}", id);
        }
        Ok(deleted)
    }
}
