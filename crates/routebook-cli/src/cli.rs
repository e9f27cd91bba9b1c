//! Command definitions and dispatch for the `routebook` binary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use routebook_core::{HistoryStore, HistoryTracker, Place, Route, RouteInput};
use std::io::Write;
use std::path::PathBuf;

use crate::client::{RoutebookClient, SaveOutcome};
use crate::error::ClientError;

/// Routes listed when no limit is given, matching the saved-routes picker.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

#[derive(Parser, Debug)]
#[command(author, version, about = "Save, browse and rank routes on a Routebook server", long_about = None)]
pub struct Cli {
    /// Routebook server URL
    #[arg(long, env = "ROUTEBOOK_URL", default_value = "http://localhost:3000")]
    pub url: String,

    /// Local search history file
    #[arg(long, env = "ROUTEBOOK_HISTORY", default_value = "routebook-history.json")]
    pub history_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save a route on the server
    Save(RouteArgs),
    /// List saved routes, newest first
    List {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Show one saved route
    Show { id: i64 },
    /// Replace every field of a saved route
    Replace {
        id: i64,
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Delete a saved route
    Delete { id: i64 },
    /// Count a search locally without contacting the server
    Record { from: String, to: String },
    /// Show the most searched routes
    History,
    /// Check that the server is up
    Health,
}

#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    #[arg(long)]
    pub from_label: String,
    #[arg(long, allow_negative_numbers = true)]
    pub from_lon: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub from_lat: f64,
    #[arg(long)]
    pub to_label: String,
    #[arg(long, allow_negative_numbers = true)]
    pub to_lon: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub to_lat: f64,
    /// Distance reported by the directions provider, in meters
    #[arg(long, value_parser = parse_metric)]
    pub distance_m: Option<f64>,
    /// Duration reported by the directions provider, in seconds
    #[arg(long, value_parser = parse_metric)]
    pub duration_s: Option<f64>,
}

/// Metrics are finite and non-negative; fractions are rounded when sent.
fn parse_metric(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{}` is not a number", raw))?;
    if !value.is_finite() {
        return Err("must be a finite number".to_string());
    }
    if value < 0.0 {
        return Err("must be greater than or equal to 0".to_string());
    }
    Ok(value)
}

impl RouteArgs {
    pub fn to_input(&self) -> RouteInput {
        RouteInput::new(
            Place::new(self.from_label.clone(), self.from_lon, self.from_lat),
            Place::new(self.to_label.clone(), self.to_lon, self.to_lat),
        )
        .with_metrics(
            self.distance_m.map(|m| m.round() as i64),
            self.duration_s.map(|s| s.round() as i64),
        )
    }
}

/// Format a route as one line.
pub fn describe_route(route: &Route) -> String {
    let mut line = format!(
        "#{} {} ({:.5}, {:.5}) → {} ({:.5}, {:.5})",
        route.id,
        route.from.label,
        route.from.lat,
        route.from.lon,
        route.to.label,
        route.to.lat,
        route.to.lon,
    );
    if let Some(distance_m) = route.distance_m {
        line.push_str(&format!(", {:.1} km", distance_m as f64 / 1000.0));
    }
    if let Some(duration_s) = route.duration_s {
        line.push_str(&format!(", {} min", (duration_s as f64 / 60.0).round() as i64));
    }
    line
}

fn record_search<S: HistoryStore>(history: &mut HistoryTracker<S>, from: &str, to: &str) {
    if let Err(err) = history.record(from, to) {
        tracing::warn!("Could not update search history: {}", err);
    }
}

/// Run one command, writing user-facing output to `out`.
pub async fn run_command<S: HistoryStore, W: Write>(
    client: &RoutebookClient,
    history: &mut HistoryTracker<S>,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Save(args) => {
            let input = args.to_input();
            match client.save_route(&input).await {
                Ok(SaveOutcome::Saved(route)) => {
                    writeln!(out, "saved route #{}", route.id)?;
                    record_search(history, &input.from.label, &input.to.label);
                }
                Ok(SaveOutcome::AlreadySaved) => {
                    writeln!(out, "already saved")?;
                    record_search(history, &input.from.label, &input.to.label);
                }
                Err(ClientError::Invalid(err)) => {
                    for issue in &err.issues {
                        writeln!(out, "invalid: {}", issue)?;
                    }
                    return Err(err).context("server rejected the route");
                }
                Err(err) => return Err(err).context("failed to save route"),
            }
        }
        Command::List { limit, offset } => {
            let page = client
                .list_routes(Some(limit), Some(offset))
                .await
                .context("failed to list routes")?;
            writeln!(out, "{} saved route(s)", page.total)?;
            for route in &page.items {
                writeln!(out, "{}", describe_route(route))?;
            }
        }
        Command::Show { id } => match client.get_route(id).await.context("failed to load route")? {
            Some(route) => writeln!(out, "{}", describe_route(&route))?,
            None => writeln!(out, "route {} not found", id)?,
        },
        Command::Replace { id, route } => {
            let route = client
                .replace_route(id, &route.to_input())
                .await
                .with_context(|| format!("failed to replace route {}", id))?;
            writeln!(out, "{}", describe_route(&route))?;
        }
        Command::Delete { id } => {
            if client
                .delete_route(id)
                .await
                .with_context(|| format!("failed to delete route {}", id))?
            {
                writeln!(out, "deleted")?;
            } else {
                writeln!(out, "route {} not found", id)?;
            }
        }
        Command::Record { from, to } => {
            let count = history
                .record(&from, &to)
                .context("failed to update search history")?;
            writeln!(out, "{} → {} searched {} time(s)", from.trim(), to.trim(), count)?;
        }
        Command::History => {
            for line in history.render() {
                writeln!(out, "{}", line)?;
            }
        }
        Command::Health => {
            let health = client.health().await.context("server is not reachable")?;
            writeln!(out, "{} (up {:.0}s)", health.status, health.uptime)?;
        }
    }

    Ok(())
}
