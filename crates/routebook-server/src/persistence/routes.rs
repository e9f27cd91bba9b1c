//! Saved-route persistence operations.
//!
//! The unique index on `(from_label, to_label)` is what keeps label pairs
//! unique; nothing here reads before writing.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use routebook_core::models::{Pagination, Place, Route, RouteInput, RoutePage};
use sqlx::SqlitePool;

const ROUTE_COLUMNS: &str =
    "id, from_label, from_lon, from_lat, to_label, to_lon, to_lat, distance_m, duration_s, created_at";

/// Result of inserting a route.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created(Route),
    /// A route with the same label pair is already stored.
    Duplicate,
}

/// Result of replacing a route.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplaceOutcome {
    Replaced(Route),
    NotFound,
    /// The new label pair belongs to a different route.
    Conflict,
}

/// Insert a route unless its label pair is already stored.
pub async fn create_route(pool: &SqlitePool, input: &RouteInput) -> Result<CreateOutcome> {
    let sql = format!(
        r#"
        INSERT INTO routes (from_label, from_lon, from_lat, to_label, to_lon, to_lat, distance_m, duration_s, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(from_label, to_label) DO NOTHING
        RETURNING {ROUTE_COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, RouteRow>(&sql)
        .bind(&input.from.label)
        .bind(input.from.lon)
        .bind(input.from.lat)
        .bind(&input.to.label)
        .bind(input.to.lon)
        .bind(input.to.lat)
        .bind(input.distance_m)
        .bind(input.duration_s)
        .bind(Utc::now().to_rfc3339())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(CreateOutcome::Created(row.try_into()?)),
        None => Ok(CreateOutcome::Duplicate),
    }
}

/// Load one window of routes, newest first, with the total row count.
pub async fn list_routes(pool: &SqlitePool, page: Pagination) -> Result<RoutePage> {
    // One transaction so `total` and `items` come from the same snapshot
    let mut tx = pool.begin().await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM routes")
        .fetch_one(&mut *tx)
        .await?;

    let sql = format!("SELECT {ROUTE_COLUMNS} FROM routes ORDER BY id DESC LIMIT ?1 OFFSET ?2");
    let rows = sqlx::query_as::<_, RouteRow>(&sql)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    let items = rows
        .into_iter()
        .map(Route::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok(RoutePage { total, items })
}

/// Count all stored routes.
pub async fn count_routes(pool: &SqlitePool) -> Result<i64> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM routes")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Load a route by ID.
pub async fn get_route(pool: &SqlitePool, id: i64) -> Result<Option<Route>> {
    let sql = format!("SELECT {ROUTE_COLUMNS} FROM routes WHERE id = ?1");
    let row = sqlx::query_as::<_, RouteRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(Route::try_from).transpose()
}

/// Overwrite every field of a route except `id` and `created_at`.
pub async fn replace_route(pool: &SqlitePool, id: i64, input: &RouteInput) -> Result<ReplaceOutcome> {
    let sql = format!(
        r#"
        UPDATE routes SET
            from_label = ?1, from_lon = ?2, from_lat = ?3,
            to_label = ?4, to_lon = ?5, to_lat = ?6,
            distance_m = ?7, duration_s = ?8
        WHERE id = ?9
        RETURNING {ROUTE_COLUMNS}
        "#
    );

    let result = sqlx::query_as::<_, RouteRow>(&sql)
        .bind(&input.from.label)
        .bind(input.from.lon)
        .bind(input.from.lat)
        .bind(&input.to.label)
        .bind(input.to.lon)
        .bind(input.to.lat)
        .bind(input.distance_m)
        .bind(input.duration_s)
        .bind(id)
        .fetch_optional(pool)
        .await;

    match result {
        Ok(Some(row)) => Ok(ReplaceOutcome::Replaced(row.try_into()?)),
        Ok(None) => Ok(ReplaceOutcome::NotFound),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => Ok(ReplaceOutcome::Conflict),
        Err(err) => Err(err.into()),
    }
}

/// Delete a route by ID.
pub async fn delete_route(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM routes WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct RouteRow {
    id: i64,
    from_label: String,
    from_lon: f64,
    from_lat: f64,
    to_label: String,
    to_lon: f64,
    to_lat: f64,
    distance_m: Option<i64>,
    duration_s: Option<i64>,
    created_at: String,
}

impl TryFrom<RouteRow> for Route {
    type Error = anyhow::Error;

    fn try_from(row: RouteRow) -> Result<Self> {
        let created_at = parse_timestamp(&row.created_at)
            .with_context(|| format!("route {} has unreadable created_at", row.id))?;

        Ok(Route {
            id: row.id,
            from: Place::new(row.from_label, row.from_lon, row.from_lat),
            to: Place::new(row.to_label, row.to_lon, row.to_lat),
            distance_m: row.distance_m,
            duration_s: row.duration_s,
            created_at,
        })
    }
}

/// RFC 3339, or SQLite's `datetime('now')` format from older databases.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")?;
    Ok(naive.and_utc())
}
