//! Core data models for saved routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for route listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
/// Largest page size a listing will return.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A labelled coordinate, as produced by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub label: String,
    pub lon: f64,
    pub lat: f64,
}

impl Place {
    pub fn new(label: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            label: label.into(),
            lon,
            lat,
        }
    }
}

/// A persisted origin/destination pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: i64,
    pub from: Place,
    pub to: Place,
    /// Driving distance in meters, if the directions provider reported one
    pub distance_m: Option<i64>,
    /// Driving duration in seconds
    pub duration_s: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A validated, normalized request to save or replace a route.
///
/// Only [`crate::validation::validate_route_input`] produces values the
/// server accepts; clients build one directly and let the server re-check it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInput {
    pub from: Place,
    pub to: Place,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<i64>,
}

impl RouteInput {
    pub fn new(from: Place, to: Place) -> Self {
        Self {
            from,
            to,
            distance_m: None,
            duration_s: None,
        }
    }

    pub fn with_metrics(mut self, distance_m: Option<i64>, duration_s: Option<i64>) -> Self {
        self.distance_m = distance_m;
        self.duration_s = duration_s;
        self
    }
}

/// One window of the saved-routes listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePage {
    /// Number of stored routes, independent of the window
    pub total: i64,
    pub items: Vec<Route>,
}

/// Clamped pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Clamp raw values into a usable window: `limit` to `[1, 100]`,
    /// `offset` to `>= 0`.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// Build a window from raw query-string values. Unparsable values fall
    /// back to the defaults.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<i64>().ok());
        Self::new(parse(limit), parse(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        assert_eq!(Pagination::new(None, None), Pagination { limit: 20, offset: 0 });
        assert_eq!(Pagination::from_query(None, None), Pagination::default());
    }

    #[test]
    fn pagination_clamps_limit_and_offset() {
        assert_eq!(Pagination::new(Some(500), Some(-3)), Pagination { limit: 100, offset: 0 });
        assert_eq!(Pagination::new(Some(0), Some(7)), Pagination { limit: 1, offset: 7 });
        assert_eq!(Pagination::new(Some(-10), None).limit, 1);
    }

    #[test]
    fn pagination_ignores_garbage_query_values() {
        let page = Pagination::from_query(Some("lots"), Some("-"));
        assert_eq!(page, Pagination::default());

        let page = Pagination::from_query(Some(" 5 "), Some("10"));
        assert_eq!(page, Pagination { limit: 5, offset: 10 });
    }

    #[test]
    fn route_serializes_missing_metrics_as_null() {
        let route = Route {
            id: 1,
            from: Place::new("X", 7.4, 46.9),
            to: Place::new("Y", 7.5, 47.0),
            distance_m: None,
            duration_s: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&route).unwrap();
        assert!(value["distance_m"].is_null());
        assert!(value["duration_s"].is_null());
        assert_eq!(value["from"]["label"], "X");
        assert_eq!(value["to"]["lat"], 47.0);
    }
}
