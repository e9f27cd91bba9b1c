//! Validation of inbound route payloads.
//!
//! Input arrives as untyped JSON. Every rule is checked so the caller gets
//! the complete list of violations in one response.

use serde_json::{Map, Value};

use crate::error::{Issue, ValidationError};
use crate::models::{Place, RouteInput};

const LON_RANGE: (f64, f64) = (-180.0, 180.0);
const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

/// Parse a raw request body and validate it.
pub fn parse_route_input(body: &[u8]) -> Result<RouteInput, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| ValidationError {
        issues: vec![Issue::new(&[], format!("malformed JSON: {}", err))],
    })?;
    validate_route_input(&value)
}

/// Validate an untyped route payload into a normalized [`RouteInput`].
///
/// Labels are trimmed; metrics are rounded to whole units. JSON `null`
/// metrics count as absent.
pub fn validate_route_input(value: &Value) -> Result<RouteInput, ValidationError> {
    let mut issues = Vec::new();

    let Some(object) = value.as_object() else {
        issues.push(Issue::new(&[], "expected a JSON object"));
        return Err(ValidationError { issues });
    };

    let from = place_field(object, "from", &mut issues);
    let to = place_field(object, "to", &mut issues);
    let distance_m = metric_field(object, "distance_m", &mut issues);
    let duration_s = metric_field(object, "duration_s", &mut issues);

    match (from, to) {
        (Some(from), Some(to)) if issues.is_empty() => Ok(RouteInput {
            from,
            to,
            distance_m,
            duration_s,
        }),
        _ => Err(ValidationError { issues }),
    }
}

fn place_field(object: &Map<String, Value>, key: &str, issues: &mut Vec<Issue>) -> Option<Place> {
    let place = match object.get(key) {
        None | Some(Value::Null) => {
            issues.push(Issue::new(&[key], "required"));
            return None;
        }
        Some(Value::Object(place)) => place,
        Some(_) => {
            issues.push(Issue::new(&[key], "expected an object"));
            return None;
        }
    };

    let label = match place.get("label") {
        None | Some(Value::Null) => {
            issues.push(Issue::new(&[key, "label"], "required"));
            None
        }
        Some(Value::String(label)) if label.trim().is_empty() => {
            issues.push(Issue::new(&[key, "label"], "must not be empty"));
            None
        }
        Some(Value::String(label)) => Some(label.trim().to_string()),
        Some(_) => {
            issues.push(Issue::new(&[key, "label"], "expected a string"));
            None
        }
    };

    let lon = coordinate(place, key, "lon", LON_RANGE, issues);
    let lat = coordinate(place, key, "lat", LAT_RANGE, issues);

    Some(Place::new(label?, lon?, lat?))
}

fn coordinate(
    place: &Map<String, Value>,
    parent: &str,
    key: &str,
    (min, max): (f64, f64),
    issues: &mut Vec<Issue>,
) -> Option<f64> {
    let value = match place.get(key) {
        None | Some(Value::Null) => {
            issues.push(Issue::new(&[parent, key], "required"));
            return None;
        }
        Some(value) => value,
    };

    let Some(number) = value.as_f64() else {
        issues.push(Issue::new(&[parent, key], "expected a number"));
        return None;
    };

    if !number.is_finite() {
        issues.push(Issue::new(&[parent, key], "must be a finite number"));
        return None;
    }

    if !(min..=max).contains(&number) {
        issues.push(Issue::new(
            &[parent, key],
            format!("must be between {} and {}", min, max),
        ));
        return None;
    }

    Some(number)
}

fn metric_field(object: &Map<String, Value>, key: &str, issues: &mut Vec<Issue>) -> Option<i64> {
    let value = match object.get(key) {
        None | Some(Value::Null) => return None,
        Some(value) => value,
    };

    let Some(number) = value.as_f64() else {
        issues.push(Issue::new(&[key], "expected a number"));
        return None;
    };

    if !number.is_finite() {
        issues.push(Issue::new(&[key], "must be a finite number"));
        return None;
    }

    if number < 0.0 {
        issues.push(Issue::new(&[key], "must be greater than or equal to 0"));
        return None;
    }

    Some(number.round() as i64)
}
