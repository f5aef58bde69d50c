//! Coordinate extraction from stored point values of unknown shape.
//!
//! Depending on which database capabilities were available when a row was
//! read, a point can surface as a structured `{x, y}` object, a GeoJSON
//! `Point`, WKT text (`POINT(lon lat)`, optionally `SRID=4326;`-prefixed)
//! or the native Postgres literal `(lon,lat)`. Absence of a usable point is
//! a normal state, so every failure path returns `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::Coordinate;

static WKT_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:SRID=\d+\s*;\s*)?POINT\s*\(\s*([^\s()]+)\s+([^\s()]+)\s*\)\s*$")
        .expect("valid WKT point regex")
});

static NATIVE_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\(\s*([^\s,()]+)\s*,\s*([^\s,()]+)\s*\)\s*$")
        .expect("valid native point regex")
});

/// Extract a [`Coordinate`] from a raw point value.
///
/// Object forms are tried before text so the common case needs no regex.
/// Returns `None` for any other shape, for components that are not finite
/// numbers, and for components outside the valid degree ranges.
#[must_use]
pub fn normalize(raw: &Value) -> Option<Coordinate> {
    match raw {
        Value::Object(map) => {
            if let (Some(x), Some(y)) = (map.get("x"), map.get("y")) {
                return coordinate_from_values(x, y);
            }
            geojson_point(map)
        }
        Value::String(text) => normalize_text(text),
        _ => None,
    }
}

/// Extract a [`Coordinate`] from textual point forms (WKT or native literal).
#[must_use]
pub fn normalize_text(text: &str) -> Option<Coordinate> {
    let captures = WKT_POINT
        .captures(text)
        .or_else(|| NATIVE_POINT.captures(text))?;
    let longitude = parse_component(captures.get(1)?.as_str())?;
    let latitude = parse_component(captures.get(2)?.as_str())?;
    Coordinate::new(longitude, latitude).ok()
}

fn geojson_point(map: &serde_json::Map<String, Value>) -> Option<Coordinate> {
    if map.get("type").and_then(Value::as_str) != Some("Point") {
        return None;
    }
    match map.get("coordinates")?.as_array()?.as_slice() {
        [x, y, ..] => coordinate_from_values(x, y),
        _ => None,
    }
}

fn coordinate_from_values(x: &Value, y: &Value) -> Option<Coordinate> {
    let longitude = x.as_f64().filter(|v| v.is_finite())?;
    let latitude = y.as_f64().filter(|v| v.is_finite())?;
    Coordinate::new(longitude, latitude).ok()
}

fn parse_component(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
