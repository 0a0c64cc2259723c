//! GeoJSON geometry payload attached to an obstacle.
//!
//! The registry stores the payload verbatim; it only checks that it encodes a
//! single point or line string so map clients can always render it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validation errors for geometry payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryValidationError {
    /// No payload was supplied.
    #[error("geometry must not be empty")]
    Empty,
    /// The payload is not valid JSON or misses required members.
    #[error("geometry is not valid GeoJSON: {0}")]
    Malformed(String),
    /// The payload is GeoJSON but not a point or line string.
    #[error("geometry type {0} is not supported; expected Point or LineString")]
    UnsupportedType(String),
}

/// Kind of shape encoded by a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// A single position, e.g. a mast.
    Point,
    /// A polyline, e.g. a power line.
    LineString,
}

/// Non-empty GeoJSON payload describing where an obstacle is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Geometry {
    raw: String,
    kind: GeometryKind,
}

impl Geometry {
    /// Validate and wrap a GeoJSON payload.
    ///
    /// Accepts bare geometries, a `Feature`, or a `FeatureCollection` holding
    /// exactly one feature.
    ///
    /// # Examples
    /// ```
    /// use obstacle_registry::domain::{Geometry, GeometryKind};
    ///
    /// let point = Geometry::new(r#"{"type":"Point","coordinates":[10.0,59.0]}"#)
    ///     .expect("valid point");
    /// assert_eq!(point.kind(), GeometryKind::Point);
    /// assert!(Geometry::new("   ").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, GeometryValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(GeometryValidationError::Empty);
        }
        let value: Value = serde_json::from_str(&raw)
            .map_err(|err| GeometryValidationError::Malformed(err.to_string()))?;
        let kind = classify(&value)?;
        Ok(Self { raw, kind })
    }

    /// The shape encoded by the payload.
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    /// The payload exactly as submitted.
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }
}

impl AsRef<str> for Geometry {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Geometry> for String {
    fn from(value: Geometry) -> Self {
        value.raw
    }
}

impl TryFrom<String> for Geometry {
    type Error = GeometryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn type_of(value: &Value) -> Result<&str, GeometryValidationError> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeometryValidationError::Malformed("missing \"type\" member".to_owned()))
}

fn classify(value: &Value) -> Result<GeometryKind, GeometryValidationError> {
    match type_of(value)? {
        "Feature" => {
            let geometry = value.get("geometry").ok_or_else(|| {
                GeometryValidationError::Malformed("feature has no geometry".to_owned())
            })?;
            classify_geometry(geometry)
        }
        "FeatureCollection" => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    GeometryValidationError::Malformed("collection has no features".to_owned())
                })?;
            match features.as_slice() {
                [feature] if matches!(type_of(feature), Ok("Feature")) => classify(feature),
                _ => Err(GeometryValidationError::Malformed(
                    "collection must hold exactly one feature".to_owned(),
                )),
            }
        }
        _ => classify_geometry(value),
    }
}

fn classify_geometry(value: &Value) -> Result<GeometryKind, GeometryValidationError> {
    let kind = type_of(value)?;
    let coordinates = value.get("coordinates").and_then(Value::as_array);
    match (kind, coordinates) {
        ("Point", Some(position)) if is_position(position) => Ok(GeometryKind::Point),
        ("LineString", Some(positions))
            if positions.len() >= 2
                && positions
                    .iter()
                    .all(|p| p.as_array().is_some_and(|p| is_position(p))) =>
        {
            Ok(GeometryKind::LineString)
        }
        ("Point" | "LineString", _) => Err(GeometryValidationError::Malformed(format!(
            "{kind} has invalid coordinates"
        ))),
        (other, _) => Err(GeometryValidationError::UnsupportedType(other.to_owned())),
    }
}

fn is_position(values: &[Value]) -> bool {
    (2..=3).contains(&values.len()) && values.iter().all(Value::is_number)
}
