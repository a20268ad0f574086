use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Attributes;

/// A single position report. Positions are consumed transiently while
/// building snapshots and never stored on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Identifier of the owning device
    pub device_id: String,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Speed in knots
    #[serde(default)]
    pub speed: Option<f64>,
    /// Course over ground in degrees
    #[serde(default)]
    pub course: Option<f64>,
    /// Timestamp reported by the device itself
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub device_time: Option<OffsetDateTime>,
    /// Reverse-geocoded address, when the backend resolved one
    #[serde(default)]
    pub address: Option<String>,
    /// Attribute bag (motion, distance, ...)
    #[serde(default)]
    pub attributes: Attributes,
}
