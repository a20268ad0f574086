use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Attributes;

/// Connectivity state reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// Device is reporting to the backend
    Online,
    /// Device stopped reporting
    Offline,
    /// Status missing or not recognized
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Device identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Connectivity status
    #[serde(default)]
    pub status: DeviceStatus,
    /// Last-known speed in knots
    #[serde(default)]
    pub speed: Option<f64>,
    /// Time the backend last heard from the device
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
    /// Attribute bag (ignition, motion, battery, ...)
    #[serde(default)]
    pub attributes: Attributes,
}
