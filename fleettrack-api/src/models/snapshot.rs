use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Attributes, Device, DeviceStatus, Position};

/// A device overlaid with its most recent position.
///
/// Wherever both sides carry a value the position wins: `speed`,
/// `last_update` (taken from the position's device time) and attribute-bag
/// keys are right-biased. Devices without a matching position keep their raw
/// fields and carry no coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    /// Device identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Connectivity status
    pub status: DeviceStatus,
    /// Position speed when available, otherwise the device's last-known speed
    pub speed: Option<f64>,
    /// Position device time when available, otherwise the backend's last-update time
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
    /// Latitude, present only when a position matched
    pub latitude: Option<f64>,
    /// Longitude, present only when a position matched
    pub longitude: Option<f64>,
    /// Course over ground
    pub course: Option<f64>,
    /// Reverse-geocoded address
    pub address: Option<String>,
    /// Device attributes overlaid with position attributes
    pub attributes: Attributes,
}

impl DeviceSnapshot {
    fn from_device(device: Device) -> Self {
        Self {
            id: device.id,
            name: device.name,
            status: device.status,
            speed: device.speed,
            last_update: device.last_update,
            latitude: None,
            longitude: None,
            course: None,
            address: None,
            attributes: device.attributes,
        }
    }

    fn apply_position(&mut self, position: &Position) {
        self.latitude = Some(position.latitude);
        self.longitude = Some(position.longitude);
        self.course = position.course;
        self.address = position.address.clone();

        if position.speed.is_some() {
            self.speed = position.speed;
        }
        if position.device_time.is_some() {
            self.last_update = position.device_time;
        }
        for (key, value) in &position.attributes {
            self.attributes.insert(key.clone(), value.clone());
        }
    }

    /// Whether this snapshot carries coordinates.
    pub fn has_fix(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Merge a device list with a position list by device identifier.
///
/// Positions are matched to devices on identifier equality; when the backend
/// reports several positions for one device, the last occurrence wins.
/// Positions referencing unknown devices are dropped.
pub fn merge_snapshots(devices: Vec<Device>, positions: Vec<Position>) -> Vec<DeviceSnapshot> {
    let mut by_device: HashMap<&str, &Position> = HashMap::with_capacity(positions.len());
    for position in &positions {
        by_device.insert(position.device_id.as_str(), position);
    }

    devices
        .into_iter()
        .map(|device| {
            let position = by_device.get(device.id.as_str()).copied();
            let mut snapshot = DeviceSnapshot::from_device(device);

            if let Some(position) = position {
                snapshot.apply_position(position);
            }

            snapshot
        })
        .collect()
}
