use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use fleettrack_api::{Attributes, Device, DeviceStatus, Position};
use fleettrack_client::errors::ApiError;
use fleettrack_client::services::FleetApi;

pub fn device(id: &str, name: &str) -> Device {
    Device {
        id: id.to_string(),
        name: name.to_string(),
        status: DeviceStatus::Online,
        speed: None,
        last_update: None,
        attributes: Attributes::new(),
    }
}

pub fn position(device_id: &str, latitude: f64, longitude: f64) -> Position {
    Position {
        device_id: device_id.to_string(),
        latitude,
        longitude,
        speed: None,
        course: None,
        device_time: None,
        address: None,
        attributes: Attributes::new(),
    }
}

/// In-memory [`FleetApi`] with scripted payloads, failure toggles and an
/// optional artificial fetch delay.
pub struct ScriptedApi {
    devices: Mutex<Vec<Device>>,
    positions: Mutex<Vec<Position>>,
    pub fail_devices: AtomicBool,
    pub fail_positions: AtomicBool,
    pub fetch_delay: Mutex<Option<Duration>>,
    pub device_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
            positions: Mutex::new(Vec::new()),
            fail_devices: AtomicBool::new(false),
            fail_positions: AtomicBool::new(false),
            fetch_delay: Mutex::new(None),
            device_calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock().await = devices;
    }

    pub async fn set_positions(&self, positions: Vec<Position>) {
        *self.positions.lock().await = positions;
    }

    pub async fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.fetch_delay.lock().await = delay;
    }

    async fn maybe_delay(&self) {
        let delay = *self.fetch_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn scripted_failure(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[async_trait]
impl FleetApi for ScriptedApi {
    async fn fetch_devices(&self) -> Result<Vec<Device>, ApiError> {
        self.device_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay().await;

        if self.fail_devices.load(Ordering::SeqCst) {
            return Err(scripted_failure("/api/devices"));
        }

        Ok(self.devices.lock().await.clone())
    }

    async fn fetch_positions(&self) -> Result<Vec<Position>, ApiError> {
        self.maybe_delay().await;

        if self.fail_positions.load(Ordering::SeqCst) {
            return Err(scripted_failure("/api/positions"));
        }

        Ok(self.positions.lock().await.clone())
    }
}
