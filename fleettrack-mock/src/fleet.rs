use rand::Rng;
use serde_json::json;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use fleettrack_api::{Attributes, Device, DeviceStatus, Position};

// Base coordinate the simulated fleet is scattered around.
const BASE_LATITUDE: f64 = 60.1699;
const BASE_LONGITUDE: f64 = 24.9384;

// One knot over one poll interval, expressed in degrees of latitude.
const KNOT_TO_DEGREES: f64 = 0.0002;

struct Vehicle {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    speed: f64,
    course: f64,
    ignition: bool,
}

/// Simulated fleet state behind the mock endpoints. Each positions request
/// advances every vehicle a little along its course with random jitter.
pub struct SimulatedFleet {
    vehicles: RwLock<Vec<Vehicle>>,
}

impl SimulatedFleet {
    pub fn new(count: usize) -> Self {
        let mut rng = rand::rng();

        let vehicles = (0..count)
            .map(|index| Vehicle {
                id: format!("{}", index + 1),
                name: format!("Vehicle {}", index + 1),
                latitude: BASE_LATITUDE + rng.random_range(-0.05..0.05),
                longitude: BASE_LONGITUDE + rng.random_range(-0.05..0.05),
                speed: rng.random_range(0.0..50.0),
                course: rng.random_range(0.0..360.0),
                ignition: index % 2 == 0,
            })
            .collect();

        Self {
            vehicles: RwLock::new(vehicles),
        }
    }

    pub async fn devices(&self) -> Vec<Device> {
        let vehicles = self.vehicles.read().await;

        vehicles
            .iter()
            .map(|vehicle| {
                let mut attributes = Attributes::new();
                attributes.insert("ignition".to_string(), json!(vehicle.ignition));
                attributes.insert("motion".to_string(), json!(vehicle.speed > 1.0));

                Device {
                    id: vehicle.id.clone(),
                    name: vehicle.name.clone(),
                    status: DeviceStatus::Online,
                    speed: Some(vehicle.speed),
                    last_update: Some(OffsetDateTime::now_utc()),
                    attributes,
                }
            })
            .collect()
    }

    /// Advance the simulation one step and report the new positions.
    pub async fn positions(&self) -> Vec<Position> {
        let mut vehicles = self.vehicles.write().await;
        let mut rng = rand::rng();

        vehicles
            .iter_mut()
            .map(|vehicle| {
                vehicle.course = (vehicle.course + rng.random_range(-10.0..10.0)).rem_euclid(360.0);
                vehicle.speed = (vehicle.speed + rng.random_range(-5.0..5.0)).clamp(0.0, 80.0);

                let radians = vehicle.course.to_radians();
                vehicle.latitude += radians.cos() * vehicle.speed * KNOT_TO_DEGREES;
                vehicle.longitude += radians.sin() * vehicle.speed * KNOT_TO_DEGREES;

                Position {
                    device_id: vehicle.id.clone(),
                    latitude: vehicle.latitude,
                    longitude: vehicle.longitude,
                    speed: Some(vehicle.speed),
                    course: Some(vehicle.course),
                    device_time: Some(OffsetDateTime::now_utc()),
                    address: None,
                    attributes: Attributes::new(),
                }
            })
            .collect()
    }
}
