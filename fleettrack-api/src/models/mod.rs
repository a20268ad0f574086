mod device;
mod position;
mod snapshot;

pub use device::*;
pub use position::*;
pub use snapshot::*;

/// Free-form attribute bag reported alongside devices and positions.
pub type Attributes = serde_json::Map<String, serde_json::Value>;
