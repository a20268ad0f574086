mod api_service;
mod device_store;
mod poller;

pub use api_service::*;
pub use device_store::*;
pub use poller::*;
