use tokio::sync::{RwLock, broadcast};

use fleettrack_api::DeviceSnapshot;

/// Change notifications emitted to subscribed consumers.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The snapshot collection was replaced wholesale.
    DevicesReplaced { count: usize },
    LoadingChanged(bool),
    ErrorChanged(Option<String>),
}

#[derive(Debug, Default)]
struct StoreState {
    devices: Vec<DeviceSnapshot>,
    loading: bool,
    last_error: Option<String>,
}

/// Latest merged fleet snapshot plus the loading flag.
///
/// Written exclusively by the poller; consumers read cloned snapshots and
/// subscribe for change events. Every mutation is a whole-value replacement,
/// so readers never observe a partial merge.
pub struct DeviceStore {
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);

        Self {
            state: RwLock::new(StoreState::default()),
            events,
        }
    }

    /// Replace the stored collection atomically.
    pub async fn set_devices(&self, devices: Vec<DeviceSnapshot>) {
        let count = devices.len();
        {
            let mut state = self.state.write().await;
            state.devices = devices;
        }

        let _ = self.events.send(StoreEvent::DevicesReplaced { count });
    }

    pub async fn set_loading(&self, loading: bool) {
        let changed = {
            let mut state = self.state.write().await;
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        };

        if changed {
            let _ = self.events.send(StoreEvent::LoadingChanged(loading));
        }
    }

    /// Set or clear the last poll error. Informational only.
    pub async fn set_error(&self, error: Option<String>) {
        let changed = {
            let mut state = self.state.write().await;
            let changed = state.last_error != error;
            state.last_error = error.clone();
            changed
        };

        if changed {
            let _ = self.events.send(StoreEvent::ErrorChanged(error));
        }
    }

    pub async fn devices(&self) -> Vec<DeviceSnapshot> {
        self.state.read().await.devices.clone()
    }

    pub async fn device(&self, id: &str) -> Option<DeviceSnapshot> {
        self.state
            .read()
            .await
            .devices
            .iter()
            .find(|snapshot| snapshot.id == id)
            .cloned()
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}
