use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use fleettrack_api::merge_snapshots;

use crate::services::api_service::FleetApi;
use crate::services::device_store::DeviceStore;

/// Which poll cycles toggle the store's loading flag while tracking is
/// active.
///
/// Historically the client only showed a spinner around the first fetch
/// after tracking started; `EveryCycle` is the alternative reading and both
/// stay available behind this option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadingMode {
    #[default]
    FirstCycleOnly,
    EveryCycle,
}

/// Repeating fetch-merge-publish task that keeps a [`DeviceStore`] fresh.
///
/// At most one timer exists per poller: `start` cancels any previous timer
/// before scheduling a new one, and `stop` cancels it outright. Cycles
/// already in flight when the timer changes hands are fenced off by a
/// generation counter and discard their results instead of writing stale
/// data.
pub struct Poller {
    api: Arc<dyn FleetApi>,
    store: Arc<DeviceStore>,
    interval: Duration,
    loading_mode: LoadingMode,
    generation: Arc<AtomicU64>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(
        api: Arc<dyn FleetApi>,
        store: Arc<DeviceStore>,
        interval: Duration,
        loading_mode: LoadingMode,
    ) -> Self {
        Self {
            api,
            store,
            interval,
            loading_mode,
            generation: Arc::new(AtomicU64::new(0)),
            task: Mutex::new(None),
        }
    }

    /// Begin polling. The first cycle runs immediately rather than waiting
    /// out the first interval; calling `start` while a timer is already
    /// running cancels the old timer first, so exactly one survives.
    pub async fn start(&self, tracking_active: bool) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);
        let current = Arc::clone(&self.generation);
        let interval = self.interval;
        let loading_mode = self.loading_mode;

        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut cycle: u64 = 0;
            loop {
                ticker.tick().await;

                let show_loading = tracking_active
                    && (cycle == 0 || loading_mode == LoadingMode::EveryCycle);

                // Cycles run detached so a slow backend never delays the
                // next tick; overlapping cycles race and the last writer
                // wins.
                tokio::spawn(run_cycle(
                    Arc::clone(&api),
                    Arc::clone(&store),
                    Arc::clone(&current),
                    generation,
                    show_loading,
                ));

                cycle += 1;
            }
        }));
    }

    /// Cancel the repeating timer, if any, and reset the loading flag.
    /// Calling this without a running timer is a no-op.
    pub async fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let mut task = self.task.lock().await;
        if let Some(previous) = task.take() {
            previous.abort();
        }
        drop(task);

        self.store.set_loading(false).await;
    }

    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }
}

/// One fetch-merge-publish cycle. Both lists are requested concurrently;
/// only a fully successful pair is merged and published. Any failure is
/// logged and recorded on the store, leaving the previous collection in
/// place for the next tick to retry.
async fn run_cycle(
    api: Arc<dyn FleetApi>,
    store: Arc<DeviceStore>,
    current: Arc<AtomicU64>,
    generation: u64,
    show_loading: bool,
) {
    let live = || current.load(Ordering::SeqCst) == generation;

    if show_loading && live() {
        store.set_loading(true).await;
    }

    let (devices, positions) = tokio::join!(api.fetch_devices(), api.fetch_positions());

    match (devices, positions) {
        (Ok(devices), Ok(positions)) => {
            let snapshots = merge_snapshots(devices, positions);

            if live() {
                tracing::debug!("publishing {} device snapshots", snapshots.len());
                store.set_devices(snapshots).await;
                store.set_error(None).await;
            } else {
                tracing::debug!("discarding poll result from a cancelled cycle");
            }
        }
        (devices, positions) => {
            let reason = devices
                .err()
                .map(|error| error.to_string())
                .into_iter()
                .chain(positions.err().map(|error| error.to_string()))
                .collect::<Vec<_>>()
                .join("; ");

            tracing::warn!("poll cycle failed, keeping previous snapshot: {reason}");

            if live() {
                store.set_error(Some(reason)).await;
            }
        }
    }

    if show_loading && live() {
        store.set_loading(false).await;
    }
}
