use std::sync::Arc;
use std::time::Duration;

use fleettrack_client::configs::settings::Settings;
use fleettrack_client::services::{ApiService, DeviceStore, Poller, StoreEvent};

#[tokio::main]
async fn main() {
    let settings = Settings::new().expect("Failed to load settings.");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level}").into()
        }))
        .init();

    let store = Arc::new(DeviceStore::new());
    let poller = Poller::new(
        Arc::new(ApiService::new(&settings.server)),
        Arc::clone(&store),
        Duration::from_secs(settings.polling.interval_secs),
        settings.polling.loading_mode,
    );

    let mut events = store.subscribe();

    poller.start(settings.polling.tracking_active).await;
    tracing::info!(
        "polling {} every {}s",
        settings.server.url,
        settings.polling.interval_secs
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(StoreEvent::DevicesReplaced { count }) => {
                    tracing::info!("fleet snapshot replaced: {count} devices");
                }
                Ok(StoreEvent::LoadingChanged(loading)) => {
                    tracing::debug!("loading: {loading}");
                }
                Ok(StoreEvent::ErrorChanged(Some(message))) => {
                    tracing::warn!("poll failed: {message}");
                }
                Ok(StoreEvent::ErrorChanged(None)) => {}
                Err(_) => break,
            },
        }
    }

    poller.stop().await;
}
