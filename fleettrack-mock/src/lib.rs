use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use fleettrack_api::{Device, Position};

use crate::fleet::SimulatedFleet;
use crate::settings::Settings;

mod fleet;
pub mod settings;

/// In-memory stand-in for the fleet backend's read endpoints.
///
/// Serves `GET /api/devices` and `GET /api/positions` over a simulated
/// fleet. Failure injection toggles make either endpoint answer 500, and an
/// expected bearer token can be required for testing the auth path.
#[derive(Clone)]
pub struct MockBackend {
    fleet: Arc<SimulatedFleet>,
    fail_devices: Arc<AtomicBool>,
    fail_positions: Arc<AtomicBool>,
    expected_token: Option<String>,
}

impl MockBackend {
    pub fn new(vehicles: usize) -> Self {
        Self {
            fleet: Arc::new(SimulatedFleet::new(vehicles)),
            fail_devices: Arc::new(AtomicBool::new(false)),
            fail_positions: Arc::new(AtomicBool::new(false)),
            expected_token: None,
        }
    }

    /// Require `Authorization: Bearer <token>` on every request.
    pub fn with_expected_token(mut self, token: &str) -> Self {
        self.expected_token = Some(token.to_string());
        self
    }

    pub fn set_fail_devices(&self, fail: bool) {
        self.fail_devices.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_positions(&self, fail: bool) {
        self.fail_positions.store(fail, Ordering::SeqCst);
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/devices", get(list_devices))
            .route("/api/positions", get(list_positions))
            .with_state(self.clone())
            .layer(CorsLayer::permissive())
    }

    /// Bind an ephemeral local port and serve in a background task.
    pub async fn spawn(&self) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let router = self.router();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("mock backend stopped: {e}");
            }
        });

        Ok(address)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let Some(expected) = &self.expected_token else {
            return Ok(());
        };

        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value == format!("Bearer {expected}"))
            .unwrap_or(false);

        if authorized {
            Ok(())
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn list_devices(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> Result<Json<Vec<Device>>, StatusCode> {
    backend.authorize(&headers)?;

    if backend.fail_devices.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(backend.fleet.devices().await))
}

async fn list_positions(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> Result<Json<Vec<Position>>, StatusCode> {
    backend.authorize(&headers)?;

    if backend.fail_positions.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(backend.fleet.positions().await))
}

pub async fn run(settings: &Arc<Settings>) {
    let backend = MockBackend::new(settings.mock.vehicles);

    let address = format!("{}:{}", settings.mock.host, settings.mock.port);
    let listener = TcpListener::bind(&address)
        .await
        .expect("Fail to bind mock backend address.");

    tracing::info!("mock fleet backend listening on {address}");

    axum::serve(listener, backend.router()).await.unwrap();
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_list_devices() {
        let backend = MockBackend::new(2);

        let request = Request::builder()
            .uri("/api/devices")
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        let response = backend.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let devices: Vec<Device> = serde_json::from_slice(&body).unwrap();
        assert_eq!(devices.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = MockBackend::new(1);
        backend.set_fail_positions(true);

        let request = Request::builder()
            .uri("/api/positions")
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        let response = backend.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        backend.set_fail_positions(false);

        let request = Request::builder()
            .uri("/api/positions")
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        let response = backend.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_expected_token_enforced() {
        let backend = MockBackend::new(1).with_expected_token("secret");

        let request = Request::builder()
            .uri("/api/devices")
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        let response = backend.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/api/devices")
            .method(Method::GET)
            .header("Authorization", "Bearer secret")
            .body(Body::empty())
            .unwrap();

        let response = backend.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
