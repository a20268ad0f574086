use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use fleettrack_api::{Device, Position};

use crate::configs::settings::{AuthScheme, Server};
use crate::errors::ApiError;

const DEVICES_ENDPOINT: &str = "/api/devices";
const POSITIONS_ENDPOINT: &str = "/api/positions";

/// Read side of the fleet backend consumed by the poller.
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// Fetch the full device list.
    async fn fetch_devices(&self) -> Result<Vec<Device>, ApiError>;

    /// Fetch the current position list.
    async fn fetch_positions(&self) -> Result<Vec<Position>, ApiError>;
}

pub struct ApiService {
    client: reqwest::Client,
    base_url: String,
    auth: Option<AuthScheme>,
}

impl ApiService {
    pub fn new(server: &Server) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: server.url.trim_end_matches('/').to_string(),
            auth: server.auth.clone(),
        }
    }

    fn request(&self, endpoint: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, endpoint));

        match &self.auth {
            Some(AuthScheme::Session { cookie }) => request.header("Cookie", cookie),
            Some(AuthScheme::Token { token }) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, ApiError> {
        let response = self.request(endpoint).send().await.map_err(|source| {
            ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        response.json().await.map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl FleetApi for ApiService {
    async fn fetch_devices(&self) -> Result<Vec<Device>, ApiError> {
        self.fetch_list(DEVICES_ENDPOINT).await
    }

    async fn fetch_positions(&self) -> Result<Vec<Position>, ApiError> {
        self.fetch_list(POSITIONS_ENDPOINT).await
    }
}
