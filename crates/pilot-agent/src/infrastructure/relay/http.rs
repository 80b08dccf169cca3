//! HTTP client for the relay control API.
//!
//! All endpoints speak JSON relative to the configured origin.  Error bodies
//! carry `{"message": "..."}`, which is decoded into [`RelayError::Api`] so
//! callers can show the relay's own wording to the user.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use pilot_core::{CustomCommand, Device};

use crate::application::session::ControllerDirectory;
use crate::domain::AgentConfig;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Faults talking to the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Transport-level failure: connect refused, timeout, bad TLS.
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The relay answered with an error body.
    #[error("relay rejected request: {0}")]
    Api(String),
    /// WebSocket-level failure.
    #[error("relay socket error: {0}")]
    Socket(String),
}

// ── Wire shapes ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct ListenBody {
    key: String,
}

#[derive(Deserialize)]
struct ControllerBody {
    name: String,
}

#[derive(Deserialize)]
struct CommandsBody {
    data: Vec<CustomCommand>,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Typed client over the relay's control endpoints.
pub struct RelayApi {
    origin: String,
    client: reqwest::Client,
}

impl RelayApi {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            origin: config.http_origin(),
            client: reqwest::Client::new(),
        }
    }

    /// `POST /device/`: announces the device to the relay registry.
    pub async fn register(&self, device: &Device) -> Result<(), RelayError> {
        let body = json!({
            "id": device.id,
            "data": {
                "meta": {
                    "name": device.name,
                    "type": device.platform,
                },
            },
        });
        let response = self
            .client
            .post(format!("{}/device/", self.origin))
            .json(&body)
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    /// `PUT /device/listen/`: starts a listening session and returns the
    /// access key a controller needs to pair.
    pub async fn listen(&self, device_id: &str) -> Result<String, RelayError> {
        let response = self
            .client
            .put(format!("{}/device/listen/", self.origin))
            .json(&json!({ "id": device_id }))
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        let body: ListenBody = response.json().await?;
        Ok(body.key)
    }

    /// `PUT /device/stop/`: releases the access key server-side.
    pub async fn stop(&self, device_id: &str) -> Result<(), RelayError> {
        let response = self
            .client
            .put(format!("{}/device/stop/", self.origin))
            .json(&json!({ "id": device_id }))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    /// `GET /controller/{id}/`: resolves a controller descriptor.
    pub async fn controller(&self, controller_id: &str) -> Result<String, RelayError> {
        let response = self
            .client
            .get(format!("{}/controller/{controller_id}/", self.origin))
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        let body: ControllerBody = response.json().await?;
        Ok(body.name)
    }

    /// `GET /device/{id}/commands/`: loads the saved custom command list.
    pub async fn load_commands(&self, device_id: &str) -> Result<Vec<CustomCommand>, RelayError> {
        let response = self
            .client
            .get(format!("{}/device/{device_id}/commands/", self.origin))
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        let body: CommandsBody = response.json().await?;
        Ok(body.data)
    }

    /// `PUT /device/{id}/commands/`: replaces the saved custom command list.
    pub async fn save_commands(
        &self,
        device_id: &str,
        commands: &[CustomCommand],
    ) -> Result<(), RelayError> {
        let response = self
            .client
            .put(format!("{}/device/{device_id}/commands/", self.origin))
            .json(&json!({ "data": commands }))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    /// Turns a non-2xx response into [`RelayError::Api`], preferring the
    /// relay's own `{message}` body over the bare status code.
    async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response, RelayError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => format!("unexpected status {status}"),
        };
        Err(RelayError::Api(message))
    }
}

#[async_trait]
impl ControllerDirectory for RelayApi {
    async fn controller_name(&self, id: &str) -> Option<String> {
        match self.controller(id).await {
            Ok(name) => Some(name),
            Err(e) => {
                warn!(controller = %id, "controller lookup failed: {e}");
                None
            }
        }
    }
}
