use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::config::Config;
use crate::entities::pickup::PickupResult;
use crate::error::AppResult;
use crate::service::wire::{decode_confirm_response, decode_pickup_response};
use crate::service::{ConfirmOutcome, ConfirmRequest, PickupRequest, PickupService};

/// JSON-over-HTTP client for the pickup backend.
#[derive(Debug, Clone)]
pub struct HttpPickupService {
    client: Client,
    pickup_url: String,
    confirm_url: String,
}

impl HttpPickupService {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            pickup_url: config.pickup_url(),
            confirm_url: config.confirm_url(),
        })
    }

    /// Returns whether the status was a success along with the raw body.
    async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> AppResult<(bool, String)> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            tracing::debug!(url, status = %status, bytes = text.len(), "Response received");
        } else {
            tracing::warn!(url, status = %status, "Request failed");
        }

        Ok((status.is_success(), text))
    }
}

impl PickupService for HttpPickupService {
    async fn get_pickup(&self, request: &PickupRequest) -> AppResult<PickupResult> {
        tracing::debug!(url = %self.pickup_url, ?request, "Sending pickup request");
        let (ok, body) = self.post_json(&self.pickup_url, request).await?;
        decode_pickup_response(ok, &body)
    }

    async fn confirm_pickup(&self, request: &ConfirmRequest) -> AppResult<ConfirmOutcome> {
        tracing::debug!(url = %self.confirm_url, ?request, "Sending confirmation");
        let (ok, body) = self.post_json(&self.confirm_url, request).await?;
        decode_confirm_response(ok, &body)
    }
}
