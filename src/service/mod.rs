pub mod http;
pub mod wire;

use serde::Serialize;

use crate::entities::coordinate::LatLng;
use crate::entities::pickup::PickupResult;
use crate::error::AppResult;

pub use http::HttpPickupService;

/// Body of `POST /get_pickup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupRequest {
    pub driver: LatLng,
    pub passenger: LatLng,
}

/// Body of `POST /confirm_pickup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmRequest {
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ConfirmRequest {
    pub fn accept() -> Self {
        Self {
            confirmed: true,
            feedback: None,
        }
    }

    pub fn decline(feedback: impl Into<String>) -> Self {
        Self {
            confirmed: false,
            feedback: Some(feedback.into()),
        }
    }
}

/// Successful reply to a confirmation or feedback submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfirmOutcome {
    pub message: Option<String>,
    /// Present when the service re-planned after feedback.
    pub updated: Option<PickupResult>,
}

/// Backend that picks the meeting point. One attempt per call, no retries.
#[allow(async_fn_in_trait)]
pub trait PickupService {
    async fn get_pickup(&self, request: &PickupRequest) -> AppResult<PickupResult>;

    async fn confirm_pickup(&self, request: &ConfirmRequest) -> AppResult<ConfirmOutcome>;
}
