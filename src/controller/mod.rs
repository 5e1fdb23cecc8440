//! The map interaction state machine.
//!
//! Gestures accumulate a driver and a passenger point, a pickup request turns
//! them into a [`PickupResult`], and the result is drawn on the map. The
//! confirm/decline round-trip can replace the result with a new one.

pub mod render;
pub mod summary;

use uuid::Uuid;

use crate::config::Config;
use crate::entities::coordinate::LatLng;
use crate::entities::pickup::PickupResult;
use crate::entities::selection::{IntakeMode, Role, SelectionState};
use crate::error::{AppError, AppResult};
use crate::locate::Geolocator;
use crate::map::{MapWidget, MarkerStyle};
use crate::service::{ConfirmOutcome, ConfirmRequest, PickupRequest, PickupService};

use render::{RenderPlan, RenderReport, RenderedArtifacts};
use summary::Summary;

pub const BOTH_SELECTED: &str = "Both locations selected. Refresh to start over.";
pub const SELECT_BOTH: &str = "Please select both driver and passenger.";
pub const EMPTY_FEEDBACK: &str = "Please describe what is wrong with this pickup point.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    DriverSet,
    /// Role-select mode only.
    PassengerSet,
    BothSet,
    PickupRequested,
    PickupShown,
    ConfirmRequested,
    Confirmed,
    FeedbackPending,
    FeedbackSubmitted,
}

impl Phase {
    /// A request is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Phase::PickupRequested | Phase::ConfirmRequested | Phase::FeedbackSubmitted
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Set(Role),
    /// Click-order intake is complete; nothing changed.
    Locked,
}

pub struct MapController<M: MapWidget> {
    session_id: Uuid,
    map: M,
    selection: SelectionState,
    artifacts: RenderedArtifacts,
    /// Post-selection phase; `None` while still selecting.
    flow: Option<Phase>,
    /// `flow` to return to if the outstanding request fails.
    resume: Option<Phase>,
    result: Option<PickupResult>,
    summary: Option<Summary>,
    fit_padding_px: u32,
}

impl<M: MapWidget> MapController<M> {
    /// Entry point once the map widget exists.
    pub fn init(mut map: M, config: &Config) -> Self {
        map.set_view(config.map_center, config.map_zoom);
        let session_id = Uuid::new_v4();
        tracing::info!(session = %session_id, mode = ?config.intake_mode, "Map controller ready");

        Self {
            session_id,
            map,
            selection: SelectionState::new(config.intake_mode),
            artifacts: RenderedArtifacts::default(),
            flow: None,
            resume: None,
            result: None,
            summary: None,
            fit_padding_px: config.fit_padding_px,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn artifacts(&self) -> &RenderedArtifacts {
        &self.artifacts
    }

    pub fn result(&self) -> Option<&PickupResult> {
        self.result.as_ref()
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if let Some(flow) = self.flow {
            return flow;
        }
        match (self.selection.driver.is_set(), self.selection.passenger.is_set()) {
            (false, false) => Phase::Empty,
            (true, false) => Phase::DriverSet,
            (false, true) => Phase::PassengerSet,
            (true, true) => Phase::BothSet,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    // ============ Selection intake ============

    pub fn handle_click(&mut self, at: LatLng) -> AppResult<ClickOutcome> {
        match self.selection.next_target() {
            Some(role) => {
                self.set_endpoint(role, at)?;
                Ok(ClickOutcome::Set(role))
            }
            None => {
                tracing::info!(session = %self.session_id, "Click ignored, both locations selected");
                Ok(ClickOutcome::Locked)
            }
        }
    }

    pub fn select_role(&mut self, role: Role) -> AppResult<()> {
        if self.selection.mode != IntakeMode::RoleSelect {
            return Err(AppError::Validation(
                "Roles are assigned by click order in this mode".to_string(),
            ));
        }
        self.selection.active_role = role;
        tracing::debug!(session = %self.session_id, role = %role, "Role selected");
        Ok(())
    }

    /// Set the next target endpoint from the device's position.
    ///
    /// A failed location query leaves the selection untouched.
    pub async fn use_current_location<G: Geolocator>(&mut self, locator: &G) -> AppResult<Role> {
        self.ensure_idle()?;
        let role = self
            .selection
            .next_target()
            .ok_or_else(|| AppError::Validation(BOTH_SELECTED.to_string()))?;

        let at = locator.current_location().await.map_err(|e| {
            tracing::warn!(session = %self.session_id, error = %e, "Location query failed");
            e
        })?;

        self.set_endpoint(role, at)?;
        Ok(role)
    }

    fn set_endpoint(&mut self, role: Role, at: LatLng) -> AppResult<()> {
        // The outstanding request was built from the current endpoints.
        self.ensure_idle()?;
        if !at.is_valid() {
            return Err(AppError::Validation(format!(
                "{:.5}, {:.5} is not a valid location",
                at.lat, at.lng
            )));
        }

        let marker = self.map.add_marker(at, &MarkerStyle::endpoint(role))?;
        let endpoint = self.selection.endpoint_mut(role);
        let replaced = endpoint.coordinate.replace(at).is_some();
        if let Some(old) = endpoint.marker.replace(marker) {
            self.map.remove_layer(old);
        }

        // A moved endpoint makes the shown pickup stale.
        if replaced {
            self.flow = None;
        }

        tracing::info!(
            session = %self.session_id,
            role = %role,
            lat = at.lat,
            lng = at.lng,
            replaced,
            "Location set"
        );
        Ok(())
    }

    // ============ Pickup request ============

    /// Validate and mark a pickup request as outstanding.
    pub fn begin_pickup(&mut self) -> AppResult<PickupRequest> {
        self.ensure_idle()?;
        let (driver, passenger) = self
            .selection
            .both()
            .ok_or_else(|| AppError::Validation(SELECT_BOTH.to_string()))?;

        self.start(Phase::PickupRequested);
        let request = PickupRequest { driver, passenger };
        tracing::info!(session = %self.session_id, ?request, "Requesting pickup point");
        Ok(request)
    }

    /// Finish the request started by [`Self::begin_pickup`].
    pub fn complete_pickup(&mut self, outcome: AppResult<PickupResult>) -> AppResult<RenderReport> {
        let result = self.settle(Phase::PickupRequested, outcome)?;
        if let Some(message) = &result.message {
            tracing::info!(session = %self.session_id, %message, "Pickup message");
        }
        let report = self.render(result)?;
        self.flow = Some(Phase::PickupShown);
        Ok(report)
    }

    pub async fn find_pickup<S: PickupService>(&mut self, service: &S) -> AppResult<RenderReport> {
        let request = self.begin_pickup()?;
        let outcome = service.get_pickup(&request).await;
        self.complete_pickup(outcome)
    }

    // ============ Confirmation / feedback ============

    pub fn begin_confirm(&mut self) -> AppResult<ConfirmRequest> {
        self.ensure_idle()?;
        self.ensure_shown()?;
        self.start(Phase::ConfirmRequested);
        Ok(ConfirmRequest::accept())
    }

    /// Returns the acknowledgement to show.
    pub fn complete_confirm(&mut self, outcome: AppResult<ConfirmOutcome>) -> AppResult<Option<String>> {
        let outcome = self.settle(Phase::ConfirmRequested, outcome)?;
        if let Some(updated) = outcome.updated {
            self.render(updated)?;
        }
        self.flow = Some(Phase::Confirmed);
        tracing::info!(session = %self.session_id, "Pickup confirmed");
        Ok(outcome.message)
    }

    pub async fn confirm<S: PickupService>(&mut self, service: &S) -> AppResult<Option<String>> {
        let request = self.begin_confirm()?;
        let outcome = service.confirm_pickup(&request).await;
        self.complete_confirm(outcome)
    }

    /// Reject the shown pickup and wait for feedback text.
    pub fn decline(&mut self) -> AppResult<()> {
        self.ensure_idle()?;
        self.ensure_shown()?;
        self.flow = Some(Phase::FeedbackPending);
        tracing::debug!(session = %self.session_id, "Pickup declined, awaiting feedback");
        Ok(())
    }

    pub fn begin_feedback(&mut self, feedback: &str) -> AppResult<ConfirmRequest> {
        self.ensure_idle()?;
        if self.phase() != Phase::FeedbackPending {
            return Err(AppError::Validation(
                "Decline the pickup point before sending feedback".to_string(),
            ));
        }
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(AppError::Validation(EMPTY_FEEDBACK.to_string()));
        }

        self.start(Phase::FeedbackSubmitted);
        tracing::info!(session = %self.session_id, feedback, "Sending feedback");
        Ok(ConfirmRequest::decline(feedback))
    }

    /// Returns the acknowledgement to show. An updated pickup replaces the
    /// current one.
    pub fn complete_feedback(&mut self, outcome: AppResult<ConfirmOutcome>) -> AppResult<Option<String>> {
        let outcome = self.settle(Phase::FeedbackSubmitted, outcome)?;
        if let Some(updated) = outcome.updated {
            self.render(updated)?;
        }
        self.flow = Some(Phase::PickupShown);
        Ok(outcome.message)
    }

    pub async fn submit_feedback<S: PickupService>(
        &mut self,
        service: &S,
        feedback: &str,
    ) -> AppResult<Option<String>> {
        let request = self.begin_feedback(feedback)?;
        let outcome = service.confirm_pickup(&request).await;
        self.complete_feedback(outcome)
    }

    // ============ Render ============

    /// Replace the drawn pickup, routes and summary with `result`.
    pub fn render(&mut self, result: PickupResult) -> AppResult<RenderReport> {
        let (driver, passenger) = self
            .selection
            .both()
            .ok_or_else(|| AppError::Validation(SELECT_BOTH.to_string()))?;

        let plan = RenderPlan::build(&result, driver, passenger);
        let report = render::apply(&plan, &mut self.map, &mut self.artifacts, self.fit_padding_px)?;

        self.summary = Some(Summary::new(&result, driver, passenger));
        self.result = Some(result);
        tracing::info!(
            session = %self.session_id,
            pickup_lat = plan.pickup.lat,
            pickup_lng = plan.pickup.lng,
            driver_fallback = report.driver_fallback,
            passenger_fallback = report.passenger_fallback,
            "Pickup rendered"
        );
        Ok(report)
    }

    // ============ Helpers ============

    fn ensure_idle(&self) -> AppResult<()> {
        if self.is_busy() {
            return Err(AppError::Busy);
        }
        Ok(())
    }

    fn ensure_shown(&self) -> AppResult<()> {
        match self.phase() {
            Phase::PickupShown | Phase::FeedbackPending => Ok(()),
            _ => Err(AppError::Validation(
                "There is no pickup point to respond to".to_string(),
            )),
        }
    }

    fn start(&mut self, phase: Phase) {
        self.resume = self.flow;
        self.flow = Some(phase);
    }

    /// Leave the outstanding phase for the one the request started from.
    /// Callers move on to the next phase only once the outcome is handled.
    fn settle<T>(&mut self, expected: Phase, outcome: AppResult<T>) -> AppResult<T> {
        if self.flow != Some(expected) {
            return Err(AppError::Validation("No such request is in progress".to_string()));
        }
        self.flow = self.resume.take();
        outcome.map_err(|e| {
            tracing::error!(session = %self.session_id, error = %e, "Request failed");
            e
        })
    }
}
