//! Permission/tracking state machine
//!
//! [`TrackingController`] is the single entry point for start/stop intent and
//! the single recipient of permission results, location updates, and host
//! lifecycle events. All of these arrive serialized on one thread, so the
//! controller holds plain fields and no locks.
//!
//! Two facts are kept apart:
//! - `tracking_intent`: the caller wants updates. Survives pause/resume and is
//!   what [`TrackingController::is_tracking_location`] reports.
//! - `subscription`: a platform subscription is open. Only this gates
//!   delivery to the location observer.
//!
//! At most one subscription is open at a time; opening while one is open is a
//! guarded no-op and closing when none is open does nothing.

use std::rc::Rc;

use locwatch_core::prelude::*;
use locwatch_core::{
    DenialOutcome, LifecyclePhase, Location, ObserverId, PermissionStatus, RequestCode,
    SubscriptionHandle, TrackingState,
};
use locwatch_platform::{LocationSource, PermissionSource};

use crate::tracker_config::TrackerConfig;

/// Mediates between tracking intent, runtime permission, and the host lifecycle
pub struct TrackingController {
    config: TrackerConfig,
    permissions: Rc<dyn PermissionSource>,
    locations: Rc<dyn LocationSource>,
    observer_id: ObserverId,

    tracking_intent: bool,
    subscription: Option<SubscriptionHandle>,
    /// A tracking permission request is outstanding
    awaiting_permission: bool,
    /// Set by the first rationale-showable denial; never reset
    rationale_already_shown: bool,
    phase: LifecyclePhase,
}

impl TrackingController {
    /// Build a controller and register it with the configuration's lifecycle source
    pub fn new(
        config: TrackerConfig,
        permissions: Rc<dyn PermissionSource>,
        locations: Rc<dyn LocationSource>,
    ) -> Self {
        let observer_id = config.lifecycle().add_observer();
        debug!(
            "Tracking controller created for {} (observer {})",
            config.permission(),
            observer_id.id()
        );

        Self {
            config,
            permissions,
            locations,
            observer_id,
            tracking_intent: false,
            subscription: None,
            awaiting_permission: false,
            rationale_already_shown: false,
            phase: LifecyclePhase::Created,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the caller wants tracking
    ///
    /// This reports intent, not delivery: it stays `true` while the host is
    /// paused and no subscription is open.
    pub fn is_tracking_location(&self) -> bool {
        self.tracking_intent
    }

    pub fn state(&self) -> TrackingState {
        if !self.tracking_intent {
            TrackingState::Idle
        } else if self.awaiting_permission {
            TrackingState::RequestingPermission
        } else if self.subscription.is_some() {
            TrackingState::Tracking
        } else {
            TrackingState::Suspended
        }
    }

    pub fn lifecycle_phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Caller Intent
    // ─────────────────────────────────────────────────────────────────────────

    /// Start tracking, requesting the permission first if it is not granted
    ///
    /// No-op while already tracking or while a request is outstanding.
    pub fn start_tracking(&mut self) {
        if self.ensure_alive("start_tracking").is_err() {
            return;
        }

        match self.state() {
            TrackingState::Tracking | TrackingState::RequestingPermission => {
                trace!("start_tracking ignored in state {}", self.state());
                return;
            }
            TrackingState::Idle | TrackingState::Suspended => {}
        }

        self.tracking_intent = true;
        self.attempt_tracking();
    }

    /// Stop tracking and close the subscription. No-op when not tracking.
    pub fn stop_tracking(&mut self) {
        if self.ensure_alive("stop_tracking").is_err() {
            return;
        }

        if !self.tracking_intent {
            trace!("stop_tracking ignored: not tracking");
            return;
        }

        self.tracking_intent = false;
        self.awaiting_permission = false;
        self.close_subscription();
        debug!("Tracking stopped");
    }

    /// Open the platform's app settings screen, the usual escalation after a
    /// permanent denial
    pub fn open_app_settings(&self, application_id: &str) -> Result<()> {
        self.permissions
            .open_app_settings(application_id)
            .with_context(|| format!("Failed to open settings for {}", application_id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Platform Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle the platform's answer to a permission request
    ///
    /// Results that do not match the outstanding tracking request are ignored
    /// without touching state. A grant opens the subscription; a denial clears
    /// intent and invokes exactly one denial hook.
    pub fn on_permission_result(&mut self, request_code: RequestCode, grants: &[PermissionStatus]) {
        if self.ensure_alive("on_permission_result").is_err() {
            return;
        }

        if let Err(e) = self.accept_result(request_code) {
            debug!("Ignoring permission result: {}", e);
            return;
        }
        self.awaiting_permission = false;

        let granted = grants
            .first()
            .map(PermissionStatus::is_granted)
            .unwrap_or(false);
        if granted {
            info!("Permission {} granted", self.config.permission());
            self.begin_updates();
            return;
        }

        self.tracking_intent = false;
        self.close_subscription();

        let outcome = self.classify_denial();
        info!("Permission {} denied ({})", self.config.permission(), outcome);
        self.config.notify_denied(outcome);
    }

    /// Forward a delivered fix to the observer, only while tracking
    ///
    /// Fixes arriving after stop, pause, or destroy are dropped.
    pub fn on_location_update(&self, location: &Location) {
        if self.phase == LifecyclePhase::Destroyed {
            trace!("Dropping location: controller destroyed");
            return;
        }

        if self.state() == TrackingState::Tracking {
            self.config.notify_location(location);
        } else {
            trace!("Dropping location in state {}", self.state());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Host Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Host became visible: reopen the subscription if tracking was intended
    pub fn on_lifecycle_resume(&mut self) {
        if self.ensure_alive("on_lifecycle_resume").is_err() {
            return;
        }
        self.phase = LifecyclePhase::Resumed;

        if self.tracking_intent && self.subscription.is_none() && !self.awaiting_permission {
            debug!("Resuming tracking");
            self.attempt_tracking();
        }
    }

    /// Host left the foreground: suspend delivery but keep the intent
    pub fn on_lifecycle_leave(&mut self) {
        if self.ensure_alive("on_lifecycle_leave").is_err() {
            return;
        }
        self.phase = LifecyclePhase::Paused;

        if self.subscription.is_some() {
            self.close_subscription();
            debug!("Tracking suspended");
        }
    }

    /// Host is gone: release the subscription and the lifecycle registration
    ///
    /// Terminal. Every later event is ignored.
    pub fn on_lifecycle_destroy(&mut self) {
        if self.phase == LifecyclePhase::Destroyed {
            return;
        }
        self.release();
        debug!("Tracking controller destroyed");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_alive(&self, operation: &str) -> Result<()> {
        if self.phase == LifecyclePhase::Destroyed {
            warn!("{} ignored: controller destroyed", operation);
            return Err(Error::ControllerDestroyed);
        }
        Ok(())
    }

    fn accept_result(&self, request_code: RequestCode) -> Result<()> {
        if request_code != RequestCode::TRACKING || !self.awaiting_permission {
            return Err(Error::stale_result(request_code));
        }
        Ok(())
    }

    /// Subscribe if the permission is granted, otherwise ask for it
    fn attempt_tracking(&mut self) {
        let permission = self.config.permission();
        if self.permissions.check_permission(permission).is_granted() {
            self.begin_updates();
        } else {
            self.awaiting_permission = true;
            debug!("Requesting {} (request {})", permission, RequestCode::TRACKING);
            self.permissions
                .request_permission(permission, RequestCode::TRACKING);
        }
    }

    /// Open the subscription unless the host is paused, in which case resume opens it
    fn begin_updates(&mut self) {
        if self.phase == LifecyclePhase::Paused {
            debug!("Host paused, subscription deferred until resume");
            return;
        }

        match self.open_subscription() {
            Ok(handle) => debug!("Tracking with subscription {}", handle.id()),
            Err(e) => debug!("{}", e),
        }
    }

    fn open_subscription(&mut self) -> Result<SubscriptionHandle> {
        if self.subscription.is_some() {
            return Err(Error::SubscriptionAlreadyOpen);
        }

        let handle = self.locations.subscribe(&self.config.location_request());
        self.subscription = Some(handle);
        Ok(handle)
    }

    fn close_subscription(&mut self) {
        if let Some(handle) = self.subscription.take() {
            self.locations.unsubscribe(handle);
        }
    }

    fn classify_denial(&mut self) -> DenialOutcome {
        if !self
            .permissions
            .should_show_rationale(self.config.permission())
        {
            DenialOutcome::Forever
        } else if !self.rationale_already_shown {
            self.rationale_already_shown = true;
            DenialOutcome::FirstTime
        } else {
            DenialOutcome::Again
        }
    }

    fn release(&mut self) {
        self.close_subscription();
        self.awaiting_permission = false;
        self.config.lifecycle().remove_observer(self.observer_id);
        self.phase = LifecyclePhase::Destroyed;
    }
}

impl Drop for TrackingController {
    fn drop(&mut self) {
        if self.phase != LifecyclePhase::Destroyed {
            debug!("Tracking controller dropped before destroy, releasing");
            self.release();
        }
    }
}
