//! In-process platform simulation
//!
//! Models the parts of a mobile platform the tracking controller depends on:
//! runtime permissions with a rationale flag and a "don't ask again" latch,
//! a handle-keyed subscription table, and lifecycle observer registration.
//!
//! # Permission model
//!
//! - A request leaves a single pending dialog; a second request replaces it.
//! - [`UserResponse::Deny`] makes the rationale showable afterwards.
//! - [`UserResponse::DenyForever`] latches the permission: the rationale is no
//!   longer showable and every later response resolves as denied.
//! - [`SimulatedPlatform::grant`] (a change made in system settings) clears the latch.
//!
//! The state is shared through `Rc<RefCell<_>>`, so a clone handed to the
//! controller and the clone kept by the host observe the same platform. Like
//! the platforms it stands in for, it is confined to one thread.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::rc::Rc;

use locwatch_core::prelude::*;
use locwatch_core::{
    LocationRequest, ObserverId, PermissionStatus, RequestCode, SubscriptionHandle,
};

use crate::{LifecycleSource, LocationSource, PermissionResult, PermissionSource};

/// What the user does with the simulated permission dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserResponse {
    Grant,
    Deny,
    /// Deny and tick "don't ask again"
    DenyForever,
}

#[derive(Debug, Clone)]
struct PendingRequest {
    permission: String,
    request_code: RequestCode,
}

#[derive(Debug, Default)]
struct PlatformState {
    granted: HashSet<String>,
    rationale: HashSet<String>,
    never_ask_again: HashSet<String>,
    pending: Option<PendingRequest>,
    subscriptions: BTreeMap<u64, LocationRequest>,
    next_handle: u64,
    observers: BTreeSet<u64>,
    next_observer: u64,
    request_count: usize,
    subscribe_count: usize,
    settings_opened: Vec<String>,
}

/// Simulated platform implementing every collaborator trait
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlatform {
    state: Rc<RefCell<PlatformState>>,
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform on which `permission` is already granted
    pub fn with_granted(permission: &str) -> Self {
        let platform = Self::new();
        platform.grant(permission);
        platform
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission control (host side)
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `permission` outside any dialog, as the settings screen would
    pub fn grant(&self, permission: &str) {
        let mut state = self.state.borrow_mut();
        state.granted.insert(permission.to_string());
        state.never_ask_again.remove(permission);
        state.rationale.remove(permission);
    }

    /// Revoke `permission` outside any dialog
    pub fn revoke(&self, permission: &str) {
        self.state.borrow_mut().granted.remove(permission);
    }

    /// Request code of the dialog currently on screen
    pub fn pending_request(&self) -> Option<RequestCode> {
        self.state
            .borrow()
            .pending
            .as_ref()
            .map(|pending| pending.request_code)
    }

    /// Resolve the pending dialog, returning the result the platform delivers
    ///
    /// Returns `None` when no request is pending.
    pub fn respond(&self, response: UserResponse) -> Option<PermissionResult> {
        let mut state = self.state.borrow_mut();
        let pending = state.pending.take()?;
        let permission = pending.permission;

        let status = if state.never_ask_again.contains(&permission) {
            debug!("{} is latched as denied, ignoring {:?}", permission, response);
            PermissionStatus::Denied
        } else {
            match response {
                UserResponse::Grant => {
                    state.granted.insert(permission.clone());
                    state.rationale.remove(&permission);
                    PermissionStatus::Granted
                }
                UserResponse::Deny => {
                    state.granted.remove(&permission);
                    state.rationale.insert(permission.clone());
                    PermissionStatus::Denied
                }
                UserResponse::DenyForever => {
                    state.granted.remove(&permission);
                    state.rationale.remove(&permission);
                    state.never_ask_again.insert(permission.clone());
                    PermissionStatus::Denied
                }
            }
        };

        debug!(
            "Permission dialog for {} resolved as {:?} (request {})",
            permission, status, pending.request_code
        );
        Some(PermissionResult::new(pending.request_code, vec![status]))
    }

    /// Number of permission requests made so far
    pub fn request_count(&self) -> usize {
        self.state.borrow().request_count
    }

    /// Application ids whose settings screen was opened, oldest first
    pub fn settings_opened(&self) -> Vec<String> {
        self.state.borrow().settings_opened.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Subscription inspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn open_subscriptions(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }

    /// Parameters of the most recently opened subscription that is still open
    pub fn active_request(&self) -> Option<LocationRequest> {
        self.state
            .borrow()
            .subscriptions
            .values()
            .next_back()
            .copied()
    }

    /// Number of subscriptions ever opened
    pub fn subscribe_count(&self) -> usize {
        self.state.borrow().subscribe_count
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }
}

impl PermissionSource for SimulatedPlatform {
    fn check_permission(&self, permission: &str) -> PermissionStatus {
        if self.state.borrow().granted.contains(permission) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    fn request_permission(&self, permission: &str, request_code: RequestCode) {
        let mut state = self.state.borrow_mut();
        if let Some(previous) = state.pending.as_ref() {
            warn!(
                "Replacing pending permission dialog for {} (request {})",
                previous.permission, previous.request_code
            );
        }
        state.request_count += 1;
        state.pending = Some(PendingRequest {
            permission: permission.to_string(),
            request_code,
        });
    }

    fn should_show_rationale(&self, permission: &str) -> bool {
        self.state.borrow().rationale.contains(permission)
    }

    fn open_app_settings(&self, application_id: &str) -> Result<()> {
        if application_id.trim().is_empty() {
            return Err(Error::platform("application id is empty"));
        }
        self.state
            .borrow_mut()
            .settings_opened
            .push(application_id.to_string());
        info!("Opened settings screen for {}", application_id);
        Ok(())
    }
}

impl LocationSource for SimulatedPlatform {
    fn subscribe(&self, request: &LocationRequest) -> SubscriptionHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        state.subscribe_count += 1;
        let id = state.next_handle;
        state.subscriptions.insert(id, *request);
        debug!(
            "Subscription {} opened (interval {}ms, fastest {}ms, {})",
            id, request.interval_ms, request.fastest_interval_ms, request.accuracy
        );
        SubscriptionHandle::new(id)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        if self
            .state
            .borrow_mut()
            .subscriptions
            .remove(&handle.id())
            .is_some()
        {
            debug!("Subscription {} closed", handle.id());
        } else {
            trace!("Subscription {} was not open", handle.id());
        }
    }
}

impl LifecycleSource for SimulatedPlatform {
    fn add_observer(&self) -> ObserverId {
        let mut state = self.state.borrow_mut();
        state.next_observer += 1;
        let id = state.next_observer;
        state.observers.insert(id);
        ObserverId::new(id)
    }

    fn remove_observer(&self, id: ObserverId) {
        self.state.borrow_mut().observers.remove(&id.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locwatch_core::{Accuracy, DEFAULT_PERMISSION};

    // ─────────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_permission_denied_by_default() {
        let platform = SimulatedPlatform::new();
        assert_eq!(
            platform.check_permission(DEFAULT_PERMISSION),
            PermissionStatus::Denied
        );
        assert!(!platform.should_show_rationale(DEFAULT_PERMISSION));
    }

    #[test]
    fn test_respond_without_pending_request() {
        let platform = SimulatedPlatform::new();
        assert!(platform.respond(UserResponse::Grant).is_none());
    }

    #[test]
    fn test_grant_response() {
        let platform = SimulatedPlatform::new();
        platform.request_permission(DEFAULT_PERMISSION, RequestCode::TRACKING);
        assert_eq!(platform.pending_request(), Some(RequestCode::TRACKING));

        let result = platform.respond(UserResponse::Grant).unwrap();
        assert_eq!(result.request_code, RequestCode::TRACKING);
        assert!(result.is_granted());
        assert!(platform.check_permission(DEFAULT_PERMISSION).is_granted());
        assert!(platform.pending_request().is_none());
    }

    #[test]
    fn test_deny_makes_rationale_showable() {
        let platform = SimulatedPlatform::new();
        platform.request_permission(DEFAULT_PERMISSION, RequestCode::TRACKING);

        let result = platform.respond(UserResponse::Deny).unwrap();
        assert!(!result.is_granted());
        assert!(platform.should_show_rationale(DEFAULT_PERMISSION));
    }

    #[test]
    fn test_deny_forever_latches() {
        let platform = SimulatedPlatform::new();
        platform.request_permission(DEFAULT_PERMISSION, RequestCode::TRACKING);
        platform.respond(UserResponse::DenyForever).unwrap();
        assert!(!platform.should_show_rationale(DEFAULT_PERMISSION));

        // Later grants through the dialog are ignored
        platform.request_permission(DEFAULT_PERMISSION, RequestCode::TRACKING);
        let result = platform.respond(UserResponse::Grant).unwrap();
        assert!(!result.is_granted());

        // The settings screen clears the latch
        platform.grant(DEFAULT_PERMISSION);
        assert!(platform.check_permission(DEFAULT_PERMISSION).is_granted());
    }

    #[test]
    fn test_open_app_settings() {
        let platform = SimulatedPlatform::new();
        platform.open_app_settings("com.example.app").unwrap();
        assert_eq!(platform.settings_opened(), vec!["com.example.app"]);

        let err = platform.open_app_settings("  ").unwrap_err();
        assert!(matches!(err, Error::Platform { .. }));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Subscriptions & Observers
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let platform = SimulatedPlatform::new();
        let request = LocationRequest::new(Accuracy::LowPower, 2000);

        let handle = platform.subscribe(&request);
        assert_eq!(platform.open_subscriptions(), 1);
        assert_eq!(platform.active_request(), Some(request));

        platform.unsubscribe(handle);
        assert_eq!(platform.open_subscriptions(), 0);

        // Closing twice is a no-op
        platform.unsubscribe(handle);
        assert_eq!(platform.open_subscriptions(), 0);
        assert_eq!(platform.subscribe_count(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let platform = SimulatedPlatform::new();
        let clone = platform.clone();
        clone.subscribe(&LocationRequest::new(Accuracy::HighAccuracy, 1000));
        assert_eq!(platform.open_subscriptions(), 1);
    }

    #[test]
    fn test_observer_registration() {
        let platform = SimulatedPlatform::new();
        let id = platform.add_observer();
        assert_eq!(platform.observer_count(), 1);

        platform.remove_observer(id);
        platform.remove_observer(id);
        assert_eq!(platform.observer_count(), 0);
    }
}
