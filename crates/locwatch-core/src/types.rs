//! Domain types for the permission/tracking state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permission requested when the caller does not override it
pub const DEFAULT_PERMISSION: &str = "android.permission.ACCESS_FINE_LOCATION";

/// Update interval used when the caller does not override it
pub const DEFAULT_INTERVAL_MS: u32 = 1000;

// ─────────────────────────────────────────────────────────────────────────────
// Location
// ─────────────────────────────────────────────────────────────────────────────

/// Priority requested from the platform's location service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    #[default]
    HighAccuracy,
    BalancedPower,
    LowPower,
    NoPower,
}

impl Accuracy {
    /// Platform priority code for this accuracy level
    pub fn priority(&self) -> i32 {
        match self {
            Accuracy::HighAccuracy => 100,
            Accuracy::BalancedPower => 102,
            Accuracy::LowPower => 104,
            Accuracy::NoPower => 105,
        }
    }
}

impl std::fmt::Display for Accuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Accuracy::HighAccuracy => write!(f, "high_accuracy"),
            Accuracy::BalancedPower => write!(f, "balanced_power"),
            Accuracy::LowPower => write!(f, "low_power"),
            Accuracy::NoPower => write!(f, "no_power"),
        }
    }
}

/// A single fix delivered by the location stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy radius in meters, when the platform reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f32>,
    pub timestamp: DateTime<Utc>,
}

impl Location {
    /// Create a fix stamped with the current time
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f32) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }
}

/// Parameters passed to the platform when opening a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRequest {
    pub accuracy: Accuracy,
    pub interval_ms: u32,
    /// Fastest rate the caller will accept; always half of `interval_ms`
    pub fastest_interval_ms: u32,
}

impl LocationRequest {
    pub fn new(accuracy: Accuracy, interval_ms: u32) -> Self {
        Self {
            accuracy,
            interval_ms,
            fastest_interval_ms: interval_ms / 2,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permissions
// ─────────────────────────────────────────────────────────────────────────────

/// Answer to a permission check, or one flag of a permission result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Tag correlating a permission request with its later result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestCode(pub u32);

impl RequestCode {
    /// The single request code used for the tracking permission
    pub const TRACKING: RequestCode = RequestCode(0x70CA);
}

impl std::fmt::Display for RequestCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// Classification of a refused permission request
///
/// Exactly one outcome is produced per denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialOutcome {
    /// First rationale-showable denial in the controller's lifetime
    FirstTime,
    /// Any later rationale-showable denial
    Again,
    /// The platform will not show the prompt again
    Forever,
}

impl std::fmt::Display for DenialOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialOutcome::FirstTime => write!(f, "first_time"),
            DenialOutcome::Again => write!(f, "again"),
            DenialOutcome::Forever => write!(f, "forever"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handles
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque handle to an open location subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Registration token returned by a lifecycle source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle & Tracking State
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle phase of the host UI component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    #[default]
    Created,
    Resumed,
    Paused,
    Destroyed,
}

/// Observable state of a tracking controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    /// No tracking intent
    #[default]
    Idle,
    /// Intent set, waiting for the platform's permission result
    RequestingPermission,
    /// Intent set and a subscription is open
    Tracking,
    /// Intent set but no subscription, because the host is paused
    Suspended,
}

impl std::fmt::Display for TrackingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingState::Idle => write!(f, "idle"),
            TrackingState::RequestingPermission => write!(f, "requesting_permission"),
            TrackingState::Tracking => write!(f, "tracking"),
            TrackingState::Suspended => write!(f, "suspended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_request_fastest_is_half_interval() {
        let request = LocationRequest::new(Accuracy::BalancedPower, 1000);
        assert_eq!(request.fastest_interval_ms, 500);

        let request = LocationRequest::new(Accuracy::HighAccuracy, 1);
        assert_eq!(request.fastest_interval_ms, 0);
    }

    #[test]
    fn test_accuracy_priority_codes() {
        assert_eq!(Accuracy::HighAccuracy.priority(), 100);
        assert_eq!(Accuracy::BalancedPower.priority(), 102);
        assert_eq!(Accuracy::LowPower.priority(), 104);
        assert_eq!(Accuracy::NoPower.priority(), 105);
    }

    #[test]
    fn test_accuracy_default_is_high() {
        assert_eq!(Accuracy::default(), Accuracy::HighAccuracy);
    }

    #[test]
    fn test_request_code_display() {
        assert_eq!(RequestCode::TRACKING.to_string(), "0x70ca");
    }

    #[test]
    fn test_permission_status_is_granted() {
        assert!(PermissionStatus::Granted.is_granted());
        assert!(!PermissionStatus::Denied.is_granted());
    }

    #[test]
    fn test_location_serializes_without_missing_accuracy() {
        let loc = Location::new(37.42, -122.08);
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["latitude"], 37.42);
        assert!(json.get("accuracy_m").is_none());

        let json = serde_json::to_value(loc.with_accuracy(4.5)).unwrap();
        assert_eq!(json["accuracy_m"], 4.5);
    }

    #[test]
    fn test_tracking_state_display_matches_serde() {
        for state in [
            TrackingState::Idle,
            TrackingState::RequestingPermission,
            TrackingState::Tracking,
            TrackingState::Suspended,
        ] {
            let json = serde_json::to_value(state).unwrap();
            assert_eq!(json, state.to_string());
        }
    }
}
