//! locwatch-app - Tracking controller and its configuration
//!
//! This crate implements the permission/tracking state machine
//! ([`TrackingController`]), the validated configuration it is built from
//! ([`TrackerConfig`]), the lifecycle adapter that feeds it host events, and
//! settings-file loading for the configuration's policy overrides.

pub mod config;
pub mod controller;
pub mod lifecycle;
pub mod tracker_config;

// Re-export primary types
pub use controller::TrackingController;
pub use lifecycle::{LifecycleEvent, LifecycleObserver};
pub use tracker_config::{ConfigParts, DenialHook, LocationObserver, TrackerConfig};
