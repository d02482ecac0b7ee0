//! # locwatch-platform - Platform Collaborator Boundary
//!
//! The tracking controller never talks to an OS directly. It depends on the
//! three traits defined here, one per platform service, and the host wires in
//! whatever implementation its platform provides.
//!
//! Depends on [`locwatch_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Collaborator Traits
//! - [`PermissionSource`] - Check, request, and explain a runtime permission
//! - [`LocationSource`] - Open and close location-update subscriptions
//! - [`LifecycleSource`] - Register the single lifecycle observer of a component
//!
//! ### Simulation
//! - [`SimulatedPlatform`] - In-process implementation of all three traits,
//!   used by the headless driver and by tests
//! - [`UserResponse`], [`PermissionResult`] - Drive the simulated permission dialog

pub mod lifecycle;
pub mod location;
pub mod permission;
pub mod simulator;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use lifecycle::LifecycleSource;
pub use location::LocationSource;
pub use permission::{PermissionResult, PermissionSource};
pub use simulator::{SimulatedPlatform, UserResponse};
