//! # locwatch-core - Core Domain Types
//!
//! Foundation crate for locwatch. Provides the domain types shared by the
//! platform boundary and the tracking controller, error handling, and the
//! logging bootstrap.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Accuracy`] - Priority requested from the location service
//! - [`Location`] - A single delivered fix
//! - [`LocationRequest`] - Subscription parameters (interval, fastest interval)
//! - [`TrackingState`] - Idle, RequestingPermission, Tracking, Suspended
//! - [`LifecyclePhase`] - Created, Resumed, Paused, Destroyed
//! - [`DenialOutcome`] - First-time, again, forever
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use locwatch_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use types::{
    Accuracy, DenialOutcome, LifecyclePhase, Location, LocationRequest, ObserverId,
    PermissionStatus, RequestCode, SubscriptionHandle, TrackingState, DEFAULT_INTERVAL_MS,
    DEFAULT_PERMISSION,
};
