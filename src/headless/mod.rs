//! Headless mode - NDJSON event output for scripted sessions
//!
//! The driver reads one command per stdin line, forwards it to a
//! [`TrackingController`](locwatch_app::TrackingController) wired to a
//! simulated platform, and reports what happened as structured JSON events
//! on stdout.
//!
//! # Event Format
//!
//! Events are output as NDJSON (newline-delimited JSON), one event per line.
//! Each event has an "event" field indicating its type, along with event-specific data.
//!
//! # Example Output
//!
//! ```json
//! {"event":"state","state":"idle","tracking":false,"phase":"resumed","timestamp":1704700001000}
//! {"event":"permission_requested","permission":"android.permission.ACCESS_FINE_LOCATION","request_code":"0x70ca","timestamp":1704700002000}
//! {"event":"permission_denied","outcome":"first_time","timestamp":1704700003000}
//! ```

pub mod command;
pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use locwatch_core::{DenialOutcome, LifecyclePhase, Location, RequestCode, TrackingState};

/// Events emitted in headless mode
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Controller state after a command
    State {
        state: TrackingState,
        tracking: bool,
        phase: LifecyclePhase,
        timestamp: i64,
    },

    /// Fix delivered to the location observer
    Location {
        latitude: f64,
        longitude: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        accuracy_m: Option<f32>,
        timestamp: i64,
    },

    /// The controller asked the platform for the tracking permission
    PermissionRequested {
        permission: String,
        request_code: String,
        timestamp: i64,
    },

    /// A denial hook fired
    PermissionDenied {
        outcome: DenialOutcome,
        timestamp: i64,
    },

    /// The app settings screen was opened
    SettingsOpened {
        application_id: String,
        timestamp: i64,
    },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // Write to stdout with newline (NDJSON format)
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn state(state: TrackingState, tracking: bool, phase: LifecyclePhase) -> Self {
        Self::State {
            state,
            tracking,
            phase,
            timestamp: Self::now(),
        }
    }

    /// Stamped with the fix's own time, not the emission time
    pub fn location(location: &Location) -> Self {
        Self::Location {
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy_m: location.accuracy_m,
            timestamp: location.timestamp.timestamp_millis(),
        }
    }

    pub fn permission_requested(permission: &str, request_code: RequestCode) -> Self {
        Self::PermissionRequested {
            permission: permission.to_string(),
            request_code: request_code.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn permission_denied(outcome: DenialOutcome) -> Self {
        Self::PermissionDenied {
            outcome,
            timestamp: Self::now(),
        }
    }

    pub fn settings_opened(application_id: &str) -> Self {
        Self::SettingsOpened {
            application_id: application_id.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }
}
