//! Configuration types for locwatch
//!
//! Defines:
//! - `Settings` - Contents of `.locwatch/config.toml`
//! - `TrackingSettings` - Policy overrides for a tracker configuration
//! - `AppSettings` - Identity of the host application

use serde::{Deserialize, Serialize};

use locwatch_core::Accuracy;

use crate::tracker_config::ConfigParts;

/// Global settings from `.locwatch/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub tracking: TrackingSettings,

    #[serde(default)]
    pub app: AppSettings,
}

/// Policy overrides; absent keys leave the built-in defaults in place
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TrackingSettings {
    /// Permission identifier to request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    /// Requested accuracy level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<Accuracy>,

    /// Desired update interval in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u32>,
}

impl TrackingSettings {
    /// Fill the policy fields of `parts` that code left unset
    ///
    /// Values set in code take precedence over the settings file.
    pub fn apply(&self, mut parts: ConfigParts) -> ConfigParts {
        if let Some(permission) = &self.permission {
            parts.permission.get_or_insert_with(|| permission.clone());
        }
        if let Some(accuracy) = self.accuracy {
            parts.accuracy.get_or_insert(accuracy);
        }
        if let Some(interval_ms) = self.interval_ms {
            parts.interval_ms.get_or_insert(interval_ms);
        }
        parts
    }
}

/// Host application identity
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppSettings {
    /// Application id handed to the platform's settings screen
    #[serde(default = "default_application_id")]
    pub application_id: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            application_id: default_application_id(),
        }
    }
}

fn default_application_id() -> String {
    "com.example.locwatch".to_string()
}
