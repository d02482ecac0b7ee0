//! Validated, immutable tracker configuration
//!
//! A [`TrackerConfig`] is produced once from [`ConfigParts`] before the
//! controller is built. Validation checks the required collaborators and
//! hooks in a fixed order and names the first one that is missing.

use std::fmt;
use std::rc::Rc;

use locwatch_core::prelude::*;
use locwatch_core::{
    Accuracy, DenialOutcome, Location, LocationRequest, DEFAULT_INTERVAL_MS, DEFAULT_PERMISSION,
};
use locwatch_platform::LifecycleSource;

/// Reaction to one denial outcome
pub type DenialHook = Box<dyn Fn()>;

/// Receives every location delivered while tracking is active
pub trait LocationObserver {
    fn on_location(&self, location: &Location);
}

impl<F> LocationObserver for F
where
    F: Fn(&Location),
{
    fn on_location(&self, location: &Location) {
        self(location)
    }
}

/// Unvalidated configuration fields
///
/// Policy fields left as `None` take their defaults; the lifecycle source
/// and the four hooks are required.
///
/// ```ignore
/// let config = TrackerConfig::new(ConfigParts {
///     lifecycle: Some(Rc::new(platform.clone())),
///     on_location: Some(Box::new(|loc: &Location| println!("{loc:?}"))),
///     on_permission_denied_first_time: Some(Box::new(|| {})),
///     on_permission_denied_again: Some(Box::new(|| {})),
///     on_permission_denied_forever: Some(Box::new(|| {})),
///     ..Default::default()
/// })?;
/// ```
#[derive(Default)]
pub struct ConfigParts {
    pub lifecycle: Option<Rc<dyn LifecycleSource>>,
    pub permission: Option<String>,
    pub accuracy: Option<Accuracy>,
    pub interval_ms: Option<u32>,
    pub on_location: Option<Box<dyn LocationObserver>>,
    pub on_permission_denied_first_time: Option<DenialHook>,
    pub on_permission_denied_again: Option<DenialHook>,
    pub on_permission_denied_forever: Option<DenialHook>,
}

/// Immutable policy and hooks for one tracking controller
pub struct TrackerConfig {
    lifecycle: Rc<dyn LifecycleSource>,
    permission: String,
    accuracy: Accuracy,
    interval_ms: u32,
    on_location: Box<dyn LocationObserver>,
    on_permission_denied_first_time: DenialHook,
    on_permission_denied_again: DenialHook,
    on_permission_denied_forever: DenialHook,
}

impl TrackerConfig {
    /// Validate `parts` into a configuration
    ///
    /// Fails with [`Error::ConfigurationIncomplete`] naming the first absent
    /// required field, or [`Error::ConfigInvalid`] for a zero interval or an
    /// empty permission identifier.
    pub fn new(parts: ConfigParts) -> Result<Self> {
        let ConfigParts {
            lifecycle,
            permission,
            accuracy,
            interval_ms,
            on_location,
            on_permission_denied_first_time,
            on_permission_denied_again,
            on_permission_denied_forever,
        } = parts;

        let lifecycle = lifecycle.ok_or_else(|| Error::incomplete("lifecycle"))?;
        let on_location = on_location.ok_or_else(|| Error::incomplete("on_location"))?;
        let on_permission_denied_first_time = on_permission_denied_first_time
            .ok_or_else(|| Error::incomplete("on_permission_denied_first_time"))?;
        let on_permission_denied_again = on_permission_denied_again
            .ok_or_else(|| Error::incomplete("on_permission_denied_again"))?;
        let on_permission_denied_forever = on_permission_denied_forever
            .ok_or_else(|| Error::incomplete("on_permission_denied_forever"))?;

        let permission = permission.unwrap_or_else(|| DEFAULT_PERMISSION.to_string());
        if permission.trim().is_empty() {
            return Err(Error::config_invalid("permission must not be empty"));
        }

        let interval_ms = interval_ms.unwrap_or(DEFAULT_INTERVAL_MS);
        if interval_ms == 0 {
            return Err(Error::config_invalid("interval_ms must be positive"));
        }

        Ok(Self {
            lifecycle,
            permission,
            accuracy: accuracy.unwrap_or_default(),
            interval_ms,
            on_location,
            on_permission_denied_first_time,
            on_permission_denied_again,
            on_permission_denied_forever,
        })
    }

    pub fn permission(&self) -> &str {
        &self.permission
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn fastest_interval_ms(&self) -> u32 {
        self.location_request().fastest_interval_ms
    }

    /// Subscription parameters derived from this configuration
    pub fn location_request(&self) -> LocationRequest {
        LocationRequest::new(self.accuracy, self.interval_ms)
    }

    pub fn lifecycle(&self) -> &Rc<dyn LifecycleSource> {
        &self.lifecycle
    }

    pub(crate) fn notify_location(&self, location: &Location) {
        self.on_location.on_location(location);
    }

    /// Invoke exactly the hook matching `outcome`
    pub(crate) fn notify_denied(&self, outcome: DenialOutcome) {
        match outcome {
            DenialOutcome::FirstTime => (self.on_permission_denied_first_time)(),
            DenialOutcome::Again => (self.on_permission_denied_again)(),
            DenialOutcome::Forever => (self.on_permission_denied_forever)(),
        }
    }
}

impl TryFrom<ConfigParts> for TrackerConfig {
    type Error = Error;

    fn try_from(parts: ConfigParts) -> Result<Self> {
        Self::new(parts)
    }
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("permission", &self.permission)
            .field("accuracy", &self.accuracy)
            .field("interval_ms", &self.interval_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locwatch_platform::test_utils::{HookCounter, LocationRecorder};
    use locwatch_platform::SimulatedPlatform;

    fn complete_parts() -> ConfigParts {
        ConfigParts {
            lifecycle: Some(Rc::new(SimulatedPlatform::new())),
            on_location: Some(Box::new(|_: &Location| {})),
            on_permission_denied_first_time: Some(Box::new(|| {})),
            on_permission_denied_again: Some(Box::new(|| {})),
            on_permission_denied_forever: Some(Box::new(|| {})),
            ..Default::default()
        }
    }

    fn missing_field(parts: ConfigParts) -> &'static str {
        match TrackerConfig::new(parts) {
            Err(Error::ConfigurationIncomplete { field }) => field,
            other => panic!("expected ConfigurationIncomplete, got {:?}", other),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Defaults
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_defaults_applied() {
        let config = TrackerConfig::new(complete_parts()).unwrap();
        assert_eq!(config.permission(), DEFAULT_PERMISSION);
        assert_eq!(config.accuracy(), Accuracy::HighAccuracy);
        assert_eq!(config.interval_ms(), 1000);
        assert_eq!(config.fastest_interval_ms(), 500);
    }

    #[test]
    fn test_overrides_applied() {
        let config = TrackerConfig::new(ConfigParts {
            permission: Some("android.permission.ACCESS_COARSE_LOCATION".to_string()),
            accuracy: Some(Accuracy::LowPower),
            interval_ms: Some(5000),
            ..complete_parts()
        })
        .unwrap();

        assert_eq!(
            config.permission(),
            "android.permission.ACCESS_COARSE_LOCATION"
        );
        assert_eq!(
            config.location_request(),
            LocationRequest {
                accuracy: Accuracy::LowPower,
                interval_ms: 5000,
                fastest_interval_ms: 2500,
            }
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_parts_names_lifecycle_first() {
        assert_eq!(missing_field(ConfigParts::default()), "lifecycle");
    }

    #[test]
    fn test_each_required_field_is_reported() {
        let parts = ConfigParts {
            on_location: None,
            ..complete_parts()
        };
        assert_eq!(missing_field(parts), "on_location");

        let parts = ConfigParts {
            on_permission_denied_first_time: None,
            ..complete_parts()
        };
        assert_eq!(missing_field(parts), "on_permission_denied_first_time");

        let parts = ConfigParts {
            on_permission_denied_again: None,
            ..complete_parts()
        };
        assert_eq!(missing_field(parts), "on_permission_denied_again");

        let parts = ConfigParts {
            on_permission_denied_forever: None,
            ..complete_parts()
        };
        assert_eq!(missing_field(parts), "on_permission_denied_forever");
    }

    #[test]
    fn test_first_missing_field_wins() {
        let parts = ConfigParts {
            on_location: None,
            on_permission_denied_forever: None,
            ..complete_parts()
        };
        assert_eq!(missing_field(parts), "on_location");
    }

    #[test]
    fn test_incomplete_is_fatal() {
        let err = TrackerConfig::try_from(ConfigParts::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = TrackerConfig::new(ConfigParts {
            interval_ms: Some(0),
            ..complete_parts()
        })
        .unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_empty_permission_rejected() {
        let err = TrackerConfig::new(ConfigParts {
            permission: Some(" ".to_string()),
            ..complete_parts()
        })
        .unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Hooks
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_notify_denied_invokes_only_matching_hook() {
        let first = HookCounter::new();
        let again = HookCounter::new();
        let forever = HookCounter::new();
        let config = TrackerConfig::new(ConfigParts {
            on_permission_denied_first_time: Some(Box::new(first.hook())),
            on_permission_denied_again: Some(Box::new(again.hook())),
            on_permission_denied_forever: Some(Box::new(forever.hook())),
            ..complete_parts()
        })
        .unwrap();

        config.notify_denied(DenialOutcome::Again);
        assert_eq!(
            (first.count(), again.count(), forever.count()),
            (0, 1, 0)
        );

        config.notify_denied(DenialOutcome::Forever);
        assert_eq!(
            (first.count(), again.count(), forever.count()),
            (0, 1, 1)
        );
    }

    #[test]
    fn test_notify_location_reaches_observer() {
        let recorder = LocationRecorder::new();
        let config = TrackerConfig::new(ConfigParts {
            on_location: Some(Box::new(recorder.observer())),
            ..complete_parts()
        })
        .unwrap();

        config.notify_location(&Location::new(1.0, 2.0));
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_debug_omits_hooks() {
        let config = TrackerConfig::new(complete_parts()).unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("interval_ms: 1000"));
        assert!(!debug.contains("on_location"));
    }
}
