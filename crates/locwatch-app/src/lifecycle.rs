//! Lifecycle adapter
//!
//! Translates host lifecycle notifications into controller operations. The
//! host drives a [`LifecycleObserver`] by dispatching [`LifecycleEvent`]s in
//! the order they occur.

use std::fmt;
use std::str::FromStr;

use locwatch_core::prelude::*;

use crate::controller::TrackingController;

/// Receiver of host lifecycle notifications
pub trait LifecycleObserver {
    /// Host became visible and interactive
    fn on_resume(&mut self);

    /// Host left the foreground
    fn on_pause(&mut self);

    /// Host is being torn down; no further events follow
    fn on_destroy(&mut self);
}

impl LifecycleObserver for TrackingController {
    fn on_resume(&mut self) {
        self.on_lifecycle_resume();
    }

    fn on_pause(&mut self) {
        self.on_lifecycle_leave();
    }

    fn on_destroy(&mut self) {
        self.on_lifecycle_destroy();
    }
}

/// A single host lifecycle notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Resume,
    Pause,
    Destroy,
}

impl LifecycleEvent {
    /// Deliver this event to `observer`
    pub fn dispatch<O: LifecycleObserver + ?Sized>(self, observer: &mut O) {
        trace!("Dispatching lifecycle event {}", self);
        match self {
            LifecycleEvent::Resume => observer.on_resume(),
            LifecycleEvent::Pause => observer.on_pause(),
            LifecycleEvent::Destroy => observer.on_destroy(),
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Resume => write!(f, "resume"),
            LifecycleEvent::Pause => write!(f, "pause"),
            LifecycleEvent::Destroy => write!(f, "destroy"),
        }
    }
}

impl FromStr for LifecycleEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resume" => Ok(LifecycleEvent::Resume),
            "pause" | "leave" => Ok(LifecycleEvent::Pause),
            "destroy" => Ok(LifecycleEvent::Destroy),
            other => Err(Error::config(format!("unknown lifecycle event: {}", other))),
        }
    }
}
