//! Test utilities for platform-driven tests
//!
//! Provides fixture locations and recorders that can stand in for the
//! caller-supplied hooks of a tracking controller.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use locwatch_core::Location;

/// A fix at the given coordinates with a fixed accuracy radius
pub fn test_location(latitude: f64, longitude: f64) -> Location {
    Location::new(latitude, longitude).with_accuracy(5.0)
}

/// A fix somewhere in Mountain View
pub fn test_location_default() -> Location {
    test_location(37.4220, -122.0841)
}

/// Counts invocations of a `Fn()` hook
#[derive(Debug, Clone, Default)]
pub struct HookCounter {
    count: Rc<Cell<usize>>,
}

impl HookCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hook that bumps this counter
    pub fn hook(&self) -> impl Fn() + 'static {
        let count = Rc::clone(&self.count);
        move || count.set(count.get() + 1)
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }
}

/// Records every location handed to an observer
#[derive(Debug, Clone, Default)]
pub struct LocationRecorder {
    received: Rc<RefCell<Vec<Location>>>,
}

impl LocationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer closure that appends to this recorder
    pub fn observer(&self) -> impl Fn(&Location) + 'static {
        let received = Rc::clone(&self.received);
        move |location: &Location| received.borrow_mut().push(location.clone())
    }

    pub fn len(&self) -> usize {
        self.received.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.borrow().is_empty()
    }

    pub fn received(&self) -> Vec<Location> {
        self.received.borrow().clone()
    }
}
