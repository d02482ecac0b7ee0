//! locwatch Library
//!
//! Headless driver for the locwatch tracking controller.

pub mod headless;

// Re-export main entry points
pub use headless::runner::{run_headless, Driver};
