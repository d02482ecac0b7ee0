//! Settings file parsing for locwatch
//!
//! Supports:
//! - `.locwatch/config.toml` - Policy overrides for the tracking controller

pub mod settings;
pub mod types;

pub use settings::{init_config_dir, load_settings, save_settings};
pub use types::*;
