//! Settings parser for .locwatch/config.toml

use std::path::Path;

use locwatch_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";
const LOCWATCH_DIR: &str = ".locwatch";

/// Load settings from .locwatch/config.toml
///
/// Returns default settings if file doesn't exist or can't be parsed.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = project_path.join(LOCWATCH_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create the default config file in the .locwatch/ directory
///
/// An existing file is left untouched.
pub fn init_config_dir(project_path: &Path) -> Result<()> {
    let locwatch_dir = project_path.join(LOCWATCH_DIR);

    if !locwatch_dir.exists() {
        std::fs::create_dir_all(&locwatch_dir)
            .map_err(|e| Error::config(format!("Failed to create .locwatch dir: {}", e)))?;
    }

    let config_path = locwatch_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# locwatch Configuration
#
# Values set here apply only where the embedding code leaves them unset.

[tracking]
permission = "android.permission.ACCESS_FINE_LOCATION"
# high_accuracy | balanced_power | low_power | no_power
accuracy = "high_accuracy"
interval_ms = 1000      # Fastest accepted interval is half of this

[app]
application_id = "com.example.locwatch"   # Used by the settings shortcut
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
        info!("Created {:?}", config_path);
    }

    Ok(())
}

/// Save settings to .locwatch/config.toml
///
/// Uses atomic write (temp file + rename).
pub fn save_settings(project_path: &Path, settings: &Settings) -> Result<()> {
    let locwatch_dir = project_path.join(LOCWATCH_DIR);

    if !locwatch_dir.exists() {
        std::fs::create_dir_all(&locwatch_dir)
            .map_err(|e| Error::config(format!("Failed to create .locwatch dir: {}", e)))?;
    }

    let config_path = locwatch_dir.join(CONFIG_FILENAME);
    let temp_path = locwatch_dir.join(".config.toml.tmp");

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;
    let full_content = format!("# locwatch Configuration\n\n{}", content);

    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::config(format!("Failed to write temp file: {}", e)))?;

    std::fs::rename(&temp_path, &config_path)
        .map_err(|e| Error::config(format!("Failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", config_path);
    Ok(())
}
