//! Configuration module
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "NEXUS_SETTINGS_PATH";

/// Load settings from the first file found, or fall back to defaults.
///
/// Lookup order: `$NEXUS_SETTINGS_PATH`, `settings.yml`,
/// `config/settings.yml`, then `<config dir>/nexus-search/settings.yml`.
/// Environment overrides are applied in every case.
pub fn load() -> Result<Settings> {
    let explicit = std::env::var(SETTINGS_PATH_VAR).ok().map(PathBuf::from);

    let candidates = explicit.into_iter().chain([
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        dirs::config_dir()
            .map(|p| p.join("nexus-search/settings.yml"))
            .unwrap_or_default(),
    ]);

    for path in candidates {
        if path.as_os_str().is_empty() || !path.exists() {
            continue;
        }
        info!("Loading settings from: {}", path.display());
        let mut settings = Settings::from_file(&path)?;
        settings.merge_env();
        return Ok(settings);
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}
