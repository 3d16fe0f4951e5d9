//! Utility functions for the analyzer app
//!
//! Settings location and loading, plus small helpers for the form.

use anyhow::{Context, Result};
use shared::settings::ClientSettings;
use std::fs;
use std::path::{Path, PathBuf};

pub fn config_path() -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("com.local", "CIFR", "CifrAnalyzer")?;
    Some(proj.config_dir().join("settings.json"))
}

pub fn read_settings(path: &Path) -> Result<ClientSettings> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

pub fn save_settings(path: &Path, settings: &ClientSettings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

/// Change what is stored on disk without picking up `CIFR_*` overrides.
pub fn update_settings_file(path: &Path, change: impl FnOnce(&mut ClientSettings)) -> Result<()> {
    let mut stored = load_settings_file(Some(path));
    change(&mut stored);
    save_settings(path, &stored)
}

/// Settings from `path` when it exists and parses, defaults otherwise.
pub fn load_settings_file(path: Option<&Path>) -> ClientSettings {
    match path {
        Some(path) if path.exists() => read_settings(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default settings");
            ClientSettings::default()
        }),
        _ => ClientSettings::default(),
    }
}

/// Settings file first, then `CIFR_*` environment overrides.
pub fn load_settings_or_default() -> ClientSettings {
    let path = config_path();
    let mut settings = load_settings_file(path.as_deref());
    settings.apply_env_overrides();
    settings
}

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
