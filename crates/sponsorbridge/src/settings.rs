//! Application settings persisted across runs.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sponsorbridge_client::DEFAULT_API_URL;

/// Settings stored in `<config>/sponsorbridge/settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Backend base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppSettings {
    /// Picks the backend URL: explicit override, then settings, then default.
    #[must_use]
    pub fn resolve_api_url(&self, override_url: Option<&str>) -> String {
        override_url
            .or(self.api_url.as_deref())
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }
}

/// Directory for settings and session files.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sponsorbridge")
}

/// Loads settings from `dir`, falling back to defaults when absent.
pub async fn load_settings(dir: &Path) -> anyhow::Result<AppSettings> {
    let settings_path = dir.join("settings.json");

    if !settings_path.exists() {
        return Ok(AppSettings::default());
    }

    let contents = tokio::fs::read_to_string(&settings_path)
        .await
        .with_context(|| format!("reading {}", settings_path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", settings_path.display()))
}

/// Saves settings into `dir`.
pub async fn save_settings(dir: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let settings_path = dir.join("settings.json");
    let contents = serde_json::to_string_pretty(settings)?;

    tokio::fs::write(&settings_path, contents)
        .await
        .with_context(|| format!("writing {}", settings_path.display()))?;

    tracing::info!("Settings saved to {:?}", settings_path);
    Ok(())
}
