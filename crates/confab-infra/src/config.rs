//! Settings loader for Confab.
//!
//! Reads `config.toml` from the data directory (`~/.confab/` in production)
//! and deserializes it into [`Settings`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use confab_types::config::Settings;

use crate::paths::config_path;

/// Load settings from `{data_dir}/config.toml`.
///
/// - Missing file: [`Settings::default()`].
/// - Unreadable or unparsable file: a warning, then the default.
pub async fn load_settings(data_dir: &Path) -> Settings {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return Settings::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return Settings::default();
        }
    };

    match toml::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            Settings::default()
        }
    }
}

/// Write `settings` to `{data_dir}/config.toml`, creating the directory.
pub async fn save_settings(data_dir: &Path, settings: &Settings) -> Result<(), std::io::Error> {
    let content = toml::to_string_pretty(settings).map_err(std::io::Error::other)?;
    tokio::fs::create_dir_all(data_dir).await?;
    tokio::fs::write(config_path(data_dir), content).await
}
