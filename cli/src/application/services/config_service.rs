//! Application service — configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::ArchsmithConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the stored file cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<ArchsmithConfig> {
    store.load()
}

/// Save configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_config(store: &impl ConfigStore, config: &ArchsmithConfig) -> Result<()> {
    store.save(config)
}

/// Validate and persist one setting. Returns the updated configuration.
///
/// # Errors
///
/// Returns a `ConfigError` for unknown keys or invalid values, or an
/// error if the file cannot be read or written.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<ArchsmithConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    tracing::info!(key, value, "setting updated");
    Ok(config)
}
