mod config;
mod file;
mod memory;

pub use config::{parse_minutes, Config, SETTABLE_KEYS};
pub use file::TomlStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::ConfigError;

/// Persistence collaborator for [`Config`].
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the persisted record. `Ok(None)` means nothing was saved yet.
    async fn load(&self) -> Result<Option<Config>, ConfigError>;

    async fn save(&self, config: &Config) -> Result<(), ConfigError>;
}

/// Load through `store`, falling back to defaults on any failure.
pub async fn load_or_default(store: &dyn ConfigStore) -> Config {
    match store.load().await {
        Ok(Some(cfg)) => cfg,
        Ok(None) => {
            tracing::debug!("no persisted config, using defaults");
            Config::default()
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Config::default()
        }
    }
}

/// Returns the data directory.
///
/// `POMOCYCLE_CONFIG_DIR` wins when set. Otherwise `~/.config/pomocycle[-dev]/`
/// based on POMOCYCLE_ENV (set it to `dev` for the development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("POMOCYCLE_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMOCYCLE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomocycle-dev")
            } else {
                base_dir.join("pomocycle")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
