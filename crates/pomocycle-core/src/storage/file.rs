use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{data_dir, Config, ConfigStore};
use crate::error::ConfigError;

/// [`ConfigStore`] backed by a TOML file.
#[derive(Debug, Clone)]
pub struct TomlStore {
    path: PathBuf,
}

impl TomlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::new(data_dir()?.join("config.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for TomlStore {
    async fn load(&self) -> Result<Option<Config>, ConfigError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Config::from_toml(&content).map(Some).map_err(|e| {
                ConfigError::LoadFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                }
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }

    async fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let content = config.to_toml()?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::SaveFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }
}
