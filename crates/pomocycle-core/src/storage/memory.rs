use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::{Config, ConfigStore};
use crate::error::ConfigError;

#[derive(Debug, Default)]
struct Inner {
    record: Mutex<Option<Config>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

/// In-memory [`ConfigStore`]. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        let store = Self::new();
        *store.lock() = Some(config);
        store
    }

    /// Make every subsequent save fail.
    pub fn fail_saves(&self, fail: bool) {
        self.inner.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Last successfully saved record.
    pub fn snapshot(&self) -> Option<Config> {
        self.lock().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Config>> {
        self.inner
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load(&self) -> Result<Option<Config>, ConfigError> {
        Ok(self.lock().clone())
    }

    async fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if self.inner.fail_saves.load(Ordering::SeqCst) {
            return Err(ConfigError::SaveFailed {
                path: "<memory>".into(),
                message: "save disabled".to_string(),
            });
        }
        *self.lock() = Some(config.clone());
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
