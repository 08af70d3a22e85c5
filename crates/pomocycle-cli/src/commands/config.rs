use clap::Subcommand;
use pomocycle_core::storage::{self, SETTABLE_KEYS};
use pomocycle_core::{Config, ConfigError, ConfigStore, TomlStore};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "work_minutes")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value, a positive whole number of minutes
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub async fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = TomlStore::open_default()?;
    match action {
        ConfigAction::Get { key } => {
            let config = storage::load_or_default(&store).await;
            let value = config
                .get(&key)
                .ok_or_else(|| ConfigError::UnknownKey(key.clone()))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = storage::load_or_default(&store).await;
            if let Err(e) = config.set(&key, &value) {
                if matches!(e, ConfigError::UnknownKey(_)) {
                    eprintln!("settable keys: {}", SETTABLE_KEYS.join(", "));
                }
                return Err(e.into());
            }
            store.save(&config).await?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = storage::load_or_default(&store).await;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            store.save(&Config::default()).await?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
