use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
}

/// Which `MemeRepository` backend the server runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => Err(format!("expected 'memory' or 'sqlite', got '{}'", other)),
        }
    }
}

#[derive(Clone, Debug)] // Clone needed if passed around, Debug for logging
pub struct Config {
    pub bind_address: SocketAddr,
    pub store: StoreKind,
    // sqlx connection URL, only used by the sqlite store
    pub database_url: String,
    pub static_dir: PathBuf,
    pub seed_sample_memes: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = SocketAddr::from_str(&bind_address_str)
            .map_err(|e| ConfigError::InvalidVar("BIND_ADDRESS".into(), e.to_string()))?;

        let store = lookup("MEME_STORE")
            .map(|value| StoreKind::from_str(&value))
            .transpose()
            .map_err(|e| ConfigError::InvalidVar("MEME_STORE".into(), e))?
            .unwrap_or(StoreKind::Sqlite);

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:memes.db".to_string());

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static"));

        let seed_sample_memes = lookup("SEED_SAMPLE_MEMES")
            .map(|value| parse_flag(&value))
            .transpose()
            .map_err(|e| ConfigError::InvalidVar("SEED_SAMPLE_MEMES".into(), e))?
            .unwrap_or(false);

        Ok(Config {
            bind_address,
            store,
            database_url,
            static_dir,
            seed_sample_memes,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.store, StoreKind::Sqlite);
        assert_eq!(config.database_url, "sqlite:memes.db");
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert!(!config.seed_sample_memes);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("MEME_STORE", "Memory"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("STATIC_DIR", "/srv/memes"),
            ("SEED_SAMPLE_MEMES", "yes"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.static_dir, PathBuf::from("/srv/memes"));
        assert!(config.seed_sample_memes);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[("MEME_STORE", "dynamodb")]).unwrap_err();
        assert!(err.to_string().contains("MEME_STORE"));

        let err = config_from(&[("BIND_ADDRESS", "not-an-address")]).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDRESS"));

        let err = config_from(&[("SEED_SAMPLE_MEMES", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("SEED_SAMPLE_MEMES"));
    }
}
