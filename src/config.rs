use crate::playback::session::{DEFAULT_VOLUME, MAX_VOLUME};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEFAULT_VOLUME_VAR: &str = "TAMAUREUS_DEFAULT_VOLUME";
const POLL_INTERVAL_VAR: &str = "TAMAUREUS_POLL_INTERVAL_MS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Player configuration
/// In debug builds: also loads a .env file before reading the environment
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    /// Initial volume level, 0-100
    pub default_volume: u8,
    /// Run the polling fallback at this interval; `None` relies on pushed
    /// position reports only
    pub position_poll_interval: Option<Duration>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: DEFAULT_VOLUME,
            position_poll_interval: None,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from the environment. Invalid values are logged and
    /// replaced by defaults.
    pub fn load() -> Self {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                tracing::info!("Config: Dev mode activated - loaded .env file");
            }
        }

        let mut config = Self::default();
        for key in [DEFAULT_VOLUME_VAR, POLL_INTERVAL_VAR] {
            if let Ok(value) = std::env::var(key) {
                if let Err(e) = config.apply(key, &value) {
                    warn!("Config: {}, using default", e);
                }
            }
        }
        config
    }

    /// Load configuration from a specific env file
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for item in dotenvy::from_path_iter(path)? {
            let (key, value) = item?;
            config.apply(&key, &value)?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            DEFAULT_VOLUME_VAR => {
                let level: u8 = value.trim().parse().map_err(|_| invalid())?;
                if level > MAX_VOLUME {
                    return Err(invalid());
                }
                self.default_volume = level;
            }
            POLL_INTERVAL_VAR => {
                let millis: u64 = value.trim().parse().map_err(|_| invalid())?;
                self.position_poll_interval = (millis > 0).then(|| Duration::from_millis(millis));
            }
            // Unrelated entries in a shared .env
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_env_file() {
        let file = env_file(
            "TAMAUREUS_DEFAULT_VOLUME=40\nTAMAUREUS_POLL_INTERVAL_MS=250\nOTHER_APP_KEY=x\n",
        );

        let config = PlayerConfig::from_env_file(file.path()).unwrap();

        assert_eq!(config.default_volume, 40);
        assert_eq!(
            config.position_poll_interval,
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_zero_interval_disables_polling() {
        let file = env_file("TAMAUREUS_POLL_INTERVAL_MS=0\n");

        let config = PlayerConfig::from_env_file(file.path()).unwrap();

        assert_eq!(config.position_poll_interval, None);
        assert_eq!(config.default_volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_invalid_volume_rejected() {
        let file = env_file("TAMAUREUS_DEFAULT_VOLUME=140\n");

        let err = PlayerConfig::from_env_file(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == DEFAULT_VOLUME_VAR));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = PlayerConfig::from_env_file(&dir.path().join("missing.env"));
        assert!(matches!(result, Err(ConfigError::EnvFile(_))));
    }
}
