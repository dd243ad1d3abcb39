//! Runtime configuration from the environment (and an optional `.env`).
//!
//! Data lives in the platform data directory unless overridden:
//!   macOS:   ~/Library/Application Support/techrisk-ai/
//!   Linux:   ~/.local/share/techrisk-ai/
//!   Windows: %APPDATA%/techrisk-ai/

use std::path::PathBuf;
use std::time::Duration;

pub const DATA_DIR_VAR: &str = "TECHRISK_DATA_DIR";
pub const PROMO_CODES_VAR: &str = "TECHRISK_PROMO_CODES";
pub const TRIAL_HOURS_VAR: &str = "TECHRISK_TRIAL_HOURS";

const DEFAULT_TRIAL_HOURS: u64 = 12;
/// Ten years.
pub const MAX_TRIAL_HOURS: u64 = 24 * 365 * 10;
const STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub promo_codes: Vec<String>,
    pub trial_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            promo_codes: Vec::new(),
            trial_hours: DEFAULT_TRIAL_HOURS,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("[CONFIG] Loaded {}", path.display());
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }

        if let Some(codes) = lookup(PROMO_CODES_VAR) {
            config.promo_codes = parse_codes(&codes);
        }

        if let Some(raw) = lookup(TRIAL_HOURS_VAR) {
            config.trial_hours = match raw.trim().parse::<u64>() {
                Ok(hours) if hours > MAX_TRIAL_HOURS => {
                    return Err(ConfigError::InvalidValue {
                        var: TRIAL_HOURS_VAR,
                        value: raw,
                        reason: "trial cannot exceed 87600 hours",
                    })
                }
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: TRIAL_HOURS_VAR,
                        value: raw,
                        reason: "expected a positive whole number of hours",
                    })
                }
            };
        }

        log::debug!(
            "[CONFIG] data_dir={} promo_codes={} trial_hours={}",
            config.data_dir.display(),
            config.promo_codes.len(),
            config.trial_hours
        );
        Ok(config)
    }

    /// File backing the encrypted key-value store.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }

    pub fn trial_duration(&self) -> Duration {
        Duration::from_secs(self.trial_hours.saturating_mul(60 * 60))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("techrisk-ai")
}

fn parse_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}
