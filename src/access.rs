//! Trial / paywall gate.
//!
//! Access is granted permanently once paid, or for a fixed window after a
//! promo code starts a trial. Both flags live in the encrypted store, so a
//! hand-edited storage file reads as "no access" rather than "paid".

use crate::config::AppConfig;
use crate::storage::{KeyValueBackend, SecureStore, StorageError};
use serde::Serialize;
use std::time::Duration;

pub const PAID_KEY: &str = "techrisk_paid";
pub const TRIAL_START_KEY: &str = "techrisk_trial_start";

const HOUR_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessStatus {
    pub has_access: bool,
    pub is_trial: bool,
    pub trial_remaining_hours: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AccessStatus {
    fn denied(reason: Option<&str>) -> Self {
        Self {
            has_access: false,
            is_trial: false,
            trial_remaining_hours: 0,
            reason: reason.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub success: bool,
    pub message: String,
}

/// Decides whether a promo code unlocks a trial.
pub trait PromoValidator {
    /// `Err` carries the message shown to the user.
    fn validate(&self, code: &str) -> Result<(), Option<String>>;
}

/// Fixed list of accepted codes, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticPromoCodes {
    codes: Vec<String>,
}

impl StaticPromoCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.promo_codes)
    }
}

impl PromoValidator for StaticPromoCodes {
    fn validate(&self, code: &str) -> Result<(), Option<String>> {
        let code = code.trim().to_uppercase();
        if !code.is_empty() && self.codes.contains(&code) {
            Ok(())
        } else {
            Err(None)
        }
    }
}

pub struct AccessGate<'a, B> {
    store: &'a SecureStore<B>,
    trial: Duration,
}

impl<'a, B: KeyValueBackend> AccessGate<'a, B> {
    pub fn new(store: &'a SecureStore<B>, config: &AppConfig) -> Self {
        Self {
            store,
            trial: config.trial_duration(),
        }
    }

    fn trial_ms(&self) -> u64 {
        u64::try_from(self.trial.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn check_access(&self, now_ms: u64) -> Result<AccessStatus, StorageError> {
        if self.store.get_item::<bool>(PAID_KEY)? == Some(true) {
            return Ok(AccessStatus {
                has_access: true,
                is_trial: false,
                trial_remaining_hours: 0,
                reason: None,
            });
        }

        // Only a clean decimal counts as a trial start; anything else reads as
        // "no trial". A start in the future counts as starting now.
        let started = self
            .store
            .get_item::<String>(TRIAL_START_KEY)?
            .and_then(|raw| raw.trim().parse::<u64>().ok());
        let Some(started) = started else {
            return Ok(AccessStatus::denied(None));
        };

        let elapsed = now_ms.saturating_sub(started);
        if elapsed < self.trial_ms() {
            let remaining = self.trial_ms() - elapsed;
            Ok(AccessStatus {
                has_access: true,
                is_trial: true,
                trial_remaining_hours: remaining / HOUR_MS,
                reason: None,
            })
        } else {
            log::info!("[ACCESS] Trial expired");
            Ok(AccessStatus::denied(Some("Trial expired")))
        }
    }

    /// Start the trial window if `validator` accepts `code`.
    ///
    /// A new valid code restarts the window from `now_ms`.
    pub fn activate_trial(
        &self,
        validator: &dyn PromoValidator,
        code: &str,
        now_ms: u64,
    ) -> Result<Activation, StorageError> {
        match validator.validate(code) {
            Ok(()) => {
                self.store.set_item(TRIAL_START_KEY, &now_ms.to_string())?;
                log::info!("[ACCESS] Trial activated");
                Ok(Activation {
                    success: true,
                    message: format!("Trial activated for {} hours!", self.trial.as_secs() / 3600),
                })
            }
            Err(message) => {
                log::warn!("[ACCESS] Promo code rejected");
                Ok(Activation {
                    success: false,
                    message: message.unwrap_or_else(|| "Invalid promo code.".to_string()),
                })
            }
        }
    }

    pub fn mark_as_paid(&self) -> Result<(), StorageError> {
        self.store.set_item(PAID_KEY, &true)?;
        log::info!("[ACCESS] Marked as paid");
        Ok(())
    }
}
