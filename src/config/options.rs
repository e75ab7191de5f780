// src/config/options.rs
//! Runtime configuration.
//!
//! Loaded from a JSON file (default `cerberus.json`). Every section has a
//! compiled-in default, so a missing file yields a working setup; a file that
//! exists but does not parse, or that breaks an invariant, is an error.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::consts::*;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub policy: PolicyConfig,
    pub fetch: FetchOptions,
    /// Role name → guild role id.
    pub roles: BTreeMap<String, u64>,
    pub messages: Messages,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            fetch: FetchOptions::default(),
            roles: BTreeMap::from([(s!(DEFAULT_ROLE), 0)]),
            messages: Messages::default(),
        }
    }
}

/// One recognized encounter: accepted title spellings + penalized mechanics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossRule {
    pub id: String,
    pub names: Vec<String>,
    pub mechanics: Vec<String>,
}

impl BossRule {
    pub fn matches(&self, boss_name: &str) -> bool {
        self.names.iter().any(|n| n == boss_name)
    }

    pub fn is_penalized(&self, mechanic: &str) -> bool {
        self.mechanics.iter().any(|m| m == mechanic)
    }

    /// First spelling is the canonical display name.
    pub fn display_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub accept_threshold: f64,
    pub reject_threshold: f64,
    pub bosses: Vec<BossRule>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            accept_threshold: DEFAULT_ACCEPT_THRESHOLD,
            reject_threshold: DEFAULT_REJECT_THRESHOLD,
            bosses: vec![
                BossRule {
                    id: s!("trinity-avowed"),
                    names: vec![s!("Trinity Avowed Savage"), s!("Trinité Féale Savage")],
                    mechanics: vec![s!("Heat Shock"), s!("Cold Shock")],
                },
                BossRule {
                    id: s!("the-queen"),
                    names: vec![s!("The Queen Savage"), s!("Garde-La-Reine Savage")],
                    mechanics: vec![s!("The Means"), s!("Queen's Justice")],
                },
            ],
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accept_threshold > self.reject_threshold {
            return Err(ConfigError::Thresholds {
                accept: self.accept_threshold,
                reject: self.reject_threshold,
            });
        }
        if self.bosses.is_empty() {
            return Err(ConfigError::NoBosses);
        }
        Ok(())
    }

    pub fn boss(&self, boss_name: &str) -> Option<&BossRule> {
        self.bosses.iter().find(|b| b.matches(boss_name))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Base URL of a running WebDriver server (geckodriver).
    pub webdriver_url: String,
    pub render_timeout_secs: f64,
    pub poll_interval_ms: u64,
    pub headless: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            webdriver_url: s!(DEFAULT_WEBDRIVER_URL),
            render_timeout_secs: RENDER_TIMEOUT_SECS,
            poll_interval_ms: POLL_INTERVAL_MS,
            headless: true,
        }
    }
}

impl FetchOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secs = self.render_timeout_secs;
        if !(0.0..=MAX_RENDER_TIMEOUT_SECS).contains(&secs) {
            return Err(ConfigError::RenderTimeout { secs, max: MAX_RENDER_TIMEOUT_SECS });
        }
        Ok(())
    }

    /// Clamped to `0..=MAX_RENDER_TIMEOUT_SECS`; NaN falls back to the default.
    pub fn render_timeout(&self) -> Duration {
        let secs = self.render_timeout_secs.clamp(0.0, MAX_RENDER_TIMEOUT_SECS);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::from_secs_f64(RENDER_TIMEOUT_SECS))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// User-facing texts. Deliberately generic; logs carry the detail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub invalid_profile_url: String,
    pub profile_parsing_error: String,
    pub invalid_logs_url: String,
    pub render_timeout: String,
    pub fetch_failed: String,
    pub log_user_not_found: String,
    pub broken_log_parsing: String,
    pub log_accepted: String,
    pub log_rejected: String,
    pub manual_review: String,
    pub user_not_verified: String,
    pub user_already_validated: String,
    pub validation_success: String,
    pub validation_token: String,
    pub invalid_token: String,
    pub unknown_role: String,
    pub role_already_held: String,
    /// `{url}` and `{reviewer}` are filled in.
    pub review_accepted: String,
    /// `{url}` and `{reviewer}` are filled in.
    pub review_rejected: String,
    pub internal_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            invalid_profile_url: s!("Invalid Lodestone URL. Expected https://eu.finalfantasyxiv.com/lodestone/character/<id>/"),
            profile_parsing_error: s!("Your Lodestone profile could not be read. Please try again later."),
            invalid_logs_url: s!("Invalid FFLogs URL. Please link a single fight, e.g. https://www.fflogs.com/reports/<code>/#fight=last"),
            render_timeout: s!("FFLogs took too long to respond. Please try again later."),
            fetch_failed: s!("The page could not be retrieved. Please try again later."),
            log_user_not_found: s!("Your character could not be found in the provided logs: "),
            broken_log_parsing: s!("The provided logs could not be parsed."),
            log_accepted: s!("Your logs have been accepted!"),
            log_rejected: s!("Your logs have been rejected."),
            manual_review: s!("The logs you provided have been flagged for manual review. Once our staff has had a look at them you will receive a message."),
            user_not_verified: s!("You need to verify your character first. Use !verify."),
            user_already_validated: s!("You are already verified as "),
            validation_success: s!("Verification successful! Welcome, "),
            validation_token: s!("Your verification token: "),
            invalid_token: s!("The token could not be found on your Lodestone profile."),
            unknown_role: s!("Unknown role: "),
            role_already_held: s!("You already have the role: "),
            review_accepted: s!("The logs you provided ({url}) have been manually reviewed and accepted by {reviewer}!"),
            review_rejected: s!("The logs you provided ({url}) have been manually reviewed and rejected. Please contact {reviewer} for more details."),
            internal_error: s!("Something went wrong on our side. Please contact staff."),
        }
    }
}

impl AppConfig {
    /// Read `path`; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("config {} not found, using defaults", path.display());
            let cfg = AppConfig::default();
            cfg.validate()?;
            return Ok(cfg);
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.fetch.validate()
    }
}
