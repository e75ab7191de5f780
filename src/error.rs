// src/error.rs
//! Crate-wide error hierarchy.
//!
//! One enum per layer (fetch, extraction, policy, config, store, identity) and
//! a root [`Error`] that the pipeline returns. Every failure is a typed value;
//! the user-facing wording lives in [`Messages`] and is looked up through
//! [`Error::user_message`], so logs keep the detail (which field broke) while
//! users get a generic sentence.

use std::fmt;

use thiserror::Error;

use crate::config::options::Messages;

/// Convenient alias for crate-wide results.
pub type CerberusResult<T> = Result<T, Error>;

/// Root error type for the verification pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// The requesting user has not confirmed their character yet.
    #[error("user {0} is not verified")]
    NotVerified(u64),

    /// Role name not present in the configured role table.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// The user already holds the requested role; nothing is fetched.
    #[error("role already held: {0}")]
    RoleAlreadyHeld(String),
}

/// Retrieval failures (profile GET or report render).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Readiness anchor never appeared; the session was torn down.
    #[error("render timeout after {secs:.1}s")]
    RenderTimeout { secs: f64 },

    #[error("http status error: {0}")]
    HttpStatus(u16),

    #[error("network error: {0}")]
    Network(String),

    /// WebDriver answered, but not in the shape the protocol promises.
    #[error("webdriver error: {0}")]
    Session(String),
}

/// Which part of a fight report failed to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportField {
    BossName,
    Outcome,
    DamagePercent,
    HealingPercent,
    Deaths,
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportField::BossName => "boss name",
            ReportField::Outcome => "outcome/duration",
            ReportField::DamagePercent => "damage percent",
            ReportField::HealingPercent => "healing percent",
            ReportField::Deaths => "deaths",
        };
        f.write_str(name)
    }
}

/// Which region of a character profile was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Bio,
    Name,
    World,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileField::Bio => "bio",
            ProfileField::Name => "display name",
            ProfileField::World => "world",
        };
        f.write_str(name)
    }
}

/// Page-level extraction failures (profile and report).
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed profile page: {field} not found")]
    MalformedPage { field: ProfileField },

    #[error("broken report: {field} could not be extracted")]
    BrokenReport { field: ReportField },

    /// The report is well-formed but the participant is not in it.
    #[error("participant not found in report: {0}")]
    ParticipantNotFound(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("{boss} is not a valid boss for these logs. Please provide logs for either {}", .accepted.join(" or "))]
    UnrecognizedBoss { boss: String, accepted: Vec<String> },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("accept_threshold ({accept}) must not exceed reject_threshold ({reject})")]
    Thresholds { accept: f64, reject: f64 },

    #[error("no bosses configured")]
    NoBosses,

    #[error("render_timeout_secs must be a number in 0..={max}, got {secs}")]
    RenderTimeout { secs: f64, max: f64 },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed user row: {0}")]
    Malformed(String),

    #[error("user {0} not found")]
    NotFound(u64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("already validated as {0}")]
    AlreadyValidated(String),

    #[error("no pending token; request one first")]
    NoPendingToken,

    #[error("token not found in profile bio")]
    InvalidToken,
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return FetchError::HttpStatus(status.as_u16());
        }
        FetchError::Network(e.to_string())
    }
}

impl Error {
    /// Generic, user-facing sentence for this failure.
    pub fn user_message(&self, m: &Messages) -> String {
        match self {
            Error::Fetch(e) => fetch_message(e, m),
            Error::Extraction(e) => match e {
                ExtractionError::InvalidUrl(_) => m.invalid_profile_url.clone(),
                ExtractionError::Fetch(f) => fetch_message(f, m),
                ExtractionError::MalformedPage { .. } => m.profile_parsing_error.clone(),
                ExtractionError::BrokenReport { .. } => m.broken_log_parsing.clone(),
                ExtractionError::ParticipantNotFound(name) => {
                    join!(&m.log_user_not_found, name)
                }
            },
            Error::Policy(e) => e.to_string(),
            Error::Config(_) | Error::Store(_) => m.internal_error.clone(),
            Error::Verify(e) => match e {
                VerifyError::AlreadyValidated(name) => join!(&m.user_already_validated, name),
                VerifyError::NoPendingToken | VerifyError::InvalidToken => m.invalid_token.clone(),
            },
            Error::NotVerified(_) => m.user_not_verified.clone(),
            Error::UnknownRole(role) => join!(&m.unknown_role, role),
            Error::RoleAlreadyHeld(role) => join!(&m.role_already_held, role),
        }
    }
}

fn fetch_message(e: &FetchError, m: &Messages) -> String {
    match e {
        FetchError::InvalidUrl(_) => m.invalid_logs_url.clone(),
        FetchError::RenderTimeout { .. } => m.render_timeout.clone(),
        _ => m.fetch_failed.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_boss_names_offender_and_alternatives() {
        let e = PolicyError::UnrecognizedBoss {
            boss: s!("Dahu"),
            accepted: vec![s!("Trinity Avowed Savage"), s!("The Queen Savage")],
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Dahu is not a valid boss"));
        assert!(msg.ends_with("Trinity Avowed Savage or The Queen Savage"));
    }

    #[test]
    fn participant_message_carries_name() {
        let m = Messages::default();
        let e = Error::from(ExtractionError::ParticipantNotFound(s!("Aya Brea")));
        assert!(e.user_message(&m).ends_with("Aya Brea"));
    }

    #[test]
    fn broken_report_user_message_is_generic() {
        let m = Messages::default();
        let e = Error::from(broken!(Deaths));
        assert_eq!(e.user_message(&m), m.broken_log_parsing);
        assert!(e.to_string().contains("deaths"));
    }
}
