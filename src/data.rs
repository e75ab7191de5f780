// src/data.rs
//
// Typed records flowing through the pipeline.
//
// - IdentityRecord: what a character profile says about its owner.
// - FightRecord:    one fight's summary for one participant.
// - ScoreResult:    the policy verdict for a FightRecord.
// - ReviewTicket:   a ManualReview waiting for staff; ReviewOutcome is
//                   what their verdict amounts to.
//
// All of them are built fresh per request and never mutated after
// construction; extractors either return a complete record or an error.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub display_name: String,
    /// Visible bio text; the challenge token is looked for in here.
    pub bio_marker: String,
    /// Home world, datacenter suffix removed. May be empty.
    pub world: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Kill,
    Wipe,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Kill => "Kill",
            Outcome::Wipe => "Wipe",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub time_seconds: u32,
    /// Empty when the report does not name the killing ability.
    pub mechanic_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FightRecord {
    pub boss_name: String,
    pub outcome: Outcome,
    pub duration_seconds: u32,
    pub damage_percent: f64,
    pub healing_percent: f64,
    /// Markup order, which is chronological on the report page.
    pub deaths: Vec<DeathEvent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Accept,
    Reject,
    ManualReview,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
            Decision::ManualReview => "manual review",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Raw penalty score; lower is better. Never rounded.
    pub score: f64,
    pub decision: Decision,
    pub message: String,
}

/// What staff need to adjudicate a manual review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTicket {
    pub user_id: u64,
    pub report_url: String,
    pub role: String,
    pub participant: String,
}

/// Full outcome of one report check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub record: FightRecord,
    pub result: ScoreResult,
    /// Present only when `result.decision == ManualReview`.
    pub review: Option<ReviewTicket>,
    /// Staff log line for automatic accepts and rejects.
    pub audit: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReviewVerdict {
    Accept,
    Reject,
}

/// Staff verdict on a [`ReviewTicket`], resolved into what the front-end does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub user_id: u64,
    /// Sent to the applicant.
    pub user_message: String,
    /// Role to grant; only on accept.
    pub grant_role: Option<String>,
    pub audit: String,
}
