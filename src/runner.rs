// src/runner.rs
//! Front-end facing pipeline.
//!
//! ```text
//! check_report:     user ok? → role ok? → not held? → render → extract → evaluate → Assessment
//! resolve_review:   ReviewTicket + staff verdict → ReviewOutcome
//! confirm_identity: user ok? → profile → verify::confirm → IdentityUpdate
//! ```
//!
//! Users are only read here. Persisting an `IdentityUpdate`, granting a
//! role or writing audit lines is left to the caller.

use tracing::info;

use crate::config::options::AppConfig;
use crate::core::webdriver::Renderer;
use crate::data::{
    Assessment, Decision, FightRecord, ReviewOutcome, ReviewTicket, ReviewVerdict, ScoreResult,
};
use crate::error::{CerberusResult, Error, StoreError, VerifyError};
use crate::policy;
use crate::progress::Progress;
use crate::specs::{profile, report};
use crate::store::{UserDirectory, UserRecord};
use crate::verify::{self, IdentityUpdate};

pub const CHECKING_LOGS: &str = "Checking provided logs. This may take some seconds.";
pub const CHECKING_PROFILE: &str = "Checking Lodestone profile.";

/// Full report check for `user_id` applying for `role`.
///
/// The participant searched in the report is the user's confirmed character
/// name, never a name supplied with the request.
pub fn check_report<R, U>(
    cfg: &AppConfig,
    renderer: &R,
    users: &U,
    user_id: u64,
    role: &str,
    url: &str,
    mut progress: Option<&mut dyn Progress>,
) -> CerberusResult<Assessment>
where
    R: Renderer,
    U: UserDirectory + ?Sized,
{
    let user = match users.lookup(user_id) {
        Ok(u) if u.validated => u,
        Ok(_) | Err(StoreError::NotFound(_)) => return Err(Error::NotVerified(user_id)),
        Err(e) => return Err(e.into()),
    };
    if !cfg.roles.contains_key(role) {
        return Err(Error::UnknownRole(s!(role)));
    }
    if user.holds_role(role) {
        return Err(Error::RoleAlreadyHeld(s!(role)));
    }

    if let Some(p) = progress.as_deref_mut() {
        p.begin();
        p.log(CHECKING_LOGS);
    }
    let markup = report::fetch_rendered(url, renderer, &cfg.fetch);
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    let (record, result) = check_markup(cfg, &markup?, &user.name)?;
    info!(
        "user {} role {}: {} ({:.2}) on {}",
        user_id, role, result.decision, result.score, record.boss_name
    );

    let review = (result.decision == Decision::ManualReview).then(|| ReviewTicket {
        user_id,
        report_url: s!(url),
        role: s!(role),
        participant: user.name.clone(),
    });
    let audit = audit_line(result.decision, url, user_id);
    Ok(Assessment { record, result, review, audit })
}

/// Staff log line for an automatic decision; manual reviews get theirs later.
fn audit_line(decision: Decision, url: &str, user_id: u64) -> Option<String> {
    match decision {
        Decision::Accept => Some(format!("Accepted logs ({url}) for user {user_id}")),
        Decision::Reject => Some(format!("Rejected logs ({url}) for user {user_id}")),
        Decision::ManualReview => None,
    }
}

/// Turn a staff verdict on `ticket` into the reply, role grant and audit line.
///
/// Only an accept grants, and only a configured role.
pub fn resolve_review(
    cfg: &AppConfig,
    ticket: &ReviewTicket,
    verdict: ReviewVerdict,
    reviewer: &str,
) -> CerberusResult<ReviewOutcome> {
    let fill = |template: &str| {
        template
            .replace("{url}", &ticket.report_url)
            .replace("{reviewer}", reviewer)
    };

    let outcome = match verdict {
        ReviewVerdict::Accept => {
            if !cfg.roles.contains_key(&ticket.role) {
                return Err(Error::UnknownRole(ticket.role.clone()));
            }
            ReviewOutcome {
                user_id: ticket.user_id,
                user_message: fill(&cfg.messages.review_accepted),
                grant_role: Some(ticket.role.clone()),
                audit: format!(
                    "{reviewer} manually accepted logs ({}) for user {}",
                    ticket.report_url, ticket.user_id
                ),
            }
        }
        ReviewVerdict::Reject => ReviewOutcome {
            user_id: ticket.user_id,
            user_message: fill(&cfg.messages.review_rejected),
            grant_role: None,
            audit: format!(
                "{reviewer} manually rejected logs ({}) for user {}",
                ticket.report_url, ticket.user_id
            ),
        },
    };
    info!("review of user {} by {}: {:?}", ticket.user_id, reviewer, verdict);
    Ok(outcome)
}

/// Offline half of [`check_report`]: extract and evaluate saved markup.
pub fn check_markup(
    cfg: &AppConfig,
    markup: &str,
    participant: &str,
) -> CerberusResult<(FightRecord, ScoreResult)> {
    let record = report::extract_fight(markup, participant)?;
    let result = policy::evaluate(&record, &cfg.policy, &cfg.messages)?;
    Ok((record, result))
}

/// Confirm that `user_id` owns the character at `profile_url`.
///
/// Cheap refusals (already validated, no token issued) happen before any
/// network access.
pub fn confirm_identity<U>(
    users: &U,
    user_id: u64,
    profile_url: &str,
    mut progress: Option<&mut dyn Progress>,
) -> CerberusResult<IdentityUpdate>
where
    U: UserDirectory + ?Sized,
{
    let user = match users.lookup(user_id) {
        Ok(u) => u,
        Err(StoreError::NotFound(_)) => UserRecord::new(user_id),
        Err(e) => return Err(e.into()),
    };
    if user.validated {
        return Err(VerifyError::AlreadyValidated(user.name).into());
    }
    if user.pending_token.is_empty() {
        return Err(VerifyError::NoPendingToken.into());
    }

    if let Some(p) = progress.as_deref_mut() {
        p.log(CHECKING_PROFILE);
    }
    let identity = profile::fetch(profile_url)?;
    let update = verify::confirm(&user, &identity)?;
    info!("user {} confirmed as {}", user_id, update.nickname);
    Ok(update)
}
