// src/policy.rs
//! Competency policy: `FightRecord` → score → accept / reject / manual review.
//!
//! Pure and deterministic. The boss table and thresholds come from
//! [`PolicyConfig`]; the per-item weights are fixed.
//!
//! ```text
//! score = 10·deaths + 7·wipe + 5·penalized_deaths − 3·damage% − 1·healing%
//! ```
//!
//! Percentages are used as-is on the 0–100 scale, so a healthy kill scores
//! deeply negative; thresholds are tuned against that scale.

use tracing::debug;

use crate::config::consts::{
    DAMAGE_WEIGHT, DEATH_PENALTY, HEALING_WEIGHT, MECHANIC_PENALTY, WIPE_PENALTY,
};
use crate::config::options::{BossRule, Messages, PolicyConfig};
use crate::data::{Decision, FightRecord, Outcome, ScoreResult};
use crate::error::PolicyError;

/// Score and classify `record`. Unknown bosses are refused before scoring.
pub fn evaluate(
    record: &FightRecord,
    config: &PolicyConfig,
    messages: &Messages,
) -> Result<ScoreResult, PolicyError> {
    let boss = config
        .boss(&record.boss_name)
        .ok_or_else(|| PolicyError::UnrecognizedBoss {
            boss: record.boss_name.clone(),
            accepted: config.bosses.iter().map(|b| s!(b.display_name())).collect(),
        })?;

    let score = score(record, boss);
    let decision = classify(score, config.accept_threshold, config.reject_threshold);
    debug!(
        "policy: boss={} score={:.2} decision={}",
        boss.id, score, decision
    );

    let message = match decision {
        Decision::Accept => messages.log_accepted.clone(),
        Decision::Reject => messages.log_rejected.clone(),
        Decision::ManualReview => messages.manual_review.clone(),
    };
    Ok(ScoreResult { score, decision, message })
}

pub fn score(record: &FightRecord, boss: &BossRule) -> f64 {
    let mut score = 0.0;

    score += record.deaths.len() as f64 * DEATH_PENALTY;
    if record.outcome == Outcome::Wipe {
        score += WIPE_PENALTY;
    }

    score -= record.damage_percent * DAMAGE_WEIGHT;
    score -= record.healing_percent * HEALING_WEIGHT;

    let failed_mechanics = record
        .deaths
        .iter()
        .filter(|d| boss.is_penalized(&d.mechanic_name))
        .count();
    score += failed_mechanics as f64 * MECHANIC_PENALTY;

    score
}

/// Accept is checked first: `score == accept` is never escalated.
pub fn classify(score: f64, accept_threshold: f64, reject_threshold: f64) -> Decision {
    if score <= accept_threshold {
        Decision::Accept
    } else if score > reject_threshold {
        Decision::Reject
    } else {
        Decision::ManualReview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DeathEvent;

    fn record(boss: &str, outcome: Outcome, dmg: f64, heal: f64, deaths: &[&str]) -> FightRecord {
        FightRecord {
            boss_name: s!(boss),
            outcome,
            duration_seconds: 600,
            damage_percent: dmg,
            healing_percent: heal,
            deaths: deaths
                .iter()
                .enumerate()
                .map(|(i, m)| DeathEvent { time_seconds: 60 * i as u32, mechanic_name: s!(*m) })
                .collect(),
        }
    }

    fn cfg(accept: f64, reject: f64) -> PolicyConfig {
        PolicyConfig { accept_threshold: accept, reject_threshold: reject, ..PolicyConfig::default() }
    }

    #[test]
    fn bare_wipe_scores_seven_and_goes_to_review() {
        let r = record("Trinity Avowed Savage", Outcome::Wipe, 0.0, 0.0, &[]);
        let res = evaluate(&r, &cfg(5.0, 20.0), &Messages::default()).unwrap();
        assert_eq!(res.score, 7.0);
        assert_eq!(res.decision, Decision::ManualReview);
        assert_eq!(res.message, Messages::default().manual_review);
    }

    #[test]
    fn clean_kill_with_output_is_accepted_for_every_boss() {
        let c = cfg(5.0, 20.0);
        for boss in c.bosses.iter().flat_map(|b| b.names.iter()) {
            let r = record(boss, Outcome::Kill, 40.0, 10.0, &[]);
            let res = evaluate(&r, &c, &Messages::default()).unwrap();
            assert_eq!(res.score, -130.0);
            assert_eq!(res.decision, Decision::Accept);
        }
    }

    #[test]
    fn penalized_mechanic_costs_fifteen_other_costs_ten() {
        let c = cfg(5.0, 20.0);
        let base = record("The Queen Savage", Outcome::Kill, 0.0, 0.0, &[]);
        let base_score = evaluate(&base, &c, &Messages::default()).unwrap().score;

        for (mech, cost) in [("The Means", 15.0), ("Queen's Justice", 15.0), ("Heat Shock", 10.0), ("", 10.0)] {
            let r = record("The Queen Savage", Outcome::Kill, 0.0, 0.0, &[mech]);
            let s = evaluate(&r, &c, &Messages::default()).unwrap().score;
            assert_eq!(s - base_score, cost, "mechanic {mech:?}");
        }
    }

    #[test]
    fn duplicate_deaths_are_each_counted() {
        let r = record("Trinity Avowed Savage", Outcome::Kill, 0.0, 0.0, &["Cold Shock", "Cold Shock"]);
        let res = evaluate(&r, &cfg(5.0, 20.0), &Messages::default()).unwrap();
        assert_eq!(res.score, 30.0);
        assert_eq!(res.decision, Decision::Reject);
    }

    #[test]
    fn unknown_boss_is_refused_regardless_of_performance() {
        let r = record("Dahu", Outcome::Kill, 99.0, 99.0, &[]);
        let err = evaluate(&r, &cfg(5.0, 20.0), &Messages::default()).unwrap_err();
        let PolicyError::UnrecognizedBoss { boss, accepted } = &err;
        assert_eq!(boss, "Dahu");
        assert_eq!(accepted, &vec![s!("Trinity Avowed Savage"), s!("The Queen Savage")]);
        assert!(err.to_string().contains("Dahu"));
    }

    #[test]
    fn threshold_boundaries() {
        assert_eq!(classify(5.0, 5.0, 20.0), Decision::Accept);
        assert_eq!(classify(5.0, 5.0, 5.0), Decision::Accept);
        assert_eq!(classify(5.0001, 5.0, 5.0), Decision::Reject);
        assert_eq!(classify(20.0, 5.0, 20.0), Decision::ManualReview);
        assert_eq!(classify(20.5, 5.0, 20.0), Decision::Reject);
    }

    #[test]
    fn fractional_scores_are_not_rounded() {
        // 0 - 1.7*3 = -5.1: just past an accept threshold of -5
        let r = record("Trinity Avowed Savage", Outcome::Kill, 1.7, 0.0, &[]);
        let res = evaluate(&r, &cfg(-5.0, 0.0), &Messages::default()).unwrap();
        assert!((res.score + 5.1).abs() < 1e-9);
        assert_eq!(res.decision, Decision::Accept);

        let r = record("Trinity Avowed Savage", Outcome::Kill, 1.6, 0.0, &[]);
        let res = evaluate(&r, &cfg(-5.0, 0.0), &Messages::default()).unwrap();
        assert_eq!(res.decision, Decision::ManualReview);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let r = record("The Queen Savage", Outcome::Wipe, 12.5, 3.25, &["The Means", "Gods Save the Queen"]);
        let c = PolicyConfig::default();
        let m = Messages::default();
        assert_eq!(evaluate(&r, &c, &m), evaluate(&r, &c, &m));
    }
}
