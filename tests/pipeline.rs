// tests/pipeline.rs
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use cerberus::config::options::AppConfig;
use cerberus::core::{RenderSession, Renderer};
use cerberus::data::{Decision, Outcome, ReviewTicket, ReviewVerdict};
use cerberus::error::{Error, ExtractionError, FetchError};
use cerberus::progress::Transcript;
use cerberus::runner::{self, CHECKING_LOGS};
use cerberus::store::UserRecord;

const REPORT: &str = include_str!("fixtures/report_summary.html");
const URL: &str = "https://www.fflogs.com/reports/aBc123XyZ/#fight=last";

#[derive(Default)]
struct Counters {
    opened: Cell<usize>,
    closed: Cell<usize>,
    visited: RefCell<Vec<String>>,
}

/// Serves `markup` once `ready_after` readiness polls have failed.
struct FakeRenderer {
    markup: String,
    ready_after: usize,
    fail_navigate: bool,
    counters: Rc<Counters>,
}

impl FakeRenderer {
    fn new(markup: &str, ready_after: usize) -> Self {
        Self {
            markup: markup.to_string(),
            ready_after,
            fail_navigate: false,
            counters: Rc::new(Counters::default()),
        }
    }
}

struct FakeSession {
    markup: String,
    ready_after: usize,
    fail_navigate: bool,
    polls: usize,
    counters: Rc<Counters>,
}

impl Renderer for FakeRenderer {
    type Session = FakeSession;

    fn open(&self) -> Result<FakeSession, FetchError> {
        self.counters.opened.set(self.counters.opened.get() + 1);
        Ok(FakeSession {
            markup: self.markup.clone(),
            ready_after: self.ready_after,
            fail_navigate: self.fail_navigate,
            polls: 0,
            counters: Rc::clone(&self.counters),
        })
    }
}

impl RenderSession for FakeSession {
    fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        self.counters.visited.borrow_mut().push(url.to_string());
        if self.fail_navigate {
            return Err(FetchError::Session("navigation refused".into()));
        }
        Ok(())
    }

    fn has_element(&mut self, css: &str) -> Result<bool, FetchError> {
        assert_eq!(css, "#summary-damage-done-0");
        self.polls += 1;
        Ok(self.polls > self.ready_after)
    }

    fn page_source(&mut self) -> Result<String, FetchError> {
        Ok(self.markup.clone())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.counters.closed.set(self.counters.closed.get() + 1);
    }
}

fn cfg(timeout_secs: f64) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.fetch.render_timeout_secs = timeout_secs;
    cfg.fetch.poll_interval_ms = 1;
    cfg
}

fn users() -> HashMap<u64, UserRecord> {
    HashMap::from([
        (1, UserRecord { validated: true, name: "Aya Brea".into(), ..UserRecord::new(1) }),
        (2, UserRecord { pending_token: "tok".into(), ..UserRecord::new(2) }),
        (3, UserRecord { validated: true, name: "Nobody Here".into(), ..UserRecord::new(3) }),
        (4, UserRecord { validated: true, name: "Aya Brea".into(), roles: vec!["drs".into()], ..UserRecord::new(4) }),
    ])
}

#[test]
fn borderline_kill_goes_to_manual_review_with_ticket() {
    let renderer = FakeRenderer::new(REPORT, 3);
    let mut transcript = Transcript::default();

    let a = runner::check_report(&cfg(5.0), &renderer, &users(), 1, "drs", URL, Some(&mut transcript))
        .expect("assessment");

    assert_eq!(a.record.boss_name, "The Queen Savage");
    assert_eq!(a.record.outcome, Outcome::Kill);
    assert_eq!(a.record.duration_seconds, 612);
    assert_eq!(a.record.deaths.len(), 2);
    assert!((a.result.score - -44.35).abs() < 1e-9);
    assert_eq!(a.result.decision, Decision::ManualReview);
    assert_eq!(
        a.review,
        Some(ReviewTicket {
            user_id: 1,
            report_url: URL.into(),
            role: "drs".into(),
            participant: "Aya Brea".into()
        })
    );
    assert!(a.audit.is_none());

    assert_eq!(transcript.lines, vec![CHECKING_LOGS.to_string()]);
    assert_eq!(renderer.counters.opened.get(), 1);
    assert_eq!(renderer.counters.closed.get(), 1);
    assert_eq!(
        renderer.counters.visited.borrow().as_slice(),
        [format!("{URL}&type=summary")]
    );
}

#[test]
fn accepted_report_has_no_ticket() {
    let mut c = cfg(5.0);
    c.policy.accept_threshold = -40.0;
    let renderer = FakeRenderer::new(REPORT, 0);

    let a = runner::check_report(&c, &renderer, &users(), 1, "drs", URL, None).unwrap();
    assert_eq!(a.result.decision, Decision::Accept);
    assert_eq!(a.result.message, c.messages.log_accepted);
    assert!(a.review.is_none());
    assert_eq!(a.audit, Some(format!("Accepted logs ({URL}) for user 1")));
}

#[test]
fn rejected_report_is_audited() {
    let mut c = cfg(5.0);
    c.policy.reject_threshold = -50.0;
    let renderer = FakeRenderer::new(REPORT, 0);

    let a = runner::check_report(&c, &renderer, &users(), 1, "drs", URL, None).unwrap();
    assert_eq!(a.result.decision, Decision::Reject);
    assert_eq!(a.audit, Some(format!("Rejected logs ({URL}) for user 1")));
}

#[test]
fn role_already_held_skips_the_browser() {
    let renderer = FakeRenderer::new(REPORT, 0);
    let c = cfg(1.0);

    let err = runner::check_report(&c, &renderer, &users(), 4, "drs", URL, None).unwrap_err();
    assert!(matches!(err, Error::RoleAlreadyHeld(ref r) if r == "drs"));
    assert_eq!(err.user_message(&c.messages), "You already have the role: drs");
    assert_eq!(renderer.counters.opened.get(), 0);
}

#[test]
fn manual_review_ticket_settles_into_a_grant() {
    let renderer = FakeRenderer::new(REPORT, 0);
    let c = cfg(5.0);

    let a = runner::check_report(&c, &renderer, &users(), 1, "drs", URL, None).unwrap();
    let ticket = a.review.expect("ticket");

    let json = serde_json::to_string(&ticket).unwrap();
    let ticket: ReviewTicket = serde_json::from_str(&json).unwrap();

    let out = runner::resolve_review(&c, &ticket, ReviewVerdict::Accept, "Kyle").unwrap();
    assert_eq!(out.user_id, 1);
    assert_eq!(out.grant_role.as_deref(), Some("drs"));
    assert!(out.user_message.contains(URL));
    assert_eq!(out.audit, format!("Kyle manually accepted logs ({URL}) for user 1"));
}

#[test]
fn render_timeout_still_releases_the_session() {
    let renderer = FakeRenderer::new(REPORT, usize::MAX);
    let c = cfg(0.05);

    let err = runner::check_report(&c, &renderer, &users(), 1, "drs", URL, None).unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::RenderTimeout { .. })));
    assert_eq!(err.user_message(&c.messages), c.messages.render_timeout);
    assert_eq!(renderer.counters.opened.get(), 1);
    assert_eq!(renderer.counters.closed.get(), 1);
}

#[test]
fn navigation_failure_still_releases_the_session() {
    let mut renderer = FakeRenderer::new(REPORT, 0);
    renderer.fail_navigate = true;

    let err = runner::check_report(&cfg(1.0), &renderer, &users(), 1, "drs", URL, None).unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Session(_))));
    assert_eq!(renderer.counters.closed.get(), 1);
}

#[test]
fn refusals_before_any_browser_work() {
    let renderer = FakeRenderer::new(REPORT, 0);
    let c = cfg(1.0);
    let u = users();

    assert!(matches!(
        runner::check_report(&c, &renderer, &u, 2, "drs", URL, None),
        Err(Error::NotVerified(2))
    ));
    assert!(matches!(
        runner::check_report(&c, &renderer, &u, 404, "drs", URL, None),
        Err(Error::NotVerified(404))
    ));
    assert!(matches!(
        runner::check_report(&c, &renderer, &u, 1, "healer", URL, None),
        Err(Error::UnknownRole(ref r)) if r == "healer"
    ));

    let err = runner::check_report(&c, &renderer, &u, 1, "drs", "https://www.fflogs.com/reports/x/", None)
        .unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::InvalidUrl(_))));
    assert_eq!(err.user_message(&c.messages), c.messages.invalid_logs_url);

    assert_eq!(renderer.counters.opened.get(), 0);
}

#[test]
fn participant_missing_from_report() {
    let renderer = FakeRenderer::new(REPORT, 0);
    let c = cfg(1.0);

    let err = runner::check_report(&c, &renderer, &users(), 3, "drs", URL, None).unwrap_err();
    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::ParticipantNotFound(ref n)) if n == "Nobody Here"
    ));
    assert!(err.user_message(&c.messages).ends_with("Nobody Here"));
    assert_eq!(renderer.counters.closed.get(), 1);
}

#[test]
fn unknown_boss_is_refused_with_alternatives() {
    let doc = REPORT.replace("The Queen Savage<span", "Dahu<span");
    let err = runner::check_markup(&AppConfig::default(), &doc, "Aya Brea").unwrap_err();
    let msg = err.user_message(&AppConfig::default().messages);
    assert!(msg.starts_with("Dahu is not a valid boss"));
    assert!(msg.contains("The Queen Savage"));
}
