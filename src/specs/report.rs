// src/specs/report.rs
//! Fight report summary page.
//!
//! The page renders client-side, so it is fetched through a [`Renderer`]
//! session and only read once the damage table (`#summary-damage-done-0`)
//! exists. Extraction then works on the captured markup alone:
//!
//! ```text
//! table.composition-table      participant present?      → ParticipantNotFound
//! div#filter-fight-boss-text   first text node           → boss name
//! div#filter-fight-details-text span.wipe | span.kill    → outcome
//!                                └ span.fight-duration "(M:SS)"
//! table#summary-damage-done-0  row(participant) → next td div.report-amount-percent
//! table#summary-healing-done-0 same
//! table#summary-deaths-0       rows(participant) → next td span#death-ability*, next td "M:SS"
//! ```
//!
//! Rows are matched by an `<a>` whose text *contains* the participant name,
//! the way the site prints names with decorations around them.

use std::sync::LazyLock;
use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, info};

use crate::config::consts::*;
use crate::config::options::FetchOptions;
use crate::core::html::{
    attr_value, children_ci, element_by_class, element_by_id, elements_ci, find_element_ci,
    has_anchor_containing, leading_text, text_of,
};
use crate::core::sanitize::{parse_clock, parse_percent};
use crate::core::webdriver::{RenderSession, Renderer};
use crate::data::{DeathEvent, FightRecord, Outcome};
use crate::error::{ExtractionError, FetchError};

static REPORT_URL: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^https://{}/reports/([a-zA-Z0-9]+)/#fight=(last|[0-9]{{1,2}})",
        regex::escape(REPORT_HOST)
    );
    Regex::new(&pattern).expect("static report url pattern")
});

/* ---------- fetch ---------- */

/// Report link → summary-view link. Only the matched prefix survives;
/// anything after `#fight=<n>` is discarded.
pub fn summary_url(url: &str) -> Result<String, FetchError> {
    let m = REPORT_URL
        .find(url)
        .ok_or_else(|| FetchError::InvalidUrl(s!(url)))?;
    Ok(join!(m.as_str(), SUMMARY_SUFFIX))
}

/// Render the report and return its markup once the damage table exists.
///
/// One session per call. It is released when it goes out of scope, on
/// success, on timeout and on every `?` in between.
pub fn fetch_rendered<R: Renderer>(
    url: &str,
    renderer: &R,
    opts: &FetchOptions,
) -> Result<String, FetchError> {
    let target = summary_url(url)?;

    let mut session = renderer.open()?;
    info!("rendering {}", target);
    session.navigate(&target)?;
    wait_for(&mut session, READY_SELECTOR, opts.render_timeout(), opts.poll_interval())?;
    session.page_source()
}

fn wait_for<S: RenderSession>(
    session: &mut S,
    css: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<(), FetchError> {
    let deadline = Instant::now().checked_add(timeout).unwrap_or_else(Instant::now);
    loop {
        if session.has_element(css)? {
            return Ok(());
        }
        let now = Instant::now();
        if now >= deadline {
            debug!("{} not present after {:?}", css, timeout);
            return Err(FetchError::RenderTimeout { secs: timeout.as_secs_f64() });
        }
        thread::sleep(poll.min(deadline - now));
    }
}

/* ---------- extract ---------- */

/// Read one participant's fight out of rendered summary markup.
///
/// Participant presence is checked first, so a report that simply does not
/// contain the caller is never reported as broken.
pub fn extract_fight(markup: &str, participant: &str) -> Result<FightRecord, ExtractionError> {
    if !contains_participant(markup, participant) {
        return Err(ExtractionError::ParticipantNotFound(s!(participant)));
    }

    let boss_name = boss_name(markup)?;
    let (outcome, duration_seconds) = outcome(markup)?;
    let damage_percent = percent_done(markup, DAMAGE_TABLE_ID, participant)
        .ok_or(broken!(DamagePercent))?;
    let healing_percent = percent_done(markup, HEALING_TABLE_ID, participant)
        .ok_or(broken!(HealingPercent))?;
    let deaths = deaths(markup, participant).ok_or(broken!(Deaths))?;

    Ok(FightRecord {
        boss_name,
        outcome,
        duration_seconds,
        damage_percent,
        healing_percent,
        deaths,
    })
}

pub fn contains_participant(markup: &str, participant: &str) -> bool {
    element_by_class(markup, "table", COMPOSITION_TABLE_CLASS)
        .map(|t| has_anchor_containing(t, participant))
        .unwrap_or(false)
}

fn boss_name(markup: &str) -> Result<String, ExtractionError> {
    let name = element_by_id(markup, "div", BOSS_TITLE_ID)
        .map(leading_text)
        .unwrap_or_default();
    if name.is_empty() {
        debug!("report: boss title missing or empty");
        return Err(broken!(BossName));
    }
    Ok(name)
}

/// Wipe marker wins over kill marker when both are present.
fn outcome(markup: &str) -> Result<(Outcome, u32), ExtractionError> {
    let details = element_by_id(markup, "div", FIGHT_DETAILS_ID).ok_or(broken!(Outcome))?;

    let (outcome, marker) = match element_by_class(details, "span", "wipe") {
        Some(span) => (Outcome::Wipe, span),
        None => match element_by_class(details, "span", "kill") {
            Some(span) => (Outcome::Kill, span),
            None => {
                debug!("report: neither wipe nor kill marker");
                return Err(broken!(Outcome));
            }
        },
    };

    let duration = element_by_class(marker, "span", "fight-duration")
        .and_then(|d| parse_clock(&text_of(d)))
        .ok_or(broken!(Outcome))?;
    Ok((outcome, duration))
}

/// Rows of `table` as cell lists, header rows (no `<td>`) dropped.
fn rows(table: &str) -> Vec<Vec<&str>> {
    elements_ci(table, "tr")
        .into_iter()
        .map(|tr| children_ci(tr, "td"))
        .filter(|cells| !cells.is_empty())
        .collect()
}

/// Index of the cell holding the participant's anchor, if this row is theirs.
fn participant_cell(cells: &[&str], participant: &str) -> Option<usize> {
    cells.iter().position(|c| has_anchor_containing(c, participant))
}

/// `Some(0.0)` when the participant has no row; `None` when the table is
/// missing or their row does not parse.
fn percent_done(markup: &str, table_id: &str, participant: &str) -> Option<f64> {
    let table = element_by_id(markup, "table", table_id)?;

    for cells in rows(table) {
        let Some(i) = participant_cell(&cells, participant) else { continue };
        let value = cells
            .get(i + 1)
            .and_then(|c| element_by_class(c, "div", PERCENT_CLASS))
            .map(leading_text)
            .and_then(|t| parse_percent(&t));
        if value.is_none() {
            debug!("report: unreadable percent in {}", table_id);
        }
        return value;
    }
    Some(0.0)
}

/// Every row naming the participant, in markup order. Any bad row fails all.
fn deaths(markup: &str, participant: &str) -> Option<Vec<DeathEvent>> {
    let table = element_by_id(markup, "table", DEATHS_TABLE_ID)?;
    let mut out = Vec::new();

    for cells in rows(table) {
        let Some(i) = participant_cell(&cells, participant) else { continue };

        let mechanic_cell = cells.get(i + 1)?;
        let mechanic_name = find_element_ci(mechanic_cell, "span", 0, |open| {
            attr_value(open, "id").is_some_and(|id| id.starts_with(DEATH_ABILITY_PREFIX))
        })
        .map(|(a, b)| leading_text(&mechanic_cell[a..b]))
        .unwrap_or_default();

        let Some(time_seconds) = cells.get(i + 2).and_then(|c| parse_clock(&leading_text(c))) else {
            debug!("report: unreadable death timestamp");
            return None;
        };

        out.push(DeathEvent { time_seconds, mechanic_name });
    }
    Some(out)
}
