// src/specs/profile.rs
//! Lodestone character profile page.
//!
//! Purpose:
//! - Validate the profile link shape before touching the network.
//! - Read the three regions identity confirmation needs: bio, display name, world.
//!
//! The world region reads `World<NBSP>(Datacenter)`; only the world is kept.
//! Any missing region fails the whole extraction.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::consts::{PROFILE_BIO_CLASS, PROFILE_NAME_CLASS, PROFILE_WORLD_CLASS};
use crate::core::html::{element_by_class, inner_after_open_tag, leading_text, strip_tags_raw, text_of};
use crate::core::net;
use crate::core::sanitize::{NBSP, decode_entities, normalize_ws};
use crate::data::IdentityRecord;
use crate::error::ExtractionError;

static PROFILE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(eu|na)\.finalfantasyxiv\.com/lodestone/character/([0-9]{6,10})/$")
        .expect("static profile url pattern")
});

/// Profile link must match exactly; no trailing query, fragment or path.
pub fn validate_url(url: &str) -> Result<(), ExtractionError> {
    if PROFILE_URL.is_match(url) {
        Ok(())
    } else {
        Err(ExtractionError::InvalidUrl(s!(url)))
    }
}

/// Validate, fetch once, extract.
pub fn fetch(url: &str) -> Result<IdentityRecord, ExtractionError> {
    validate_url(url)?;
    let doc = net::http_get(url)?;
    extract(&doc)
}

/// Offline half of [`fetch`]: read an already downloaded profile page.
pub fn extract(doc: &str) -> Result<IdentityRecord, ExtractionError> {
    let bio = element_by_class(doc, "div", PROFILE_BIO_CLASS).ok_or(malformed!(Bio))?;
    let name = element_by_class(doc, "p", PROFILE_NAME_CLASS).ok_or(malformed!(Name))?;
    let world = element_by_class(doc, "p", PROFILE_WORLD_CLASS).ok_or(malformed!(World))?;

    let display_name = leading_text(name);
    if display_name.is_empty() {
        debug!("profile: name region present but empty");
        return Err(malformed!(Name));
    }

    Ok(IdentityRecord {
        display_name,
        bio_marker: text_of(bio),
        world: world_only(world),
    })
}

/// `"Ragnarok&nbsp;(Chaos)"` → `"Ragnarok"`; empty stays empty.
fn world_only(block: &str) -> String {
    let raw = strip_tags_raw(&decode_entities(&inner_after_open_tag(block)));
    let head = raw.split(NBSP).next().unwrap_or_default();
    normalize_ws(head)
}
