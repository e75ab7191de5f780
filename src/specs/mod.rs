// src/specs/mod.rs
//! # Page scrapers
//!
//! One module per remote page. Each knows *where the ground
//! truth lives in one page's HTML* and *how to extract it tolerantly*.
//!
//! ## What lives here
//! - **URL shape checks** for the pages we accept links to (profile, report).
//! - **Pure HTML parsing** of captured markup into typed records
//!   (`data::IdentityRecord`, `data::FightRecord`).
//! - **Tolerant extraction** via `core::html` helpers (case-insensitive element
//!   lookup, balanced nesting, attribute/class matching, first-text-node reads).
//!
//! ## What does **not** live here
//! - **Scoring or decisions**: that is `policy`.
//! - **Users, tokens, roles**: `verify`, `store` and `runner`.
//!
//! ## Typical call chain
//! ```text
//! runner::check_report → specs::report::fetch_rendered → specs::report::extract_fight
//!                                                      ↘ policy::evaluate
//! runner::confirm_identity → specs::profile::fetch → verify::confirm
//! ```
//!
//! ## Conventions & invariants
//! - Each sub-extraction is independently fallible; a failure names the field.
//! - A record is returned fully populated or not at all.
//! - Everything here is testable **offline**: every `fetch*` has a pure `extract*` half.
pub mod profile;
pub mod report;
