// src/verify.rs
//! Character ownership challenge.
//!
//! A user asks for a token, pastes it into their profile bio, and then
//! submits the profile link. `confirm` checks the bio and, on success,
//! returns what the caller should persist. Nothing here touches storage.

use std::fmt::Write as _;

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::data::IdentityRecord;
use crate::error::VerifyError;
use crate::store::UserRecord;

/// Outcome of a successful confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityUpdate {
    pub validated: bool,
    pub name: String,
    /// Always empty: the token is spent.
    pub token: String,
    /// `"Name [World]"`
    pub nickname: String,
}

/// `hex(sha256(id)) + "-" + hex(16 random bytes)`.
pub fn issue_token(user_id: u64) -> String {
    let digest = Sha256::digest(user_id.to_string().as_bytes());

    let mut nonce = [0u8; 16];
    OsRng.fill_bytes(&mut nonce);

    join!(&hex(&digest), "-", &hex(&nonce))
}

pub fn confirm(user: &UserRecord, identity: &IdentityRecord) -> Result<IdentityUpdate, VerifyError> {
    if user.validated {
        return Err(VerifyError::AlreadyValidated(user.name.clone()));
    }
    if user.pending_token.is_empty() {
        return Err(VerifyError::NoPendingToken);
    }
    if !identity.bio_marker.contains(&user.pending_token) {
        return Err(VerifyError::InvalidToken);
    }

    Ok(IdentityUpdate {
        validated: true,
        name: identity.display_name.clone(),
        token: s!(),
        nickname: format!("{} [{}]", identity.display_name, identity.world),
    })
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
