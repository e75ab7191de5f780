// src/store.rs
//! User records.
//!
//! The pipeline only ever reads users, through [`UserDirectory`]. The CSV
//! store below is the file-backed collaborator the CLI writes through:
//! `.store/users.csv`, one `id,validated,name,token,roles` row per user
//! (`roles` is `;`-separated). Rows written before the roles column existed
//! still load. Staff decisions are appended to `.store/audit.log`.

use std::{
    collections::HashMap,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::config::consts::{AUDIT_FILE, ROLE_SEP, STORE_DIR, STORE_SEP, USERS_FILE};
use crate::csv::{parse_rows, write_row};
use crate::error::StoreError;
use crate::verify::IdentityUpdate;

const HEADER: [&str; 5] = ["id", "validated", "name", "token", "roles"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub validated: bool,
    /// Confirmed character name; empty until validated.
    pub name: String,
    /// Outstanding challenge token; empty when none.
    pub pending_token: String,
    /// Roles granted so far.
    pub roles: Vec<String>,
}

impl UserRecord {
    pub fn new(id: u64) -> Self {
        Self { id, ..Self::default() }
    }

    pub fn holds_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            s!(if self.validated { "1" } else { "0" }),
            self.name.clone(),
            self.pending_token.clone(),
            self.roles.join(&ROLE_SEP.to_string()),
        ]
    }

    fn from_row(row: &[String]) -> Result<Self, StoreError> {
        let (id, validated, name, token, roles) = match row {
            [id, validated, name, token] => (id, validated, name, token, ""),
            [id, validated, name, token, roles] => (id, validated, name, token, roles.as_str()),
            _ => return Err(StoreError::Malformed(row.join(","))),
        };
        let id = id
            .trim()
            .parse()
            .map_err(|_| StoreError::Malformed(row.join(",")))?;
        let validated = match validated.trim() {
            "1" | "true" => true,
            "0" | "false" | "" => false,
            _ => return Err(StoreError::Malformed(row.join(","))),
        };
        let roles = roles
            .split(ROLE_SEP)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();
        Ok(Self { id, validated, name: name.clone(), pending_token: token.clone(), roles })
    }
}

/// Read-only user lookup.
pub trait UserDirectory {
    fn lookup(&self, id: u64) -> Result<UserRecord, StoreError>;
}

impl UserDirectory for HashMap<u64, UserRecord> {
    fn lookup(&self, id: u64) -> Result<UserRecord, StoreError> {
        self.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }
}

pub struct CsvUserStore {
    path: PathBuf,
}

impl CsvUserStore {
    /// Store rooted at `dir` (file `dir/users.csv`). Nothing is created until the first write.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(USERS_FILE) }
    }

    pub fn default_location() -> Self {
        Self::open(STORE_DIR)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_or_create(&self, id: u64) -> Result<UserRecord, StoreError> {
        let mut users = self.load()?;
        if let Some(u) = users.iter().find(|u| u.id == id) {
            return Ok(u.clone());
        }
        let user = UserRecord::new(id);
        users.push(user.clone());
        self.save(&users)?;
        debug!("store: created user {}", id);
        Ok(user)
    }

    /// Replace the user's pending token, creating the user if needed.
    pub fn set_token(&self, id: u64, token: &str) -> Result<(), StoreError> {
        let mut users = self.load()?;
        match users.iter_mut().find(|u| u.id == id) {
            Some(u) => u.pending_token = s!(token),
            None => users.push(UserRecord { pending_token: s!(token), ..UserRecord::new(id) }),
        }
        self.save(&users)
    }

    pub fn apply_identity(&self, id: u64, update: &IdentityUpdate) -> Result<(), StoreError> {
        let mut users = self.load()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))?;
        user.validated = update.validated;
        user.name = update.name.clone();
        user.pending_token = update.token.clone();
        self.save(&users)
    }

    /// Record `role` as held. Granting twice is a no-op.
    pub fn grant_role(&self, id: u64, role: &str) -> Result<(), StoreError> {
        let mut users = self.load()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if user.holds_role(role) {
            return Ok(());
        }
        user.roles.push(s!(role));
        debug!("store: user {} granted {}", id, role);
        self.save(&users)
    }

    /// Append one line to `audit.log` next to the users file.
    pub fn append_audit(&self, line: &str) -> Result<(), StoreError> {
        let path = self.audit_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    pub fn audit_path(&self) -> PathBuf {
        self.path.with_file_name(AUDIT_FILE)
    }

    fn load(&self) -> Result<Vec<UserRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        parse_rows(&text, STORE_SEP)
            .into_iter()
            .filter(|r| r.first().map(String::as_str) != Some(HEADER[0]))
            .map(|r| UserRecord::from_row(&r))
            .collect()
    }

    fn save(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut buf: Vec<u8> = Vec::new();
        write_row(&mut buf, &HEADER.map(String::from), STORE_SEP)?;
        for u in users {
            write_row(&mut buf, &u.to_row(), STORE_SEP)?;
        }
        fs::write(&self.path, buf)?;
        Ok(())
    }
}

impl UserDirectory for CsvUserStore {
    fn lookup(&self, id: u64) -> Result<UserRecord, StoreError> {
        self.load()?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| s!(*c)).collect()
    }

    #[test]
    fn row_conversion() {
        let u = UserRecord {
            id: 7,
            validated: true,
            name: s!("Aya Brea"),
            pending_token: s!(),
            roles: vec![s!("drs"), s!("bozja")],
        };
        assert_eq!(u.to_row()[4], "drs;bozja");
        assert_eq!(UserRecord::from_row(&u.to_row()).unwrap(), u);
        assert_eq!(UserRecord::from_row(&row(&["7", "", "", ""])).unwrap(), UserRecord::new(7));
        assert_eq!(UserRecord::from_row(&row(&["7", "0", "", "", ""])).unwrap(), UserRecord::new(7));
    }

    #[test]
    fn role_holding() {
        let u = UserRecord::from_row(&row(&["7", "1", "Aya Brea", "", " drs ;"])).unwrap();
        assert_eq!(u.roles, vec![s!("drs")]);
        assert!(u.holds_role("drs"));
        assert!(!u.holds_role("dr"));
    }

    #[test]
    fn malformed_rows_are_rejected() {
        for bad in [
            row(&["7", "0", ""]),
            row(&["x", "0", "", ""]),
            row(&["7", "maybe", "", ""]),
            row(&["7", "0", "", "", "", "extra"]),
        ] {
            assert!(matches!(UserRecord::from_row(&bad), Err(StoreError::Malformed(_))));
        }
    }

    #[test]
    fn map_directory() {
        let dir = HashMap::from([(1, UserRecord::new(1))]);
        assert_eq!(dir.lookup(1).unwrap().id, 1);
        assert!(matches!(dir.lookup(2), Err(StoreError::NotFound(2))));
    }
}
