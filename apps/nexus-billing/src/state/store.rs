//! # Session File
//!
//! The billing session survives between CLI invocations as a JSON file in
//! the platform data directory.
//!
//! ```json
//! {
//!   "version": 1,
//!   "savedAt": "2026-10-18T09:30:00Z",
//!   "session": { "draft": { … }, "editing": null, "lastBill": null, "notices": { … } }
//! }
//! ```
//!
//! Writes go to a sibling `.tmp` file first and are then renamed over the
//! session file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CommandError, CommandResult};
use crate::state::config::AppConfig;
use crate::state::session::BillingSession;

const SESSION_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionFile {
    version: u32,
    saved_at: DateTime<Utc>,
    session: BillingSession,
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restores the session, or starts a fresh one when there is no file.
    ///
    /// The notice TTL always comes from `config`. A file written by an
    /// unknown version is set aside as `<name>.bak` and a fresh session is
    /// started.
    pub fn load(&self, config: &AppConfig) -> CommandResult<BillingSession> {
        let fresh = || {
            BillingSession::new(config.billing.default_tax_rate, config.notice_ttl())
        };

        if !self.path.exists() {
            debug!(path = ?self.path, "No session file, starting fresh");
            return Ok(fresh());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let file: SessionFile = serde_json::from_str(&contents).map_err(|e| {
            CommandError::internal(format!(
                "Session file {} is unreadable: {}",
                self.path.display(),
                e
            ))
        })?;

        if file.version != SESSION_VERSION {
            let backup = self.path.with_extension("json.bak");
            warn!(
                version = file.version,
                backup = ?backup,
                "Unsupported session file version, starting fresh"
            );
            std::fs::rename(&self.path, &backup)?;
            return Ok(fresh());
        }

        let mut session = file.session;
        session.set_notice_ttl(config.notice_ttl());
        session.prune_notices();

        debug!(
            path = ?self.path,
            saved_at = %file.saved_at,
            lines = session.draft().lines().len(),
            "Session restored"
        );
        Ok(session)
    }

    /// Writes the session.
    pub fn save(&self, session: &BillingSession) -> CommandResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = SessionFile {
            version: SESSION_VERSION,
            saved_at: Utc::now(),
            session: session.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CommandError::internal(format!("Session could not be encoded: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = ?self.path, "Session saved");
        Ok(())
    }

    /// Deletes the session file, if any.
    pub fn reset(&self) -> CommandResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!(path = ?self.path, "Session file removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::brake_pads;
    use nexus_core::{Customer, Percent};

    fn config_with_tax(rate: u32) -> AppConfig {
        let mut config = AppConfig::default();
        config.billing.default_tax_rate = Percent::from_whole(rate);
        config
    }

    #[test]
    fn test_missing_file_gives_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let session = store.load(&config_with_tax(5)).unwrap();
        assert!(session.draft().is_empty());
        assert_eq!(session.draft().tax_rate(), Percent::from_whole(5));
    }

    #[test]
    fn test_session_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("data").join("session.json"));
        let config = AppConfig::default();

        let mut session = store.load(&config).unwrap();
        session.draft_mut().add_item(&brake_pads(4)).unwrap();
        session.draft_mut().add_item(&brake_pads(4)).unwrap();
        session
            .draft_mut()
            .set_customer(Customer::new("Kamal Silva", "0711111111"));
        store.save(&session).unwrap();

        let restored = store.load(&config).unwrap();
        assert_eq!(restored.draft(), session.draft());
        assert_eq!(restored.draft().line("p-brake").unwrap().quantity, 2);
        assert!(!dir.path().join("data").join("session.json.tmp").exists());
    }

    #[test]
    fn test_unknown_version_is_set_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::new(&path);

        store.save(&BillingSession::default()).unwrap();
        let mut raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        raw["version"] = serde_json::json!(99);
        std::fs::write(&path, raw.to_string()).unwrap();

        let session = store.load(&AppConfig::default()).unwrap();
        assert!(session.draft().is_empty());
        assert!(dir.path().join("session.json.bak").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SessionStore::new(&path)
            .load(&AppConfig::default())
            .unwrap_err();
        assert!(err.message.contains("unreadable"));
    }

    #[test]
    fn test_reset_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&BillingSession::default()).unwrap();

        store.reset().unwrap();
        assert!(!store.path().exists());
        store.reset().unwrap();
    }
}
