//! Persisted session record and the flat file store behind it.
//!
//! A single JSON file under the state dir holds at most one session. There
//! is no locking and no transactional guarantee; at most one decision
//! procedure runs per invocation and a lost write only costs a re-prompt.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

const SESSION_FILE: &str = "session.json";

/// One remembered identity. Valid iff `now < expires`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub email: String,
    /// Unix seconds when the session was created.
    pub created_at: i64,
    /// Unix seconds past which the record must be treated as absent.
    pub expires: i64,
}

impl StoredSession {
    #[must_use]
    pub fn is_live(&self, now: i64) -> bool {
        now < self.expires
    }
}

/// Current time as unix seconds.
#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join(SESSION_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored record. Missing or malformed files are absence, not
    /// errors.
    #[must_use]
    pub fn load(&self) -> Option<StoredSession> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    /// Read the stored record and purge it when expired.
    ///
    /// Expired records are deleted as a side effect regardless of what the
    /// caller does with the outcome.
    pub fn load_live(&self, now: i64) -> Option<StoredSession> {
        let session = self.load()?;
        if session.is_live(now) {
            Some(session)
        } else {
            debug!(email = %session.email, "stored session expired, purging");
            self.clear();
            None
        }
    }

    /// Persist a new session, replacing any previous record.
    pub fn save(&self, email: &str, now: i64, duration: Duration) -> Result<StoredSession> {
        let ttl = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        let session = StoredSession {
            email: email.to_string(),
            created_at: now,
            expires: now.saturating_add(ttl),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state dir {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(&session).context("failed to encode session record")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write session file {}", self.path.display()))?;
        Ok(session)
    }

    /// Fire-and-forget delete; removing an absent session is a no-op.
    pub fn clear(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                debug!("failed to remove session file {}: {err}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_store() -> SessionStore {
        let dir = std::env::temp_dir().join(format!("pordego-session-test-{}", Uuid::new_v4()));
        SessionStore::new(dir)
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = scratch_store();
        let saved = store.save("admin@yourcompany.com", 1_000, Duration::from_secs(60)).unwrap();
        assert_eq!(saved.created_at, 1_000);
        assert_eq!(saved.expires, 1_060);

        let loaded = store.load().unwrap();
        assert_eq!(loaded, saved);
        store.clear();
    }

    #[test]
    fn load_live_returns_unexpired_session() {
        let store = scratch_store();
        store.save("admin@yourcompany.com", 1_000, Duration::from_secs(60)).unwrap();
        assert!(store.load_live(1_059).is_some());
        store.clear();
    }

    #[test]
    fn expired_session_is_purged_not_returned() {
        let store = scratch_store();
        store.save("admin@yourcompany.com", 1_000, Duration::from_secs(60)).unwrap();

        // expiry boundary is exclusive: expires <= now means dead
        assert!(store.load_live(1_060).is_none());
        assert!(store.load().is_none(), "expired record must be deleted");
        store.clear();
    }

    #[test]
    fn malformed_record_is_treated_as_absent() {
        let store = scratch_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_none());
        assert!(store.load_live(0).is_none());
        store.clear();
    }

    #[test]
    fn missing_file_loads_as_absent_and_clear_is_a_noop() {
        let store = scratch_store();
        assert!(store.load().is_none());
        store.clear();
        store.clear();
    }
}
