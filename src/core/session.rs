//! Session persistence - keeps the authenticated identity across restarts.
//!
//! One identity is stored as JSON in a fixed file under the data directory.
//! Loading is self-healing: a file that cannot be read or parsed counts as
//! "no session" and is deleted so the next load starts clean. No expiry is
//! enforced; a session lives until explicit logout or corruption.

use crate::entities::{Role, user};
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Fixed storage key; the session file is `<dir>/talent_session.json`.
const SESSION_KEY: &str = "talent_session";

/// A client-held copy of the authenticated user record, without the credential.
///
/// Created at successful login, read on every view render, destroyed on
/// logout. Balance fields are a snapshot; views re-fetch them after mutations
/// rather than trusting this copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Unique user ID
    pub id: i64,
    /// Unique login name
    pub username: String,
    /// Name shown in every view
    pub display_name: String,
    /// Role driving view selection
    pub role: Role,
    /// Optional group label
    pub group_name: Option<String>,
    /// Optional grade, display only
    pub grade: Option<String>,
    /// Optional church/affiliation, display only
    pub church: Option<String>,
    /// Spendable balance at login time
    pub current_talent: i64,
    /// Lifetime high-water mark at login time
    pub max_talent: i64,
}

impl From<&user::Model> for SessionIdentity {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            group_name: user.group_name.clone(),
            grade: user.grade.clone(),
            church: user.church.clone(),
            current_talent: user.current_talent,
            max_talent: user.max_talent,
        }
    }
}

/// Device-local store holding at most one session under a fixed key.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Creates a store rooted at the given directory. The directory is created
    /// lazily on the first save.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(format!("{SESSION_KEY}.json"))
    }

    /// Persists the identity, replacing any previous session.
    pub fn save(&self, identity: &SessionIdentity) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(identity)?;
        fs::write(self.path(), json)?;
        debug!("Session saved for {}", identity.username);
        Ok(())
    }

    /// Loads the stored identity, if any.
    ///
    /// Any failure to read or deserialize counts as "no session"; a corrupt
    /// file is deleted on the way out so subsequent loads stay clean.
    #[must_use]
    pub fn load(&self) -> Option<SessionIdentity> {
        let contents = match fs::read_to_string(self.path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session file: {e}");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!("Discarding corrupt session file: {e}");
                self.clear();
                None
            }
        }
    }

    /// Removes the stored session. Idempotent: clearing an absent session is
    /// not an error.
    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(self.path()) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove session file: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn temp_store(tag: &str) -> SessionStore {
        let dir = std::env::temp_dir().join(format!("talentbank-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        SessionStore::new(dir)
    }

    fn test_identity() -> SessionIdentity {
        SessionIdentity {
            id: 7,
            username: "hannah".to_string(),
            display_name: "Hannah Park".to_string(),
            role: Role::Student,
            group_name: Some("Joshua".to_string()),
            grade: Some("8".to_string()),
            church: None,
            current_talent: 12,
            max_talent: 30,
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = temp_store("session-round-trip");

        store.save(&test_identity()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, test_identity());
    }

    #[test]
    fn test_load_without_save_returns_none() {
        let store = temp_store("session-missing");
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_session_is_cleared_on_load() {
        let store = temp_store("session-corrupt");

        // Write something that is not a serialized identity
        fs::create_dir_all(&store.dir).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().is_none());
        // The corrupt file was removed, so the next load is also clean
        assert!(!store.path().exists());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_overwrites_previous_session() {
        let store = temp_store("session-overwrite");

        store.save(&test_identity()).unwrap();
        let mut second = test_identity();
        second.username = "mrkim".to_string();
        second.role = Role::Teacher;
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.username, "mrkim");
        assert_eq!(loaded.role, Role::Teacher);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = temp_store("session-clear");

        store.clear();
        store.save(&test_identity()).unwrap();
        store.clear();
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_identity_from_user_model_drops_credential() {
        let user = user::Model {
            id: 3,
            username: "hannah".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            display_name: "Hannah Park".to_string(),
            role: Role::Student,
            group_name: None,
            grade: None,
            church: None,
            current_talent: 5,
            max_talent: 9,
        };

        let identity = SessionIdentity::from(&user);
        assert_eq!(identity.id, 3);
        assert_eq!(identity.current_talent, 5);
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("argon2"));
    }
}
