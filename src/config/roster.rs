//! Roster configuration loading from roster.toml.
//!
//! The roster file declares the initial set of users (students, teachers, and
//! the admin) with plain-text passwords. Passwords are hashed at seed time and
//! never stored as written; usernames already present in the database are
//! skipped, so re-seeding from the same file is safe.

use crate::entities::Role;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire roster.toml file
#[derive(Debug, Deserialize)]
pub struct RosterConfig {
    /// List of users to seed
    pub users: Vec<UserSeed>,
}

/// One user declaration from the roster file
#[derive(Debug, Deserialize, Clone)]
pub struct UserSeed {
    /// Unique login name
    pub username: String,
    /// Plain-text password, hashed before it reaches the database
    pub password: String,
    /// Name shown in every view
    pub display_name: String,
    /// Role: "student", "teacher", or "admin"
    pub role: Role,
    /// Optional group label; omit for unassigned
    #[serde(default)]
    pub group: Option<String>,
    /// Optional grade, display only
    #[serde(default)]
    pub grade: Option<String>,
    /// Optional church/affiliation, display only
    #[serde(default)]
    pub church: Option<String>,
}

/// Loads the roster from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<RosterConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read roster file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse roster.toml: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_roster() {
        let toml_str = r#"
            [[users]]
            username = "hannah"
            password = "sunflower"
            display_name = "Hannah Park"
            role = "student"
            group = "Joshua"
            grade = "8"
            church = "Grace Chapel"

            [[users]]
            username = "mrkim"
            password = "shepherd"
            display_name = "Mr. Kim"
            role = "teacher"
        "#;

        let roster: RosterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(roster.users.len(), 2);
        assert_eq!(roster.users[0].username, "hannah");
        assert_eq!(roster.users[0].role, Role::Student);
        assert_eq!(roster.users[0].group.as_deref(), Some("Joshua"));
        assert_eq!(roster.users[0].grade.as_deref(), Some("8"));

        assert_eq!(roster.users[1].role, Role::Teacher);
        assert!(roster.users[1].group.is_none());
        assert!(roster.users[1].church.is_none());
    }

    #[test]
    fn test_parse_roster_rejects_unknown_role() {
        let toml_str = r#"
            [[users]]
            username = "x"
            password = "y"
            display_name = "Z"
            role = "superuser"
        "#;

        let parsed: std::result::Result<RosterConfig, _> = toml::from_str(toml_str);
        assert!(parsed.is_err());
    }
}
