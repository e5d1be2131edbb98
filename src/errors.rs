//! Unified error types for `TalentBank`.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation errors are
//! raised before any storage call; transactional rejections come back from the
//! atomic primitive with balances untouched; transport-level failures wrap the
//! underlying driver error and are shown to users as a generic message via
//! [`Error::user_message`].

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problem (missing file, bad TOML, bad roster entry).
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong
        message: String,
    },

    /// A talent amount failed validation (zero, negative, or out of range).
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// A transaction was submitted without a reason.
    #[error("A reason is required for every transaction")]
    EmptyReason,

    /// No student matched the given lookup key.
    #[error("Student '{name}' not found")]
    StudentNotFound {
        /// Username or id the caller searched for
        name: String,
    },

    /// A deduction would push the student's balance below zero.
    #[error("{student} has {current} talents, cannot take {requested}")]
    InsufficientTalent {
        /// Display name of the student
        student: String,
        /// Balance at the time of the attempt
        current: i64,
        /// Amount the caller tried to deduct
        requested: i64,
    },

    /// A group grant too small to give each member at least one talent.
    #[error("{total} talents split across {members} students leaves nothing to give")]
    EmptySplit {
        /// The lump sum submitted
        total: i64,
        /// Number of members it would be split across
        members: usize,
    },

    /// Username/password pair did not match any account.
    ///
    /// Deliberately identical for "no such user" and "wrong password" so the
    /// login screen cannot be used to enumerate usernames.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Password hashing failed (salt generation or malformed parameters).
    #[error("Credential hashing error: {message}")]
    Credential {
        /// Description from the hashing backend
        message: String,
    },

    /// Database error from the storage layer.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Session file (de)serialization error.
    #[error("Session serialization error: {0}")]
    SessionCodec(#[from] serde_json::Error),

    /// I/O error (session file, log file, config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The message shown to the person at the keyboard.
    ///
    /// Transport-level failures must not leak driver internals into the UI, so
    /// they collapse to a generic line; everything else is already worded for
    /// the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Io(_) | Self::SessionCodec(_) => {
                "An error occurred. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convenience `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
