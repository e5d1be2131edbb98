/// Database configuration and connection management
pub mod database;

/// Roster loading from roster.toml for initial user seeding
pub mod roster;
