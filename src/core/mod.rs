/// Username/password verification and password hashing
pub mod auth;

/// Level calculation from the lifetime talent total
pub mod level;

/// Device-local session persistence
pub mod session;

/// Balance mutations, the ledger, and balance/history queries
pub mod talent;

/// User lookups, group queries, and roster seeding
pub mod user;
