//! User entity - Every account in the system: students, teachers, and admins.
//!
//! A user carries two balances: `current_talent` (spendable, may be debited) and
//! `max_talent` (all-time high-water mark, never lowered, drives the level display).
//! Group membership is just a shared label; students without one are valid.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role. A closed set - view dispatch matches on this enum rather than
/// comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Camp participant; sees their own balance, level, and groupmates
    #[sea_orm(string_value = "student")]
    Student,
    /// Staff member; may grant and deduct talents
    #[sea_orm(string_value = "teacher")]
    Teacher,
    /// Reserved for the separate admin application; inert in this client
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across the camp
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2id PHC hash of the account password
    #[serde(skip)]
    pub password_hash: String,
    /// Name shown in every view and ledger line
    pub display_name: String,
    /// Account role (student, teacher, admin)
    pub role: Role,
    /// Group label; `None` means the student is unassigned
    pub group_name: Option<String>,
    /// School grade, display only
    pub grade: Option<String>,
    /// Church/affiliation, display only
    pub church: Option<String>,
    /// Spendable talent balance; never allowed below zero
    pub current_talent: i64,
    /// All-time highest `current_talent`; monotone non-decreasing
    pub max_talent: i64,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user (as student) has many ledger entries
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
