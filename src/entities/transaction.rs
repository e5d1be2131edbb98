//! Transaction entity - The append-only talent ledger.
//!
//! Every balance change writes exactly one row here with the same signed amount
//! that was applied to the student's `current_talent`. Rows are never edited or
//! deleted by this application.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What produced a ledger entry. Closed set stored as a string column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// A teacher granted talents to one student
    #[sea_orm(string_value = "individual_give")]
    IndividualGive,
    /// A teacher deducted talents from one student
    #[sea_orm(string_value = "individual_take")]
    IndividualTake,
    /// One member's share of a lump sum split across a group
    #[sea_orm(string_value = "group_give")]
    GroupGive,
}

impl TransactionKind {
    /// Short label for ledger listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::IndividualGive => "give",
            Self::IndividualTake => "take",
            Self::GroupGive => "group",
        }
    }
}

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student whose balance changed
    pub student_id: i64,
    /// Teacher (actor) who performed the grant or deduction
    pub teacher_id: i64,
    /// Signed amount: positive = grant, negative = deduction
    pub amount: i64,
    /// Free-text reason; required non-empty
    pub reason: String,
    /// What kind of operation produced this entry
    pub kind: TransactionKind,
    /// When the entry was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The student this entry belongs to
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
    /// The teacher who wrote this entry
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TeacherId",
        to = "super::user::Column::Id"
    )]
    Teacher,
}

/// History listings join each entry to its student's display fields, so the
/// student relation is the default join target.
impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
