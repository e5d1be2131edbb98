//! Database entity definitions using SeaORM.
//!
//! Two tables back the whole system: `users` (students, teachers, and the
//! admin, each with a live talent balance) and `transactions` (the append-only
//! ledger every balance change writes through).

pub mod transaction;
pub mod user;

pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel, TransactionKind,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
