//! Database connection and schema setup using `SeaORM`.
//!
//! Provides connection helpers and table creation from the entity definitions.
//! The schema is generated with `Schema::create_table_from_entity`, so the
//! `SQLite` tables always match the Rust struct definitions without manual SQL.

use crate::entities::{Transaction, User};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default `SQLite` path.
///
/// The default uses `mode=rwc` so a fresh checkout creates its database file
/// on first start.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/talentbank.sqlite?mode=rwc".to_string())
}

/// Connects to the given database URL.
///
/// The pool is pinned to a single connection: `SQLite` is a single-writer
/// engine, and one shared connection serializes writers at the pool instead of
/// surfacing busy errors. It also keeps `sqlite::memory:` coherent, where every
/// pooled connection would otherwise see its own empty database. Query logging
/// is disabled; the tracing layer logs at the operation level instead.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.max_connections(1).sqlx_logging(false);

    Database::connect(options).await.map_err(Into::into)
}

/// Connects using the `DATABASE_URL` environment variable, falling back to the
/// default local `SQLite` file.
pub async fn create_connection() -> Result<DatabaseConnection> {
    connect(&get_database_url()).await
}

/// Creates the `users` and `transactions` tables from the entity definitions.
///
/// Statements are built with `IF NOT EXISTS`, so calling this on every startup
/// is safe and acts as the schema bootstrap for fresh databases.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_table = schema.create_table_from_entity(User);
    user_table.if_not_exists();
    let mut transaction_table = schema.create_table_from_entity(Transaction);
    transaction_table.if_not_exists();

    db.execute_raw(builder.build(&user_table)).await?;
    db.execute_raw(builder.build(&transaction_table)).await?;

    Ok(())
}
