//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test users with sensible defaults.

use crate::{
    core::user::create_user,
    entities::{Role, user},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Password every factory-made test user logs in with.
pub const TEST_PASSWORD: &str = "test-password";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::config::database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test student with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `username` - Unique login name; also used to derive the display name
/// * `group` - Optional group label
///
/// # Defaults
/// * `password`: [`TEST_PASSWORD`]
/// * `grade`: "8"
/// * `church`: None
/// * balances: zero
pub async fn create_test_student(
    db: &DatabaseConnection,
    username: &str,
    group: Option<&str>,
) -> Result<user::Model> {
    create_user(
        db,
        username.to_string(),
        TEST_PASSWORD,
        format!("Student {username}"),
        Role::Student,
        group.map(ToString::to_string),
        Some("8".to_string()),
        None,
    )
    .await
}

/// Creates a test teacher with sensible defaults.
pub async fn create_test_teacher(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    create_user(
        db,
        username.to_string(),
        TEST_PASSWORD,
        format!("Teacher {username}"),
        Role::Teacher,
        None,
        None,
        None,
    )
    .await
}

/// Sets up a complete test environment with one teacher and one student.
/// Returns (db, teacher, student) for common mutation test scenarios.
pub async fn setup_with_teacher_and_student()
-> Result<(DatabaseConnection, user::Model, user::Model)> {
    let db = setup_test_db().await?;
    let teacher = create_test_teacher(&db, "teacher").await?;
    let student = create_test_student(&db, "student", Some("Joshua")).await?;
    Ok((db, teacher, student))
}
