//! User business logic - lookups, group queries, and roster seeding.
//!
//! Provides functions for creating and retrieving user records and for seeding
//! the database from a roster file. All functions are async and return Result
//! types for error handling.

use crate::{
    config::roster::RosterConfig,
    core::auth,
    entities::{Role, User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Finds a user by their unique username, returning None if not found.
///
/// Username search is exact match; the teacher view's student search and the
/// login flow both resolve names through this function.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by their unique ID, used for balance refreshes after a mutation.
pub async fn get_user_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Lists the students sharing a group label, ordered by display name.
///
/// A group is not a stored entity: it is exactly the set of student records
/// carrying the same label at query time.
pub async fn get_students_in_group(
    db: &DatabaseConnection,
    group_name: &str,
) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(Role::Student))
        .filter(user::Column::GroupName.eq(group_name))
        .order_by_asc(user::Column::DisplayName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists a student's groupmates: same group label, the student excluded,
/// ordered by display name.
pub async fn get_groupmates(
    db: &DatabaseConnection,
    group_name: &str,
    exclude_id: i64,
) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Role.eq(Role::Student))
        .filter(user::Column::GroupName.eq(group_name))
        .filter(user::Column::Id.ne(exclude_id))
        .order_by_asc(user::Column::DisplayName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new user with the specified attributes, performing input validation.
///
/// The plain-text password is hashed before it reaches the database; balances
/// start at zero. Username uniqueness is enforced by the schema.
///
/// # Arguments
/// * `db` - Database connection
/// * `username` - Unique login name
/// * `password` - Plain-text password, hashed on insert
/// * `display_name` - Name shown in every view
/// * `role` - Student, teacher, or admin
/// * `group_name` - Optional group label (students only in practice)
/// * `grade` / `church` - Display-only attributes
#[allow(clippy::too_many_arguments)]
pub async fn create_user(
    db: &DatabaseConnection,
    username: String,
    password: &str,
    display_name: String,
    role: Role,
    group_name: Option<String>,
    grade: Option<String>,
    church: Option<String>,
) -> Result<user::Model> {
    // Validate inputs
    if username.trim().is_empty() {
        return Err(Error::Config {
            message: "Username cannot be empty".to_string(),
        });
    }

    if display_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Display name cannot be empty".to_string(),
        });
    }

    if password.is_empty() {
        return Err(Error::Config {
            message: "Password cannot be empty".to_string(),
        });
    }

    let password_hash = auth::hash_password(password)?;

    let user = user::ActiveModel {
        username: Set(username.trim().to_string()),
        password_hash: Set(password_hash),
        display_name: Set(display_name.trim().to_string()),
        role: Set(role),
        group_name: Set(group_name),
        grade: Set(grade),
        church: Set(church),
        current_talent: Set(0),
        max_talent: Set(0),
        ..Default::default()
    };

    let result = user.insert(db).await?;
    Ok(result)
}

/// Seeds the database from a roster, skipping usernames that already exist.
///
/// Returns the number of users inserted. Safe to run on every startup: an
/// unchanged roster inserts nothing the second time.
#[instrument(skip(db, roster))]
pub async fn seed_roster(db: &DatabaseConnection, roster: &RosterConfig) -> Result<usize> {
    let mut inserted = 0;

    for seed in &roster.users {
        if get_user_by_username(db, &seed.username).await?.is_some() {
            continue;
        }

        create_user(
            db,
            seed.username.clone(),
            &seed.password,
            seed.display_name.clone(),
            seed.role,
            seed.group.clone(),
            seed.grade.clone(),
            seed.church.clone(),
        )
        .await?;
        inserted += 1;
    }

    info!(
        "Roster seeding complete: {} of {} users inserted",
        inserted,
        roster.users.len()
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::roster::UserSeed;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_user_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        // Empty username
        let result = create_user(
            &db,
            String::new(),
            "pw",
            "Name".to_string(),
            Role::Student,
            None,
            None,
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        // Whitespace-only username
        let result = create_user(
            &db,
            "   ".to_string(),
            "pw",
            "Name".to_string(),
            Role::Student,
            None,
            None,
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        // Empty display name
        let result = create_user(
            &db,
            "user".to_string(),
            "pw",
            String::new(),
            Role::Student,
            None,
            None,
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        // Empty password
        let result = create_user(
            &db,
            "user".to_string(),
            "",
            "Name".to_string(),
            Role::Student,
            None,
            None,
            None,
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let student = create_test_student(&db, "hannah", Some("Joshua")).await?;

        assert_eq!(student.username, "hannah");
        assert_eq!(student.role, Role::Student);
        assert_eq!(student.group_name.as_deref(), Some("Joshua"));
        assert_eq!(student.current_talent, 0);
        assert_eq!(student.max_talent, 0);
        // Stored credential is a hash, never the plain password
        assert_ne!(student.password_hash, TEST_PASSWORD);
        assert!(student.password_hash.starts_with("$argon2"));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_user_by_username_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_test_student(&db, "hannah", None).await?;

        let found = get_user_by_username(&db, "hannah").await?;
        assert_eq!(found.unwrap().id, created.id);

        let not_found = get_user_by_username(&db, "nobody").await?;
        assert!(not_found.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_groupmates_excludes_self_and_orders() -> Result<()> {
        let db = setup_test_db().await?;

        // Insert out of alphabetical order to exercise the ordering
        let chloe = create_test_student(&db, "chloe", Some("Joshua")).await?;
        let abby = create_test_student(&db, "abby", Some("Joshua")).await?;
        let _other_group = create_test_student(&db, "zoe", Some("Caleb")).await?;
        let _ungrouped = create_test_student(&db, "solo", None).await?;

        let mates = get_groupmates(&db, "Joshua", chloe.id).await?;
        assert_eq!(mates.len(), 1);
        assert_eq!(mates[0].id, abby.id);

        let mates = get_groupmates(&db, "Joshua", abby.id).await?;
        assert_eq!(mates.len(), 1);
        assert_eq!(mates[0].id, chloe.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_students_in_group_filters_students_only() -> Result<()> {
        let db = setup_test_db().await?;

        let abby = create_test_student(&db, "abby", Some("Joshua")).await?;
        let ben = create_test_student(&db, "ben", Some("Joshua")).await?;
        // A teacher sharing the label must not count as a group member
        create_user(
            &db,
            "mrkim".to_string(),
            TEST_PASSWORD,
            "Mr. Kim".to_string(),
            Role::Teacher,
            Some("Joshua".to_string()),
            None,
            None,
        )
        .await?;

        let members = get_students_in_group(&db, "Joshua").await?;
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, abby.id);
        assert_eq!(members[1].id, ben.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_seed_roster_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        let roster = RosterConfig {
            users: vec![
                UserSeed {
                    username: "hannah".to_string(),
                    password: "sunflower".to_string(),
                    display_name: "Hannah Park".to_string(),
                    role: Role::Student,
                    group: Some("Joshua".to_string()),
                    grade: Some("8".to_string()),
                    church: None,
                },
                UserSeed {
                    username: "mrkim".to_string(),
                    password: "shepherd".to_string(),
                    display_name: "Mr. Kim".to_string(),
                    role: Role::Teacher,
                    group: None,
                    grade: None,
                    church: None,
                },
            ],
        };

        let first = seed_roster(&db, &roster).await?;
        assert_eq!(first, 2);

        let second = seed_roster(&db, &roster).await?;
        assert_eq!(second, 0);

        let all_users = User::find().all(&db).await?;
        assert_eq!(all_users.len(), 2);

        Ok(())
    }
}
