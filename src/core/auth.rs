//! Authentication - verifies a username/password pair against stored records.
//!
//! Credentials are stored as argon2id PHC strings and verified with the
//! crate's constant-time comparison. Every failure path collapses to the same
//! `InvalidCredentials` error so the login screen cannot be used to probe
//! which usernames exist.

use crate::{
    core::session::SessionIdentity,
    core::user::get_user_by_username,
    errors::{Error, Result},
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;
use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

/// Hashes a plain-text password into an argon2id PHC string, e.g.
/// `$argon2id$v=19$…`. Used at seed time; never at login.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Credential {
            message: e.to_string(),
        })
}

/// Verifies a submitted username/password pair and yields the session identity.
///
/// Missing user, undecodable stored hash, and failed verification are all
/// reported as `Error::InvalidCredentials` with identical wording. Only
/// storage transport failures surface differently (as `Error::Database`).
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<SessionIdentity> {
    let Some(user) = get_user_by_username(db, username).await? else {
        return Err(Error::InvalidCredentials);
    };

    let parsed_hash =
        PasswordHash::new(&user.password_hash).map_err(|_| Error::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| Error::InvalidCredentials)?;

    info!("Authenticated {} ({:?})", user.username, user.role);
    Ok(SessionIdentity::from(&user))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Role, user};
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, Set};

    #[test]
    fn test_hash_password_produces_phc_string() {
        let hash = hash_password("sunflower").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        // Salted: hashing the same password twice gives different strings
        let again = hash_password("sunflower").unwrap();
        assert_ne!(hash, again);
    }

    #[tokio::test]
    async fn test_authenticate_success() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "hannah", Some("Joshua")).await?;

        let identity = authenticate(&db, "hannah", TEST_PASSWORD).await?;
        assert_eq!(identity.id, student.id);
        assert_eq!(identity.username, "hannah");
        assert_eq!(identity.role, Role::Student);
        assert_eq!(identity.group_name.as_deref(), Some("Joshua"));

        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_indistinguishable() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_student(&db, "hannah", None).await?;

        let wrong_password = authenticate(&db, "hannah", "not-the-password")
            .await
            .unwrap_err();
        let unknown_user = authenticate(&db, "nobody", TEST_PASSWORD)
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_user, Error::InvalidCredentials));
        // Same message, so the UI cannot leak which one happened
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_stored_hash_reports_invalid_credentials() -> Result<()> {
        let db = setup_test_db().await?;

        let user = user::ActiveModel {
            username: Set("broken".to_string()),
            password_hash: Set("not-a-phc-string".to_string()),
            display_name: Set("Broken Hash".to_string()),
            role: Set(Role::Student),
            group_name: Set(None),
            grade: Set(None),
            church: Set(None),
            current_talent: Set(0),
            max_talent: Set(0),
            ..Default::default()
        };
        user.insert(&db).await?;

        let result = authenticate(&db, "broken", "anything").await;
        assert!(matches!(result.unwrap_err(), Error::InvalidCredentials));

        Ok(())
    }
}
