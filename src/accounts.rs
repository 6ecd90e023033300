use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::Utc;
use rand_core::OsRng;
use sqlx::SqliteConnection;
use thiserror::Error;

pub const INVALID_USERNAME: &str = "Invalid username!";
pub const INVALID_PASSWORD: &str = "Invalid password!";

#[derive(Debug, Error)]
pub enum AccountsError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("account store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Result of checking a username/password pair against the accounts table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginVerdict {
    Accepted,
    Rejected { message: &'static str },
}

#[derive(sqlx::FromRow)]
struct StoredAccount {
    password_hash: String,
}

pub async fn verify_login(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> Result<LoginVerdict, AccountsError> {
    let account = sqlx::query_as::<_, StoredAccount>(
        "SELECT password_hash FROM accounts WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(account) = account else {
        return Ok(LoginVerdict::Rejected {
            message: INVALID_USERNAME,
        });
    };

    if verify_password(password, &account.password_hash) {
        Ok(LoginVerdict::Accepted)
    } else {
        Ok(LoginVerdict::Rejected {
            message: INVALID_PASSWORD,
        })
    }
}

pub async fn add_account(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
) -> Result<(), AccountsError> {
    let password_hash = hash_password(password).map_err(AccountsError::Hash)?;

    let result =
        sqlx::query("INSERT INTO accounts (username, password_hash, created_at) VALUES (?, ?, ?)")
            .bind(username)
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(AccountsError::DuplicateUsername)
        }
        Err(err) => Err(AccountsError::Store(err)),
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed = PasswordHash::new(password_hash);
    match parsed {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::db::open_test_connection;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let first = hash_password("pass").unwrap();
        let second = hash_password("pass").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("pass", &first));
        assert!(!verify_password("nope", &first));
        assert!(!verify_password("pass", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn registered_account_can_log_in() {
        let (_dir, mut conn) = open_test_connection().await;
        add_account(&mut conn, "ab", "pass").await.unwrap();

        let verdict = verify_login(&mut conn, "ab", "pass").await.unwrap();
        assert_eq!(verdict, LoginVerdict::Accepted);
    }

    #[tokio::test]
    async fn wrong_credentials_are_rejected_with_message() {
        let (_dir, mut conn) = open_test_connection().await;
        add_account(&mut conn, "ab", "pass").await.unwrap();

        let verdict = verify_login(&mut conn, "ab", "wrong").await.unwrap();
        assert_eq!(
            verdict,
            LoginVerdict::Rejected {
                message: INVALID_PASSWORD
            }
        );

        let verdict = verify_login(&mut conn, "zz", "pass").await.unwrap();
        assert_eq!(
            verdict,
            LoginVerdict::Rejected {
                message: INVALID_USERNAME
            }
        );
    }

    #[tokio::test]
    async fn duplicate_username_is_a_distinct_error() {
        let (_dir, mut conn) = open_test_connection().await;
        add_account(&mut conn, "ab", "pass").await.unwrap();

        let err = add_account(&mut conn, "ab", "other").await.unwrap_err();
        assert!(matches!(err, AccountsError::DuplicateUsername));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(count, 1);

        // Original credentials still work.
        assert_eq!(
            verify_login(&mut conn, "ab", "pass").await.unwrap(),
            LoginVerdict::Accepted
        );
    }
}
