use crate::auth::repo_types::{NewUser, User};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, username, password_hash, full_name, age, gender, \
                            height_cm, weight_kg, is_active, created_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(db: &PgPool, new: &NewUser<'_>) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, password_hash, full_name, age, gender, height_cm, weight_kg)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.email)
        .bind(new.username)
        .bind(new.password_hash)
        .bind(new.full_name)
        .bind(new.age)
        .bind(new.gender)
        .bind(new.height_cm)
        .bind(new.weight_kg)
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}

/// True when `err` wraps a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    #[derive(Debug)]
    struct FakeDbError(ErrorKind);

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("duplicate key value violates unique constraint \"users_email_key\"")
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("23505"))
        }
        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }
        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }
        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }
        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    #[test]
    fn unique_violation_is_detected_through_anyhow() {
        let err = anyhow::Error::from(sqlx::Error::Database(Box::new(FakeDbError(
            ErrorKind::UniqueViolation,
        ))));
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn other_errors_are_not_unique_violations() {
        let err = anyhow::Error::from(sqlx::Error::Database(Box::new(FakeDbError(
            ErrorKind::Other,
        ))));
        assert!(!is_unique_violation(&err));
        assert!(!is_unique_violation(&anyhow::anyhow!("pool timed out")));
        assert!(!is_unique_violation(&anyhow::Error::from(sqlx::Error::RowNotFound)));
    }
}
