//! # User Repository
//!
//! Database operations for users. Registration (user + customer together)
//! lives in [`AccountService`](crate::AccountService).

use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::DbResult;
use vidly_core::User;

pub(crate) async fn insert<'e, E>(executor: E, user: &User) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, is_admin)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.is_admin)
    .execute(executor)
    .await?;

    Ok(())
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Gets a user by email. Emails are stored lowercased.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, is_admin FROM users WHERE email = ?1",
        )
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Inserts a user without a customer record (admin accounts, fixtures).
    pub async fn insert(&self, user: &User) -> DbResult<User> {
        insert(&self.pool, user).await?;
        Ok(user.clone())
    }

    /// Counts users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use vidly_core::new_id;

    fn user(email: &str) -> User {
        User {
            id: new_id(),
            name: "client1".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let u = db.users().insert(&user("client1@gmail.com")).await.unwrap();

        assert_eq!(db.users().get_by_id(&u.id).await.unwrap(), Some(u.clone()));
        assert_eq!(
            db.users().get_by_email("CLIENT1@gmail.com").await.unwrap(),
            Some(u)
        );
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().insert(&user("client1@gmail.com")).await.unwrap();

        let err = db.users().insert(&user("client1@gmail.com")).await.unwrap_err();
        assert!(err.is_unique_violation_on("users.email"));
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
