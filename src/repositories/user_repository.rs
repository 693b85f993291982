use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::user::{NewUser, User};
use crate::repositories::{constraint_error, PgStore};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Case-insensitive; the oldest account wins when several share an address.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn update_user(&self, user: User) -> Result<User>;
    async fn delete_user(&self, id: i64) -> Result<()>;
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1) ORDER BY id LIMIT 1",
        )
        .bind(email.trim())
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                username, email, password_hash, first_name, last_name,
                is_staff, is_superuser, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.is_active)
        .fetch_one(self.pool())
        .await
        .map_err(|e| constraint_error(e, "A user with that username"))
    }

    async fn update_user(&self, user: User) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, first_name = $5,
                last_name = $6, is_staff = $7, is_superuser = $8, is_active = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.is_active)
        .fetch_one(self.pool())
        .await
        .map_err(|e| constraint_error(e, "A user with that username"))
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
