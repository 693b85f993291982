use async_trait::async_trait;

use crate::error::Result;
use crate::models::session::Session;
use crate::repositories::PgStore;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert_session(&self, session: Session) -> Result<()>;
    async fn find_session(&self, key: &str) -> Result<Option<Session>>;
    /// Deleting a missing key is not an error.
    async fn delete_session(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl SessionRepository for PgStore {
    async fn insert_session(&self, session: Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (key, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.key)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn find_session(&self, key: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;
        Ok(session)
    }

    async fn delete_session(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE key = $1")
            .bind(key)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
