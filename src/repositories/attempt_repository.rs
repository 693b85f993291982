use async_trait::async_trait;

use crate::error::Result;
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::repositories::PgStore;

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn insert_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt>;
    /// Newest first; ties broken by id, newest first.
    async fn list_attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>>;
    async fn list_attempts(&self, category: Option<String>) -> Result<Vec<QuizAttempt>>;
    async fn find_attempt(&self, id: i64) -> Result<Option<QuizAttempt>>;
}

#[async_trait]
impl AttemptRepository for PgStore {
    async fn insert_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt> {
        let created = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (user_id, score, total_questions, category, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(&attempt.category)
        .bind(attempt.completed_at)
        .fetch_one(self.pool())
        .await?;
        Ok(created)
    }

    async fn list_attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            "SELECT * FROM quiz_attempts WHERE user_id = $1 ORDER BY completed_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(attempts)
    }

    async fn list_attempts(&self, category: Option<String>) -> Result<Vec<QuizAttempt>> {
        let attempts = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT * FROM quiz_attempts
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY completed_at DESC, id DESC
            "#,
        )
        .bind(category)
        .fetch_all(self.pool())
        .await?;
        Ok(attempts)
    }

    async fn find_attempt(&self, id: i64) -> Result<Option<QuizAttempt>> {
        let attempt = sqlx::query_as::<_, QuizAttempt>("SELECT * FROM quiz_attempts WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(attempt)
    }
}
