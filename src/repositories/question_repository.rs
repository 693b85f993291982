use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::question::{
    Answer, NewAnswer, NewAnswerChoice, NewQuestion, Question, QuestionCategory,
    QuestionWithAnswers,
};
use crate::repositories::{constraint_error, PgStore};

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn list_questions(&self, category: Option<QuestionCategory>) -> Result<Vec<Question>>;
    async fn list_questions_with_answers(&self) -> Result<Vec<QuestionWithAnswers>>;
    /// Ids that no longer exist are skipped.
    async fn find_questions_with_answers(&self, ids: &[i64]) -> Result<Vec<QuestionWithAnswers>>;
    async fn find_question(&self, id: i64) -> Result<Option<Question>>;
    async fn insert_question(&self, question: NewQuestion) -> Result<Question>;
    /// All or nothing: a failed answer leaves no question behind.
    async fn insert_question_with_answers(
        &self,
        question: NewQuestion,
        answers: Vec<NewAnswerChoice>,
    ) -> Result<QuestionWithAnswers>;
    async fn update_question(&self, question: Question) -> Result<Question>;
    async fn delete_question(&self, id: i64) -> Result<()>;

    async fn list_answers(&self, question_id: Option<i64>) -> Result<Vec<Answer>>;
    async fn find_answer(&self, id: i64) -> Result<Option<Answer>>;
    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer>;
    async fn update_answer(&self, answer: Answer) -> Result<Answer>;
    async fn delete_answer(&self, id: i64) -> Result<()>;
}

pub(crate) fn attach_answers(
    questions: Vec<Question>,
    answers: Vec<Answer>,
) -> Vec<QuestionWithAnswers> {
    let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
    for answer in answers {
        by_question.entry(answer.question_id).or_default().push(answer);
    }
    questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            QuestionWithAnswers { question, answers }
        })
        .collect()
}

#[async_trait]
impl QuestionRepository for PgStore {
    async fn list_questions(&self, category: Option<QuestionCategory>) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE ($1::text IS NULL OR category = $1) ORDER BY id",
        )
        .bind(category.map(|c| c.as_str()))
        .fetch_all(self.pool())
        .await?;
        Ok(questions)
    }

    async fn list_questions_with_answers(&self) -> Result<Vec<QuestionWithAnswers>> {
        let questions = sqlx::query_as::<_, Question>("SELECT * FROM questions ORDER BY id")
            .fetch_all(self.pool())
            .await?;
        let answers = sqlx::query_as::<_, Answer>("SELECT * FROM answers ORDER BY id")
            .fetch_all(self.pool())
            .await?;
        Ok(attach_answers(questions, answers))
    }

    async fn find_questions_with_answers(&self, ids: &[i64]) -> Result<Vec<QuestionWithAnswers>> {
        let questions =
            sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = ANY($1) ORDER BY id")
                .bind(ids)
                .fetch_all(self.pool())
                .await?;
        let answers = sqlx::query_as::<_, Answer>(
            "SELECT * FROM answers WHERE question_id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await?;
        Ok(attach_answers(questions, answers))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(question)
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<Question> {
        let created = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (text, image, points, category)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&question.text)
        .bind(&question.image)
        .bind(question.points)
        .bind(question.category.as_str())
        .fetch_one(self.pool())
        .await?;
        Ok(created)
    }

    async fn insert_question_with_answers(
        &self,
        question: NewQuestion,
        answers: Vec<NewAnswerChoice>,
    ) -> Result<QuestionWithAnswers> {
        let mut tx = self.pool().begin().await?;
        let created = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (text, image, points, category)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&question.text)
        .bind(&question.image)
        .bind(question.points)
        .bind(question.category.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let mut inserted = Vec::with_capacity(answers.len());
        for answer in answers {
            let row = sqlx::query_as::<_, Answer>(
                "INSERT INTO answers (question_id, text, is_correct) VALUES ($1, $2, $3) RETURNING *",
            )
            .bind(created.id)
            .bind(&answer.text)
            .bind(answer.is_correct)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| constraint_error(e, "Answer"))?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(QuestionWithAnswers { question: created, answers: inserted })
    }

    async fn update_question(&self, question: Question) -> Result<Question> {
        let updated = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions SET text = $2, image = $3, points = $4, category = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(question.id)
        .bind(&question.text)
        .bind(&question.image)
        .bind(question.points)
        .bind(question.category.as_str())
        .fetch_one(self.pool())
        .await?;
        Ok(updated)
    }

    async fn delete_question(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Question {} not found", id)));
        }
        Ok(())
    }

    async fn list_answers(&self, question_id: Option<i64>) -> Result<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            "SELECT * FROM answers WHERE ($1::bigint IS NULL OR question_id = $1) ORDER BY id",
        )
        .bind(question_id)
        .fetch_all(self.pool())
        .await?;
        Ok(answers)
    }

    async fn find_answer(&self, id: i64) -> Result<Option<Answer>> {
        let answer = sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(answer)
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer> {
        sqlx::query_as::<_, Answer>(
            "INSERT INTO answers (question_id, text, is_correct) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(answer.question_id)
        .bind(&answer.text)
        .bind(answer.is_correct)
        .fetch_one(self.pool())
        .await
        .map_err(|e| constraint_error(e, "Answer"))
    }

    async fn update_answer(&self, answer: Answer) -> Result<Answer> {
        sqlx::query_as::<_, Answer>(
            r#"
            UPDATE answers SET question_id = $2, text = $3, is_correct = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(answer.id)
        .bind(answer.question_id)
        .bind(&answer.text)
        .bind(answer.is_correct)
        .fetch_one(self.pool())
        .await
        .map_err(|e| constraint_error(e, "Answer"))
    }

    async fn delete_answer(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Answer {} not found", id)));
        }
        Ok(())
    }
}
