use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::content::{Course, Difficulty, Group, Meme, NewCourse, NewMeme};
use crate::repositories::{constraint_error, PgStore};

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn list_courses(&self, difficulty: Option<Difficulty>) -> Result<Vec<Course>>;
    async fn find_course(&self, id: i64) -> Result<Option<Course>>;
    async fn insert_course(&self, course: NewCourse) -> Result<Course>;
    async fn update_course(&self, course: Course) -> Result<Course>;
    async fn delete_course(&self, id: i64) -> Result<()>;

    async fn list_memes(&self, limit: Option<i64>) -> Result<Vec<Meme>>;
    async fn find_meme(&self, id: i64) -> Result<Option<Meme>>;
    async fn insert_meme(&self, meme: NewMeme) -> Result<Meme>;
    async fn update_meme(&self, meme: Meme) -> Result<Meme>;
    async fn delete_meme(&self, id: i64) -> Result<()>;

    async fn list_groups(&self) -> Result<Vec<Group>>;
    async fn find_group(&self, id: i64) -> Result<Option<Group>>;
    async fn insert_group(&self, name: String) -> Result<Group>;
    async fn update_group(&self, group: Group) -> Result<Group>;
    async fn delete_group(&self, id: i64) -> Result<()>;
}

async fn delete_by_id(store: &PgStore, sql: &str, id: i64, what: &str) -> Result<()> {
    let result = sqlx::query(sql).bind(id).execute(store.pool()).await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("{} {} not found", what, id)));
    }
    Ok(())
}

#[async_trait]
impl ContentRepository for PgStore {
    async fn list_courses(&self, difficulty: Option<Difficulty>) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT * FROM courses
            WHERE ($1::text IS NULL OR difficulty = $1)
            ORDER BY display_order, created_at, id
            "#,
        )
        .bind(difficulty.map(|d| d.as_str()))
        .fetch_all(self.pool())
        .await?;
        Ok(courses)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(course)
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course> {
        let created = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (title, content, image, pdf_file, display_order, difficulty)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&course.title)
        .bind(&course.content)
        .bind(&course.image)
        .bind(&course.pdf_file)
        .bind(course.display_order)
        .bind(course.difficulty.as_str())
        .fetch_one(self.pool())
        .await?;
        Ok(created)
    }

    async fn update_course(&self, course: Course) -> Result<Course> {
        let updated = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET title = $2, content = $3, image = $4, pdf_file = $5,
                display_order = $6, difficulty = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.content)
        .bind(&course.image)
        .bind(&course.pdf_file)
        .bind(course.display_order)
        .bind(course.difficulty.as_str())
        .fetch_one(self.pool())
        .await?;
        Ok(updated)
    }

    async fn delete_course(&self, id: i64) -> Result<()> {
        delete_by_id(self, "DELETE FROM courses WHERE id = $1", id, "Course").await
    }

    async fn list_memes(&self, limit: Option<i64>) -> Result<Vec<Meme>> {
        let memes = sqlx::query_as::<_, Meme>(
            "SELECT * FROM memes ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(memes)
    }

    async fn find_meme(&self, id: i64) -> Result<Option<Meme>> {
        let meme = sqlx::query_as::<_, Meme>("SELECT * FROM memes WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(meme)
    }

    async fn insert_meme(&self, meme: NewMeme) -> Result<Meme> {
        let created = sqlx::query_as::<_, Meme>(
            "INSERT INTO memes (title, image) VALUES ($1, $2) RETURNING *",
        )
        .bind(&meme.title)
        .bind(&meme.image)
        .fetch_one(self.pool())
        .await?;
        Ok(created)
    }

    async fn update_meme(&self, meme: Meme) -> Result<Meme> {
        let updated = sqlx::query_as::<_, Meme>(
            "UPDATE memes SET title = $2, image = $3 WHERE id = $1 RETURNING *",
        )
        .bind(meme.id)
        .bind(&meme.title)
        .bind(&meme.image)
        .fetch_one(self.pool())
        .await?;
        Ok(updated)
    }

    async fn delete_meme(&self, id: i64) -> Result<()> {
        delete_by_id(self, "DELETE FROM memes WHERE id = $1", id, "Meme").await
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY name")
            .fetch_all(self.pool())
            .await?;
        Ok(groups)
    }

    async fn find_group(&self, id: i64) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(group)
    }

    async fn insert_group(&self, name: String) -> Result<Group> {
        sqlx::query_as::<_, Group>("INSERT INTO groups (name) VALUES ($1) RETURNING *")
            .bind(&name)
            .fetch_one(self.pool())
            .await
            .map_err(|e| constraint_error(e, "A group with that name"))
    }

    async fn update_group(&self, group: Group) -> Result<Group> {
        sqlx::query_as::<_, Group>("UPDATE groups SET name = $2 WHERE id = $1 RETURNING *")
            .bind(group.id)
            .bind(&group.name)
            .fetch_one(self.pool())
            .await
            .map_err(|e| constraint_error(e, "A group with that name"))
    }

    async fn delete_group(&self, id: i64) -> Result<()> {
        delete_by_id(self, "DELETE FROM groups WHERE id = $1", id, "Group").await
    }
}
