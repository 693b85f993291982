use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub pdf_file: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "order")]
    pub display_order: i32,
    pub difficulty: Difficulty,
}

impl Course {
    pub fn has_pdf(&self) -> bool {
        self.pdf_file.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

impl<'r> FromRow<'r, PgRow> for Course {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let difficulty: String = row.try_get("difficulty")?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            image: row.try_get("image")?,
            pdf_file: row.try_get("pdf_file")?,
            created_at: row.try_get("created_at")?,
            display_order: row.try_get("display_order")?,
            difficulty: difficulty.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub pdf_file: Option<String>,
    pub display_order: i32,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Meme {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMeme {
    pub title: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}
