use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Traffic,
    Signs,
    Safety,
    Porsche,
}

impl QuestionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionCategory::Traffic => "traffic",
            QuestionCategory::Signs => "signs",
            QuestionCategory::Safety => "safety",
            QuestionCategory::Porsche => "porsche",
        }
    }
}

impl Default for QuestionCategory {
    fn default() -> Self {
        QuestionCategory::Traffic
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traffic" => Ok(QuestionCategory::Traffic),
            "signs" => Ok(QuestionCategory::Signs),
            "safety" => Ok(QuestionCategory::Safety),
            "porsche" => Ok(QuestionCategory::Porsche),
            other => Err(format!("unknown question category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub image: Option<String>,
    pub points: i32,
    pub category: QuestionCategory,
}

impl<'r> FromRow<'r, PgRow> for Question {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let category: String = row.try_get("category")?;
        Ok(Self {
            id: row.try_get("id")?,
            text: row.try_get("text")?,
            image: row.try_get("image")?,
            points: row.try_get("points")?,
            category: category.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionWithAnswers {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<Answer>,
}

impl QuestionWithAnswers {
    pub fn answer(&self, answer_id: i64) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == answer_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub text: String,
    pub image: Option<String>,
    pub points: i32,
    pub category: QuestionCategory,
}

#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct NewAnswerChoice {
    pub text: String,
    pub is_correct: bool,
}
