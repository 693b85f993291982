use std::sync::Arc;

use crate::error::Result;
use crate::models::quiz_attempt::QuizAttempt;
use crate::repositories::AttemptRepository;

pub const RECENT_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptStats {
    pub total_quizzes: usize,
    pub average_score: f64,
    pub best_attempt: Option<QuizAttempt>,
    pub recent_attempts: Vec<QuizAttempt>,
}

impl AttemptStats {
    /// `attempts` must be newest first. The best attempt is the highest score, the most
    /// recent one winning ties.
    pub fn from_attempts(attempts: Vec<QuizAttempt>) -> Self {
        let total_quizzes = attempts.len();
        let average_score = if total_quizzes == 0 {
            0.0
        } else {
            attempts.iter().map(|a| f64::from(a.score)).sum::<f64>() / total_quizzes as f64
        };
        let best_attempt = attempts
            .iter()
            .fold(None::<&QuizAttempt>, |best, a| match best {
                Some(b) if b.score >= a.score => Some(b),
                _ => Some(a),
            })
            .cloned();
        let recent_attempts = attempts.into_iter().take(RECENT_ATTEMPTS).collect();

        Self {
            total_quizzes,
            average_score,
            best_attempt,
            recent_attempts,
        }
    }
}

#[derive(Clone)]
pub struct AttemptService {
    attempts: Arc<dyn AttemptRepository>,
}

impl AttemptService {
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    pub async fn history(&self, user_id: i64) -> Result<Vec<QuizAttempt>> {
        self.attempts.list_attempts_for_user(user_id).await
    }

    pub async fn stats(&self, user_id: i64) -> Result<AttemptStats> {
        Ok(AttemptStats::from_attempts(self.history(user_id).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn attempt(id: i64, score: i32, minutes_ago: i64) -> QuizAttempt {
        QuizAttempt {
            id,
            user_id: 1,
            score,
            total_questions: 24,
            category: "general".into(),
            completed_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn no_attempts_gives_zero_average_and_no_best() {
        let stats = AttemptStats::from_attempts(vec![]);
        assert_eq!(stats.total_quizzes, 0);
        assert_eq!(stats.average_score, 0.0);
        assert!(stats.best_attempt.is_none());
    }

    #[test]
    fn best_attempt_prefers_most_recent_on_ties() {
        let newest_first = vec![attempt(4, 10, 1), attempt(3, 12, 2), attempt(2, 12, 3), attempt(1, 5, 4)];
        let stats = AttemptStats::from_attempts(newest_first);
        assert_eq!(stats.best_attempt.map(|a| a.id), Some(3));
        assert_eq!(stats.average_score, 39.0 / 4.0);
    }

    #[test]
    fn recent_attempts_are_capped() {
        let newest_first: Vec<_> = (0..8).map(|i| attempt(8 - i, 1, i)).collect();
        let stats = AttemptStats::from_attempts(newest_first);
        assert_eq!(stats.total_quizzes, 8);
        assert_eq!(
            stats.recent_attempts.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![8, 7, 6, 5, 4]
        );
    }
}
