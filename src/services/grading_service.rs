use std::collections::HashMap;

use crate::models::question::QuestionWithAnswers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedQuiz {
    pub score: i32,
    pub max_score: i32,
    pub total_questions: i32,
}

impl GradedQuiz {
    pub fn percentage(&self) -> f64 {
        if self.max_score > 0 {
            f64::from(self.score) / f64::from(self.max_score) * 100.0
        } else {
            0.0
        }
    }
}

pub struct GradingService;

impl GradingService {
    /// `selections` maps question id to the chosen answer id. A question earns its points
    /// only when the chosen answer belongs to it and is marked correct, however many
    /// correct answers the question carries.
    pub fn grade(questions: &[QuestionWithAnswers], selections: &HashMap<i64, i64>) -> GradedQuiz {
        let mut score = 0;
        let mut max_score = 0;

        for q in questions {
            max_score = i32::saturating_add(max_score, q.question.points);
            let correct = selections
                .get(&q.question.id)
                .and_then(|answer_id| q.answer(*answer_id))
                .is_some_and(|answer| answer.is_correct);
            if correct {
                score = i32::saturating_add(score, q.question.points);
            }
        }

        GradedQuiz {
            score,
            max_score,
            total_questions: questions.len() as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Answer, Question, QuestionCategory};

    fn question(id: i64, points: i32, answers: &[(i64, bool)]) -> QuestionWithAnswers {
        QuestionWithAnswers {
            question: Question {
                id,
                text: format!("Q{}", id),
                image: None,
                points,
                category: QuestionCategory::Traffic,
            },
            answers: answers
                .iter()
                .map(|(answer_id, is_correct)| Answer {
                    id: *answer_id,
                    question_id: id,
                    text: format!("A{}", answer_id),
                    is_correct: *is_correct,
                })
                .collect(),
        }
    }

    #[test]
    fn only_correct_selections_score() {
        let questions = vec![
            question(1, 1, &[(11, true), (12, false)]),
            question(2, 2, &[(21, true), (22, false)]),
            question(3, 3, &[(31, true), (32, false)]),
        ];
        let selections = HashMap::from([(1, 12), (2, 21), (3, 32)]);
        let graded = GradingService::grade(&questions, &selections);
        assert_eq!(graded.score, 2);
        assert_eq!(graded.total_questions, 3);
        assert_eq!(graded.max_score, 6);
    }

    #[test]
    fn oversized_points_saturate_instead_of_wrapping() {
        let questions = vec![
            question(1, i32::MAX, &[(10, true)]),
            question(2, 1, &[(20, true)]),
        ];
        let selections = HashMap::from([(1, 10), (2, 20)]);
        let graded = GradingService::grade(&questions, &selections);
        assert_eq!(graded.score, i32::MAX);
        assert_eq!(graded.max_score, i32::MAX);
        assert_eq!(graded.percentage(), 100.0);
    }

    #[test]
    fn questions_without_or_with_many_correct_answers_do_not_panic() {
        let questions = vec![
            question(1, 2, &[(11, false), (12, false)]),
            question(2, 3, &[(21, true), (22, true)]),
            question(3, 1, &[]),
        ];
        let selections = HashMap::from([(1, 11), (2, 22)]);
        let graded = GradingService::grade(&questions, &selections);
        assert_eq!(graded.score, 3);
        assert_eq!(graded.total_questions, 3);
    }

    #[test]
    fn answers_from_another_question_never_count() {
        let questions = vec![
            question(1, 1, &[(11, false)]),
            question(2, 1, &[(21, true)]),
        ];
        let selections = HashMap::from([(1, 21)]);
        assert_eq!(GradingService::grade(&questions, &selections).score, 0);
    }

    #[test]
    fn percentage_is_relative_to_max_score() {
        let graded = GradedQuiz { score: 3, max_score: 4, total_questions: 2 };
        assert_eq!(graded.percentage(), 75.0);
        let empty = GradedQuiz { score: 0, max_score: 0, total_questions: 0 };
        assert_eq!(empty.percentage(), 0.0);
    }
}
