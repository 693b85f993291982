use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::models::question::QuestionWithAnswers;

pub const QUIZ_SIZE: usize = 24;

/// Picks `size` questions from a pool strictly larger than `size`.
pub trait QuestionSampler: Send + Sync {
    fn sample(&self, pool: Vec<QuestionWithAnswers>, size: usize) -> Vec<QuestionWithAnswers>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSampler;

impl QuestionSampler for RandomSampler {
    fn sample(&self, pool: Vec<QuestionWithAnswers>, size: usize) -> Vec<QuestionWithAnswers> {
        let mut rng = thread_rng();
        let mut picked: Vec<QuestionWithAnswers> =
            pool.choose_multiple(&mut rng, size).cloned().collect();
        picked.shuffle(&mut rng);
        picked
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InOrderSampler;

impl QuestionSampler for InOrderSampler {
    fn sample(&self, mut pool: Vec<QuestionWithAnswers>, size: usize) -> Vec<QuestionWithAnswers> {
        pool.truncate(size);
        pool
    }
}

/// Applies the quiz size cap: small pools are returned untouched.
pub fn select_questions(
    sampler: &dyn QuestionSampler,
    pool: Vec<QuestionWithAnswers>,
) -> Vec<QuestionWithAnswers> {
    if pool.len() > QUIZ_SIZE {
        sampler.sample(pool, QUIZ_SIZE)
    } else {
        pool
    }
}
