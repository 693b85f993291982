pub mod attempt_repository;
pub mod content_repository;
pub mod memory;
pub mod question_repository;
pub mod session_repository;
pub mod user_repository;

pub use attempt_repository::AttemptRepository;
pub use content_repository::ContentRepository;
pub use memory::MemoryStore;
pub use question_repository::QuestionRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;

use sqlx::PgPool;

use crate::error::Error;

pub trait Store:
    UserRepository + SessionRepository + QuestionRepository + AttemptRepository + ContentRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + SessionRepository
        + QuestionRepository
        + AttemptRepository
        + ContentRepository
{
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps unique and foreign key violations to client errors; everything else goes through `From`.
pub(crate) fn constraint_error(err: sqlx::Error, what: &str) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::Conflict(format!("{} already exists", what));
        }
        if db_err.is_foreign_key_violation() {
            return Error::BadRequest(format!("{} references a missing record", what));
        }
    }
    Error::from(err)
}
