pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::{PgStore, Store};
use crate::services::{
    admin_service::AdminService,
    attempt_service::AttemptService,
    auth_service::AuthService,
    content_service::ContentService,
    quiz_service::QuizService,
    sampler::{QuestionSampler, RandomSampler},
};
use crate::utils::crypto::PasswordService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub quiz_service: QuizService,
    pub attempt_service: AttemptService,
    pub content_service: ContentService,
    pub admin_service: AdminService,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self> {
        Self::from_store(config, Arc::new(PgStore::new(pool)), Arc::new(RandomSampler))
    }

    pub fn from_store<S: Store + 'static>(
        config: Config,
        store: Arc<S>,
        sampler: Arc<dyn QuestionSampler>,
    ) -> Result<Self> {
        let passwords = PasswordService::new(config.argon2_memory_kib, config.argon2_iterations)?;

        let auth_service = AuthService::new(store.clone(), store.clone(), passwords.clone(), &config);
        let quiz_service = QuizService::new(store.clone(), store.clone(), sampler, &config);
        let attempt_service = AttemptService::new(store.clone());
        let content_service = ContentService::new(store.clone(), config.media_root.clone());
        let admin_service =
            AdminService::new(store.clone(), store.clone(), store.clone(), store, passwords);

        Ok(Self {
            config: Arc::new(config),
            auth_service,
            quiz_service,
            attempt_service,
            content_service,
            admin_service,
        })
    }
}
