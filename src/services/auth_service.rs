use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::dto::auth_dto::{AdminLoginResponse, RegisterForm};
use crate::error::{Error, Result};
use crate::models::role::Role;
use crate::models::session::Session;
use crate::models::user::{NewUser, User, UserSummary};
use crate::repositories::{SessionRepository, UserRepository};
use crate::services::access_gate::login_refusal;
use crate::utils::crypto::PasswordService;
use crate::utils::jwt::JwtKeys;
use crate::utils::time::{hours_from_now, now, unix_seconds};
use crate::utils::token::generate_session_key;
use crate::utils::validation::FormErrors;

pub const INVALID_CREDENTIALS: &str = "Please enter a correct username and password.";
pub const ADMIN_TOKEN_TYPE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub typ: String,
    pub exp: usize,
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success { user: User, session: Session },
    Refused(&'static str),
    InvalidCredentials,
}

#[derive(Debug)]
pub enum Registration {
    Registered { user: User, session: Session },
    Invalid(FormErrors),
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    passwords: PasswordService,
    jwt: JwtKeys,
    session_ttl_hours: i64,
    admin_token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        passwords: PasswordService,
        config: &Config,
    ) -> Self {
        Self {
            users,
            sessions,
            passwords,
            jwt: JwtKeys::new(&config.jwt_secret),
            session_ttl_hours: config.session_ttl_hours,
            admin_token_ttl_hours: config.admin_token_ttl_hours,
        }
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl_hours * 3600
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<Registration> {
        let mut errors = form.check();
        if !errors.has("username")
            && self
                .users
                .find_user_by_username(form.username.trim())
                .await?
                .is_some()
        {
            errors.add("username", "A user with that username already exists.");
        }
        if !errors.is_empty() {
            return Ok(Registration::Invalid(errors));
        }

        let new_user = NewUser {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password_hash: self.passwords.hash_password(&form.password1)?,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            is_staff: false,
            is_superuser: false,
            is_active: true,
        };
        let user = match self.users.insert_user(new_user).await {
            Ok(user) => user,
            Err(Error::Conflict(_)) => {
                let mut errors = FormErrors::default();
                errors.add("username", "A user with that username already exists.");
                return Ok(Registration::Invalid(errors));
            }
            Err(e) => return Err(e),
        };
        tracing::info!(user_id = user.id, username = %user.username, "account registered");

        let session = self.start_session(&user).await?;
        Ok(Registration::Registered { user, session })
    }

    /// Front-end login. Privileged accounts are refused both before and after the password check.
    pub async fn login(&self, login: &str, password: &str) -> Result<LoginOutcome> {
        if let Some(message) = self.pre_check(login).await {
            tracing::info!(login = %login.trim(), "front-end login refused before password check");
            return Ok(LoginOutcome::Refused(message));
        }

        let Some(user) = self.authenticate(login, password).await? else {
            return Ok(LoginOutcome::InvalidCredentials);
        };

        if let Some(message) = login_refusal(user.role()) {
            tracing::warn!(
                user_id = user.id,
                role = user.role().as_str(),
                "front-end login refused after password check"
            );
            return Ok(LoginOutcome::Refused(message));
        }

        let session = self.start_session(&user).await?;
        tracing::info!(user_id = user.id, "front-end login");
        Ok(LoginOutcome::Success { user, session })
    }

    /// Store failures here are logged and ignored; the credential check still runs.
    async fn pre_check(&self, login: &str) -> Option<&'static str> {
        match self.lookup(login).await {
            Ok(Some(user)) => login_refusal(user.role()),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "login pre-check lookup failed, continuing");
                None
            }
        }
    }

    async fn lookup(&self, login: &str) -> Result<Option<User>> {
        let login = login.trim();
        if login.is_empty() {
            return Ok(None);
        }
        if let Some(user) = self.users.find_user_by_username(login).await? {
            return Ok(Some(user));
        }
        self.users.find_user_by_email(login).await
    }

    pub async fn authenticate(&self, login: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.lookup(login).await? else {
            return Ok(None);
        };
        if !user.is_active || !self.passwords.verify_password(password, &user.password_hash) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    pub async fn start_session(&self, user: &User) -> Result<Session> {
        let session = Session {
            key: generate_session_key(),
            user_id: user.id,
            created_at: now(),
            expires_at: hours_from_now(self.session_ttl_hours),
        };
        self.sessions.insert_session(session.clone()).await?;
        Ok(session)
    }

    /// Expired sessions are removed; inactive or deleted accounts read as anonymous.
    pub async fn session_user(&self, key: &str) -> Result<Option<User>> {
        let Some(session) = self.sessions.find_session(key).await? else {
            return Ok(None);
        };
        if session.is_expired(now()) {
            self.sessions.delete_session(key).await?;
            return Ok(None);
        }
        let user = self.users.find_user(session.user_id).await?;
        Ok(user.filter(|u| u.is_active))
    }

    pub async fn end_session(&self, key: &str) -> Result<()> {
        self.sessions.delete_session(key).await
    }

    pub async fn admin_login(&self, username: &str, password: &str) -> Result<AdminLoginResponse> {
        let Some(user) = self.authenticate(username, password).await? else {
            return Err(Error::Unauthorized(
                "Please enter the correct username and password for a staff account.".into(),
            ));
        };
        let role = user.role();
        if !role.is_privileged() {
            tracing::info!(user_id = user.id, "administration login refused for normal account");
            return Err(Error::Forbidden(
                "This account cannot access the administration panel.".into(),
            ));
        }

        let expires_at = now() + Duration::hours(self.admin_token_ttl_hours);
        let claims = Claims {
            sub: user.id.to_string(),
            typ: ADMIN_TOKEN_TYPE.to_string(),
            exp: unix_seconds(expires_at),
        };
        let token = self.jwt.sign(&claims)?;
        tracing::info!(user_id = user.id, role = role.as_str(), "administration login");

        Ok(AdminLoginResponse {
            token,
            token_type: "Bearer",
            expires_at,
            user: UserSummary::from(&user),
            role,
        })
    }

    pub async fn admin_user(&self, token: &str) -> Result<(User, Role)> {
        let claims: Claims = self.jwt.verify(token)?;
        if claims.typ != ADMIN_TOKEN_TYPE {
            return Err(Error::Unauthorized("invalid_token".into()));
        }
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| Error::Unauthorized("invalid_token".into()))?;
        let user = self
            .users
            .find_user(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| Error::Unauthorized("invalid_token".into()))?;
        let role = user.role();
        if !role.is_privileged() {
            return Err(Error::Forbidden(
                "This account cannot access the administration panel.".into(),
            ));
        }
        Ok((user, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use crate::repositories::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn seeded(store: &MemoryStore, passwords: &PasswordService, email: &str, staff: bool) -> User {
        store
            .insert_user(NewUser {
                username: "driver".into(),
                email: email.into(),
                password_hash: passwords.hash_password("correct-horse").unwrap(),
                first_name: "Dana".into(),
                last_name: "Ion".into(),
                is_staff: staff,
                is_superuser: false,
                is_active: true,
            })
            .await
            .unwrap()
    }

    fn flaky_users(user: User) -> MockUserRepository {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut mock = MockUserRepository::new();
        mock.expect_find_user_by_username().returning(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::Internal("connection reset".into()))
            } else {
                Ok(Some(user.clone()))
            }
        });
        mock.expect_find_user_by_email().returning(|_| Ok(None));
        mock
    }

    #[tokio::test]
    async fn pre_check_failure_falls_through_to_credential_check() {
        let config = Config::for_tests();
        let passwords = PasswordService::new(1024, 1).unwrap();
        let store = Arc::new(MemoryStore::new());
        let user = seeded(&store, &passwords, "dana@site.com", false).await;

        let service = AuthService::new(Arc::new(flaky_users(user)), store, passwords, &config);
        let outcome = service.login("driver", "correct-horse").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Success { .. }));
    }

    #[tokio::test]
    async fn post_check_still_refuses_when_pre_check_failed() {
        let config = Config::for_tests();
        let passwords = PasswordService::new(1024, 1).unwrap();
        let store = Arc::new(MemoryStore::new());
        let user = seeded(&store, &passwords, "dana@instructor.com", true).await;

        let service = AuthService::new(Arc::new(flaky_users(user)), store.clone(), passwords, &config);
        let outcome = service.login("driver", "correct-horse").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Refused(msg) if msg.contains("Instructor")));
    }

    #[tokio::test]
    async fn pre_check_refuses_without_verifying_the_password() {
        let config = Config::for_tests();
        let passwords = PasswordService::new(1024, 1).unwrap();
        let store = Arc::new(MemoryStore::new());
        seeded(&store, &passwords, "dana@instructor.com", true).await;

        let service = AuthService::new(store.clone(), store, passwords, &config);
        let outcome = service.login("driver", "wrong password").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Refused(_)));
    }

    #[tokio::test]
    async fn email_is_accepted_in_place_of_username() {
        let config = Config::for_tests();
        let passwords = PasswordService::new(1024, 1).unwrap();
        let store = Arc::new(MemoryStore::new());
        seeded(&store, &passwords, "dana@site.com", false).await;

        let service = AuthService::new(store.clone(), store, passwords, &config);
        let outcome = service.login("DANA@site.com", "correct-horse").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::Success { .. }));
        let outcome = service.login("dana@site.com", "nope").await.unwrap();
        assert!(matches!(outcome, LoginOutcome::InvalidCredentials));
    }

    #[tokio::test]
    async fn admin_token_does_not_outlive_privilege() {
        let config = Config::for_tests();
        let passwords = PasswordService::new(1024, 1).unwrap();
        let store = Arc::new(MemoryStore::new());
        let user = seeded(&store, &passwords, "boss@site.com", true).await;

        let service = AuthService::new(store.clone(), store.clone(), passwords, &config);
        let issued = service.admin_login("driver", "correct-horse").await.unwrap();
        let (_, role) = service.admin_user(&issued.token).await.unwrap();
        assert_eq!(role, Role::Staff);

        store.update_user(User { is_staff: false, ..user }).await.unwrap();
        let err = service.admin_user(&issued.token).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn quiz_ticket_is_not_an_admin_token() {
        use crate::models::question::{NewAnswer, NewQuestion, QuestionCategory};
        use crate::repositories::QuestionRepository;
        use crate::services::quiz_service::QuizService;
        use crate::services::sampler::InOrderSampler;

        let config = Config::for_tests();
        let passwords = PasswordService::new(1024, 1).unwrap();
        let store = Arc::new(MemoryStore::new());
        let user = seeded(&store, &passwords, "boss@site.com", true).await;
        let q = store
            .insert_question(NewQuestion {
                text: "Speed limit in town?".into(),
                image: None,
                points: 1,
                category: QuestionCategory::Traffic,
            })
            .await
            .unwrap();
        store
            .insert_answer(NewAnswer { question_id: q.id, text: "50".into(), is_correct: true })
            .await
            .unwrap();

        let quiz = QuizService::new(store.clone(), store.clone(), Arc::new(InOrderSampler), &config);
        let sheet = quiz.start(user.id).await.unwrap().unwrap();

        let service = AuthService::new(store.clone(), store, passwords, &config);
        let err = service.admin_user(&sheet.ticket).await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
