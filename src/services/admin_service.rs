use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::dto::admin_dto::{
    blank_to_none, AdminIndex, AnswerPatch, AnswerPayload, CoursePatch, CoursePayload,
    GroupPayload, ListFilters, MemePatch, MemePayload, ProvisionedUser, QuestionPatch,
    QuestionPayload, UserPatch, UserPayload, UserRecord,
};
use crate::error::{Error, Result};
use crate::models::content::{Difficulty, Group, NewCourse, NewMeme};
use crate::models::question::{
    NewAnswer, NewAnswerChoice, NewQuestion, QuestionCategory, QuestionWithAnswers,
};
use crate::models::role::Role;
use crate::models::user::{NewUser, User, UserSummary};
use crate::repositories::{AttemptRepository, ContentRepository, QuestionRepository, UserRepository};
use crate::services::admin_scope::{
    allows, fallback_password, provisioned_flags, visible_modules, Permission, RecordType,
};
use crate::utils::crypto::PasswordService;

#[derive(Debug, Clone)]
pub struct AdminActor {
    pub user: User,
    pub role: Role,
}

#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
    content: Arc<dyn ContentRepository>,
    passwords: PasswordService,
}

fn parse_payload<T: DeserializeOwned + Validate>(payload: JsonValue) -> Result<T> {
    let parsed: T = serde_json::from_value(payload)?;
    parsed.validate()?;
    Ok(parsed)
}

fn to_json<T: serde::Serialize>(value: T) -> Result<JsonValue> {
    Ok(serde_json::to_value(value)?)
}

fn missing(record: RecordType, id: i64) -> Error {
    Error::NotFound(format!("No {} with id {}", record, id))
}

impl AdminService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
        content: Arc<dyn ContentRepository>,
        passwords: PasswordService,
    ) -> Self {
        Self {
            users,
            questions,
            attempts,
            content,
            passwords,
        }
    }

    fn authorize(actor: &AdminActor, record: RecordType, permission: Permission) -> Result<()> {
        if allows(actor.role, record, permission) {
            return Ok(());
        }
        tracing::info!(
            user_id = actor.user.id,
            role = actor.role.as_str(),
            record = record.as_str(),
            permission = permission.as_str(),
            "administration request denied"
        );
        Err(Error::Forbidden(format!(
            "You do not have permission to {} {} records.",
            permission.as_str(),
            record
        )))
    }

    pub fn index(&self, actor: &AdminActor) -> AdminIndex {
        AdminIndex {
            user: UserSummary::from(&actor.user),
            role: actor.role,
            modules: visible_modules(actor.role),
        }
    }

    pub async fn list(
        &self,
        actor: &AdminActor,
        record: RecordType,
        filters: &ListFilters,
    ) -> Result<JsonValue> {
        Self::authorize(actor, record, Permission::List)?;
        match record {
            RecordType::Course => {
                let difficulty = filters
                    .difficulty
                    .as_deref()
                    .map(str::parse::<Difficulty>)
                    .transpose()
                    .map_err(Error::BadRequest)?;
                to_json(self.content.list_courses(difficulty).await?)
            }
            RecordType::Meme => to_json(self.content.list_memes(None).await?),
            RecordType::Question => {
                let category = filters
                    .category
                    .as_deref()
                    .map(str::parse::<QuestionCategory>)
                    .transpose()
                    .map_err(Error::BadRequest)?;
                to_json(self.questions.list_questions(category).await?)
            }
            RecordType::Answer => to_json(self.questions.list_answers(filters.question_id).await?),
            RecordType::QuizAttempt => {
                to_json(self.attempts.list_attempts(filters.category.clone()).await?)
            }
            RecordType::User => {
                let users: Vec<UserRecord> =
                    self.users.list_users().await?.into_iter().map(UserRecord::from).collect();
                to_json(users)
            }
            RecordType::Group => to_json(self.content.list_groups().await?),
        }
    }

    pub async fn view(&self, actor: &AdminActor, record: RecordType, id: i64) -> Result<JsonValue> {
        Self::authorize(actor, record, Permission::View)?;
        match record {
            RecordType::Course => to_json(self.content.find_course(id).await?.ok_or_else(|| missing(record, id))?),
            RecordType::Meme => to_json(self.content.find_meme(id).await?.ok_or_else(|| missing(record, id))?),
            RecordType::Question => to_json(self.question_with_answers(id).await?),
            RecordType::Answer => to_json(self.questions.find_answer(id).await?.ok_or_else(|| missing(record, id))?),
            RecordType::QuizAttempt => {
                to_json(self.attempts.find_attempt(id).await?.ok_or_else(|| missing(record, id))?)
            }
            RecordType::User => to_json(UserRecord::from(self.find_user(id).await?)),
            RecordType::Group => to_json(self.content.find_group(id).await?.ok_or_else(|| missing(record, id))?),
        }
    }

    pub async fn create(
        &self,
        actor: &AdminActor,
        record: RecordType,
        payload: JsonValue,
    ) -> Result<JsonValue> {
        Self::authorize(actor, record, Permission::Add)?;
        let created = match record {
            RecordType::Course => {
                let p: CoursePayload = parse_payload(payload)?;
                to_json(
                    self.content
                        .insert_course(NewCourse {
                            title: p.title,
                            content: p.content,
                            image: blank_to_none(p.image),
                            pdf_file: blank_to_none(p.pdf_file),
                            display_order: p.order,
                            difficulty: p.difficulty,
                        })
                        .await?,
                )?
            }
            RecordType::Meme => {
                let p: MemePayload = parse_payload(payload)?;
                to_json(self.content.insert_meme(NewMeme { title: p.title, image: p.image }).await?)?
            }
            RecordType::Question => {
                let p: QuestionPayload = parse_payload(payload)?;
                to_json(self.create_question(p).await?)?
            }
            RecordType::Answer => {
                let p: AnswerPayload = parse_payload(payload)?;
                if self.questions.find_question(p.question_id).await?.is_none() {
                    return Err(Error::BadRequest(format!("Question {} does not exist", p.question_id)));
                }
                to_json(
                    self.questions
                        .insert_answer(NewAnswer {
                            question_id: p.question_id,
                            text: p.text,
                            is_correct: p.is_correct,
                        })
                        .await?,
                )?
            }
            RecordType::User => {
                let p: UserPayload = parse_payload(payload)?;
                to_json(self.provision_user(p).await?)?
            }
            RecordType::Group => {
                let p: GroupPayload = parse_payload(payload)?;
                to_json(self.content.insert_group(p.name.trim().to_string()).await?)?
            }
            RecordType::QuizAttempt => read_only(record)?,
        };
        tracing::info!(user_id = actor.user.id, record = record.as_str(), "administration record created");
        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &AdminActor,
        record: RecordType,
        id: i64,
        payload: JsonValue,
    ) -> Result<JsonValue> {
        Self::authorize(actor, record, Permission::Change)?;
        let updated = match record {
            RecordType::Course => {
                let p: CoursePatch = parse_payload(payload)?;
                let mut course = self.content.find_course(id).await?.ok_or_else(|| missing(record, id))?;
                if let Some(title) = p.title {
                    course.title = title;
                }
                if let Some(content) = p.content {
                    course.content = content;
                }
                if p.image.is_some() {
                    course.image = blank_to_none(p.image);
                }
                if p.pdf_file.is_some() {
                    course.pdf_file = blank_to_none(p.pdf_file);
                }
                if let Some(order) = p.order {
                    course.display_order = order;
                }
                if let Some(difficulty) = p.difficulty {
                    course.difficulty = difficulty;
                }
                to_json(self.content.update_course(course).await?)?
            }
            RecordType::Meme => {
                let p: MemePatch = parse_payload(payload)?;
                let mut meme = self.content.find_meme(id).await?.ok_or_else(|| missing(record, id))?;
                if let Some(title) = p.title {
                    meme.title = title;
                }
                if let Some(image) = p.image {
                    meme.image = image;
                }
                to_json(self.content.update_meme(meme).await?)?
            }
            RecordType::Question => {
                let p: QuestionPatch = parse_payload(payload)?;
                let mut question = self.questions.find_question(id).await?.ok_or_else(|| missing(record, id))?;
                if let Some(text) = p.text {
                    question.text = text;
                }
                if p.image.is_some() {
                    question.image = blank_to_none(p.image);
                }
                if let Some(points) = p.points {
                    question.points = points;
                }
                if let Some(category) = p.category {
                    question.category = category;
                }
                self.questions.update_question(question).await?;
                to_json(self.question_with_answers(id).await?)?
            }
            RecordType::Answer => {
                let p: AnswerPatch = parse_payload(payload)?;
                let mut answer = self.questions.find_answer(id).await?.ok_or_else(|| missing(record, id))?;
                if let Some(question_id) = p.question_id {
                    if self.questions.find_question(question_id).await?.is_none() {
                        return Err(Error::BadRequest(format!("Question {} does not exist", question_id)));
                    }
                    answer.question_id = question_id;
                }
                if let Some(text) = p.text {
                    answer.text = text;
                }
                if let Some(is_correct) = p.is_correct {
                    answer.is_correct = is_correct;
                }
                to_json(self.questions.update_answer(answer).await?)?
            }
            RecordType::User => {
                let p: UserPatch = parse_payload(payload)?;
                to_json(UserRecord::from(self.edit_user(id, p).await?))?
            }
            RecordType::Group => {
                let p: GroupPayload = parse_payload(payload)?;
                let group = Group { id, name: p.name.trim().to_string() };
                to_json(self.content.update_group(group).await?)?
            }
            RecordType::QuizAttempt => read_only(record)?,
        };
        tracing::info!(user_id = actor.user.id, record = record.as_str(), id, "administration record changed");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AdminActor, record: RecordType, id: i64) -> Result<()> {
        Self::authorize(actor, record, Permission::Delete)?;
        match record {
            RecordType::Course => self.content.delete_course(id).await?,
            RecordType::Meme => self.content.delete_meme(id).await?,
            RecordType::Question => self.questions.delete_question(id).await?,
            RecordType::Answer => self.questions.delete_answer(id).await?,
            RecordType::User => self.users.delete_user(id).await?,
            RecordType::Group => self.content.delete_group(id).await?,
            RecordType::QuizAttempt => {
                read_only(record)?;
            }
        }
        tracing::info!(user_id = actor.user.id, record = record.as_str(), id, "administration record deleted");
        Ok(())
    }

    async fn question_with_answers(&self, id: i64) -> Result<QuestionWithAnswers> {
        self.questions
            .find_questions_with_answers(&[id])
            .await?
            .pop()
            .ok_or_else(|| missing(RecordType::Question, id))
    }

    async fn create_question(&self, p: QuestionPayload) -> Result<QuestionWithAnswers> {
        let answers = p
            .answers
            .into_iter()
            .map(|inline| NewAnswerChoice { text: inline.text, is_correct: inline.is_correct })
            .collect();
        self.questions
            .insert_question_with_answers(
                NewQuestion {
                    text: p.text,
                    image: blank_to_none(p.image),
                    points: p.points,
                    category: p.category,
                },
                answers,
            )
            .await
    }

    async fn find_user(&self, id: i64) -> Result<User> {
        self.users
            .find_user(id)
            .await?
            .ok_or_else(|| missing(RecordType::User, id))
    }

    /// New accounts get coerced flags; without a password they get the fallback one,
    /// returned here exactly once.
    pub async fn provision_user(&self, p: UserPayload) -> Result<ProvisionedUser> {
        let email = p.email.trim().to_string();
        let (is_staff, is_superuser) = provisioned_flags(&email, p.is_staff, p.is_superuser);
        let username = p.username.trim().to_string();

        let (password, generated_password) = match p.password.filter(|pw| !pw.is_empty()) {
            Some(password) => (password, None),
            None => {
                let fallback = fallback_password(&username);
                (fallback.clone(), Some(fallback))
            }
        };

        let user = self
            .users
            .insert_user(NewUser {
                username,
                email,
                password_hash: self.passwords.hash_password(&password)?,
                first_name: p.first_name.trim().to_string(),
                last_name: p.last_name.trim().to_string(),
                is_staff,
                is_superuser,
                is_active: p.is_active,
            })
            .await?;
        tracing::info!(
            user_id = user.id,
            role = user.role().as_str(),
            generated_password = generated_password.is_some(),
            "account provisioned"
        );

        Ok(ProvisionedUser {
            user: UserRecord::from(user),
            generated_password,
        })
    }

    /// Flag coercion is re-applied on every edit, against the resulting email.
    pub async fn edit_user(&self, id: i64, p: UserPatch) -> Result<User> {
        let mut user = self.find_user(id).await?;
        if let Some(username) = p.username {
            user.username = username.trim().to_string();
        }
        if let Some(email) = p.email {
            user.email = email.trim().to_string();
        }
        if let Some(first_name) = p.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = p.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(is_active) = p.is_active {
            user.is_active = is_active;
        }
        let (is_staff, is_superuser) = provisioned_flags(
            &user.email,
            p.is_staff.unwrap_or(user.is_staff),
            p.is_superuser.unwrap_or(user.is_superuser),
        );
        user.is_staff = is_staff;
        user.is_superuser = is_superuser;
        if let Some(password) = p.password.filter(|pw| !pw.is_empty()) {
            user.password_hash = self.passwords.hash_password(&password)?;
        }
        self.users.update_user(user).await
    }
}

/// Attempts carry no add/change/delete permission for any role, so `authorize` stops
/// these requests first.
fn read_only(record: RecordType) -> Result<JsonValue> {
    Err(Error::Forbidden(format!("{} records are read-only.", record)))
}
