use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::content::{Course, Difficulty, Group, Meme, NewCourse, NewMeme};
use crate::models::question::{
    Answer, NewAnswer, NewAnswerChoice, NewQuestion, Question, QuestionCategory,
    QuestionWithAnswers,
};
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::models::session::Session;
use crate::models::user::{NewUser, User};
use crate::repositories::question_repository::attach_answers;
use crate::repositories::{
    AttemptRepository, ContentRepository, QuestionRepository, SessionRepository, UserRepository,
};
use crate::utils::time::now;

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    sessions: BTreeMap<String, Session>,
    questions: BTreeMap<i64, Question>,
    answers: BTreeMap<i64, Answer>,
    attempts: BTreeMap<i64, QuizAttempt>,
    courses: BTreeMap<i64, Course>,
    memes: BTreeMap<i64, Meme>,
    groups: BTreeMap<i64, Group>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str, id: i64) -> Error {
    Error::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let wanted = email.trim();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(wanted))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.tables.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.username_taken(&user.username, None) {
            return Err(Error::Conflict("A user with that username already exists".into()));
        }
        let id = tables.next_id();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            date_joined: now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn update_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(not_found("User", user.id));
        }
        if tables.username_taken(&user.username, Some(user.id)) {
            return Err(Error::Conflict("A user with that username already exists".into()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(not_found("User", id));
        }
        tables.sessions.retain(|_, s| s.user_id != id);
        tables.attempts.retain(|_, a| a.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn insert_session(&self, session: Session) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&session.user_id) {
            return Err(Error::BadRequest("Session references a missing record".into()));
        }
        tables.sessions.insert(session.key.clone(), session);
        Ok(())
    }

    async fn find_session(&self, key: &str) -> Result<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(key).cloned())
    }

    async fn delete_session(&self, key: &str) -> Result<()> {
        self.tables.write().await.sessions.remove(key);
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for MemoryStore {
    async fn list_questions(&self, category: Option<QuestionCategory>) -> Result<Vec<Question>> {
        let tables = self.tables.read().await;
        Ok(tables
            .questions
            .values()
            .filter(|q| category.map_or(true, |c| q.category == c))
            .cloned()
            .collect())
    }

    async fn list_questions_with_answers(&self) -> Result<Vec<QuestionWithAnswers>> {
        let tables = self.tables.read().await;
        let questions = tables.questions.values().cloned().collect();
        let answers = tables.answers.values().cloned().collect();
        Ok(attach_answers(questions, answers))
    }

    async fn find_questions_with_answers(&self, ids: &[i64]) -> Result<Vec<QuestionWithAnswers>> {
        let tables = self.tables.read().await;
        let questions = tables
            .questions
            .values()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect();
        let answers = tables
            .answers
            .values()
            .filter(|a| ids.contains(&a.question_id))
            .cloned()
            .collect();
        Ok(attach_answers(questions, answers))
    }

    async fn find_question(&self, id: i64) -> Result<Option<Question>> {
        Ok(self.tables.read().await.questions.get(&id).cloned())
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<Question> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let created = Question {
            id,
            text: question.text,
            image: question.image,
            points: question.points,
            category: question.category,
        };
        tables.questions.insert(id, created.clone());
        Ok(created)
    }

    async fn insert_question_with_answers(
        &self,
        question: NewQuestion,
        answers: Vec<NewAnswerChoice>,
    ) -> Result<QuestionWithAnswers> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let created = Question {
            id,
            text: question.text,
            image: question.image,
            points: question.points,
            category: question.category,
        };
        let mut inserted = Vec::with_capacity(answers.len());
        for answer in answers {
            let answer_id = tables.next_id();
            inserted.push(Answer {
                id: answer_id,
                question_id: id,
                text: answer.text,
                is_correct: answer.is_correct,
            });
        }
        tables.questions.insert(id, created.clone());
        for answer in &inserted {
            tables.answers.insert(answer.id, answer.clone());
        }
        Ok(QuestionWithAnswers { question: created, answers: inserted })
    }

    async fn update_question(&self, question: Question) -> Result<Question> {
        let mut tables = self.tables.write().await;
        let Some(slot) = tables.questions.get_mut(&question.id) else {
            return Err(not_found("Question", question.id));
        };
        *slot = question.clone();
        Ok(question)
    }

    async fn delete_question(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.questions.remove(&id).is_none() {
            return Err(not_found("Question", id));
        }
        tables.answers.retain(|_, a| a.question_id != id);
        Ok(())
    }

    async fn list_answers(&self, question_id: Option<i64>) -> Result<Vec<Answer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .answers
            .values()
            .filter(|a| question_id.map_or(true, |q| a.question_id == q))
            .cloned()
            .collect())
    }

    async fn find_answer(&self, id: i64) -> Result<Option<Answer>> {
        Ok(self.tables.read().await.answers.get(&id).cloned())
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer> {
        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(&answer.question_id) {
            return Err(Error::BadRequest("Answer references a missing record".into()));
        }
        let id = tables.next_id();
        let created = Answer {
            id,
            question_id: answer.question_id,
            text: answer.text,
            is_correct: answer.is_correct,
        };
        tables.answers.insert(id, created.clone());
        Ok(created)
    }

    async fn update_answer(&self, answer: Answer) -> Result<Answer> {
        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(&answer.question_id) {
            return Err(Error::BadRequest("Answer references a missing record".into()));
        }
        let Some(slot) = tables.answers.get_mut(&answer.id) else {
            return Err(not_found("Answer", answer.id));
        };
        *slot = answer.clone();
        Ok(answer)
    }

    async fn delete_answer(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .answers
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Answer", id))
    }
}

#[async_trait]
impl AttemptRepository for MemoryStore {
    async fn insert_attempt(&self, attempt: NewQuizAttempt) -> Result<QuizAttempt> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&attempt.user_id) {
            return Err(Error::BadRequest("Attempt references a missing record".into()));
        }
        let id = tables.next_id();
        let created = QuizAttempt {
            id,
            user_id: attempt.user_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            category: attempt.category,
            completed_at: attempt.completed_at,
        };
        tables.attempts.insert(id, created.clone());
        Ok(created)
    }

    async fn list_attempts_for_user(&self, user_id: i64) -> Result<Vec<QuizAttempt>> {
        let tables = self.tables.read().await;
        let mut attempts: Vec<QuizAttempt> = tables
            .attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut attempts);
        Ok(attempts)
    }

    async fn list_attempts(&self, category: Option<String>) -> Result<Vec<QuizAttempt>> {
        let tables = self.tables.read().await;
        let mut attempts: Vec<QuizAttempt> = tables
            .attempts
            .values()
            .filter(|a| category.as_deref().map_or(true, |c| a.category == c))
            .cloned()
            .collect();
        newest_first(&mut attempts);
        Ok(attempts)
    }

    async fn find_attempt(&self, id: i64) -> Result<Option<QuizAttempt>> {
        Ok(self.tables.read().await.attempts.get(&id).cloned())
    }
}

fn newest_first(attempts: &mut [QuizAttempt]) {
    attempts.sort_by(|a, b| {
        b.completed_at
            .cmp(&a.completed_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn list_courses(&self, difficulty: Option<Difficulty>) -> Result<Vec<Course>> {
        let tables = self.tables.read().await;
        let mut courses: Vec<Course> = tables
            .courses
            .values()
            .filter(|c| difficulty.map_or(true, |d| c.difficulty == d))
            .cloned()
            .collect();
        courses.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(courses)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>> {
        Ok(self.tables.read().await.courses.get(&id).cloned())
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let created = Course {
            id,
            title: course.title,
            content: course.content,
            image: course.image,
            pdf_file: course.pdf_file,
            created_at: now(),
            display_order: course.display_order,
            difficulty: course.difficulty,
        };
        tables.courses.insert(id, created.clone());
        Ok(created)
    }

    async fn update_course(&self, course: Course) -> Result<Course> {
        let mut tables = self.tables.write().await;
        let Some(slot) = tables.courses.get_mut(&course.id) else {
            return Err(not_found("Course", course.id));
        };
        *slot = course.clone();
        Ok(course)
    }

    async fn delete_course(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .courses
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Course", id))
    }

    async fn list_memes(&self, limit: Option<i64>) -> Result<Vec<Meme>> {
        let tables = self.tables.read().await;
        let mut memes: Vec<Meme> = tables.memes.values().cloned().collect();
        memes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        if let Some(limit) = limit {
            memes.truncate(limit.max(0) as usize);
        }
        Ok(memes)
    }

    async fn find_meme(&self, id: i64) -> Result<Option<Meme>> {
        Ok(self.tables.read().await.memes.get(&id).cloned())
    }

    async fn insert_meme(&self, meme: NewMeme) -> Result<Meme> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let created = Meme {
            id,
            title: meme.title,
            image: meme.image,
            created_at: now(),
        };
        tables.memes.insert(id, created.clone());
        Ok(created)
    }

    async fn update_meme(&self, meme: Meme) -> Result<Meme> {
        let mut tables = self.tables.write().await;
        let Some(slot) = tables.memes.get_mut(&meme.id) else {
            return Err(not_found("Meme", meme.id));
        };
        *slot = meme.clone();
        Ok(meme)
    }

    async fn delete_meme(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .memes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Meme", id))
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self.tables.read().await.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn find_group(&self, id: i64) -> Result<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn insert_group(&self, name: String) -> Result<Group> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.name == name) {
            return Err(Error::Conflict("A group with that name already exists".into()));
        }
        let id = tables.next_id();
        let created = Group { id, name };
        tables.groups.insert(id, created.clone());
        Ok(created)
    }

    async fn update_group(&self, group: Group) -> Result<Group> {
        let mut tables = self.tables.write().await;
        if tables
            .groups
            .values()
            .any(|g| g.name == group.name && g.id != group.id)
        {
            return Err(Error::Conflict("A group with that name already exists".into()));
        }
        let Some(slot) = tables.groups.get_mut(&group.id) else {
            return Err(not_found("Group", group.id));
        };
        *slot = group.clone();
        Ok(group)
    }

    async fn delete_group(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .groups
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("Group", id))
    }
}
