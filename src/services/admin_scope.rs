use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::role::{is_instructor_email, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Course,
    Meme,
    Question,
    Answer,
    QuizAttempt,
    User,
    Group,
}

impl RecordType {
    pub const ALL: [RecordType; 7] = [
        RecordType::Course,
        RecordType::Meme,
        RecordType::Question,
        RecordType::Answer,
        RecordType::QuizAttempt,
        RecordType::User,
        RecordType::Group,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Course => "course",
            RecordType::Meme => "meme",
            RecordType::Question => "question",
            RecordType::Answer => "answer",
            RecordType::QuizAttempt => "quizattempt",
            RecordType::User => "user",
            RecordType::Group => "group",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown record type '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    List,
    View,
    Add,
    Change,
    Delete,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::List => "list",
            Permission::View => "view",
            Permission::Add => "add",
            Permission::Change => "change",
            Permission::Delete => "delete",
        }
    }
}

const FULL: &[Permission] = &[
    Permission::List,
    Permission::View,
    Permission::Add,
    Permission::Change,
    Permission::Delete,
];
const READ_ONLY: &[Permission] = &[Permission::List, Permission::View];
const NONE: &[Permission] = &[];

const INSTRUCTOR_RECORDS: [RecordType; 3] =
    [RecordType::Course, RecordType::Question, RecordType::Answer];

pub fn permissions(role: Role, record: RecordType) -> &'static [Permission] {
    // Attempts are immutable for everyone.
    if record == RecordType::QuizAttempt {
        return match role {
            Role::Superuser | Role::Staff => READ_ONLY,
            Role::Instructor | Role::Normal => NONE,
        };
    }
    match role {
        Role::Superuser => FULL,
        Role::Instructor if INSTRUCTOR_RECORDS.contains(&record) => FULL,
        Role::Instructor => NONE,
        Role::Staff => match record {
            RecordType::User | RecordType::Group => NONE,
            _ => READ_ONLY,
        },
        Role::Normal => NONE,
    }
}

pub fn allows(role: Role, record: RecordType, permission: Permission) -> bool {
    permissions(role, record).contains(&permission)
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleAccess {
    pub record: RecordType,
    pub permissions: &'static [Permission],
}

pub fn visible_modules(role: Role) -> Vec<ModuleAccess> {
    RecordType::ALL
        .into_iter()
        .map(|record| ModuleAccess {
            record,
            permissions: permissions(role, record),
        })
        .filter(|m| !m.permissions.is_empty())
        .collect()
}

/// Returns the `(is_staff, is_superuser)` pair an account is stored with. Instructor-domain
/// addresses are always staff and never superuser; superusers are always staff.
pub fn provisioned_flags(email: &str, is_staff: bool, is_superuser: bool) -> (bool, bool) {
    if is_instructor_email(email) {
        (true, false)
    } else if is_superuser {
        (true, true)
    } else {
        (is_staff, false)
    }
}

pub fn fallback_password(username: &str) -> String {
    format!("{}123", username)
}
