use serde::Serialize;

use crate::models::user::User;

pub const INSTRUCTOR_EMAIL_DOMAIN: &str = "@instructor.com";

pub fn is_instructor_email(email: &str) -> bool {
    email
        .trim()
        .to_ascii_lowercase()
        .ends_with(INSTRUCTOR_EMAIL_DOMAIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superuser,
    Instructor,
    Staff,
    Normal,
}

impl Role {
    pub fn classify(user: &User) -> Role {
        Self::from_flags(&user.email, user.is_staff, user.is_superuser)
    }

    pub fn from_flags(email: &str, is_staff: bool, is_superuser: bool) -> Role {
        if is_instructor_email(email) && is_staff && !is_superuser {
            Role::Instructor
        } else if is_superuser {
            Role::Superuser
        } else if is_staff {
            Role::Staff
        } else {
            Role::Normal
        }
    }

    pub fn is_privileged(self) -> bool {
        !matches!(self, Role::Normal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superuser => "superuser",
            Role::Instructor => "instructor",
            Role::Staff => "staff",
            Role::Normal => "normal",
        }
    }
}
