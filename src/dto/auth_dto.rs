use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::role::is_instructor_email;
use crate::models::user::UserSummary;
use crate::utils::validation::{validate, FormErrors};

pub const INSTRUCTOR_EMAIL_RESERVED: &str =
    "Addresses ending in @instructor.com are reserved for instructor accounts created by an administrator.";

fn username_charset(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_charset");
        err.message = Some(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        );
        Err(err)
    }
}

fn not_instructor_email(value: &str) -> Result<(), ValidationError> {
    if is_instructor_email(value) {
        let mut err = ValidationError::new("instructor_domain");
        err.message = Some(INSTRUCTOR_EMAIL_RESERVED.into());
        Err(err)
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(
        length(max = 150, message = "Ensure this value has at most 150 characters."),
        custom(function = "username_charset")
    )]
    pub username: String,
    #[validate(length(max = 30, message = "Ensure this value has at most 30 characters."))]
    pub first_name: String,
    #[validate(length(max = 30, message = "Ensure this value has at most 30 characters."))]
    pub last_name: String,
    #[validate(
        email(message = "Enter a valid email address."),
        custom(function = "not_instructor_email")
    )]
    pub email: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

impl RegisterForm {
    pub fn check(&self) -> FormErrors {
        let mut errors = validate(self);
        errors.require("username", &self.username);
        errors.require("first_name", &self.first_name);
        errors.require("last_name", &self.last_name);
        errors.require("email", &self.email);
        let has_password1 = errors.require("password1", &self.password1);
        let has_password2 = errors.require("password2", &self.password2);
        if !(has_password1 && has_password2) {
            return errors;
        }

        if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
            return errors;
        }
        let password = &self.password2;
        if password.chars().count() < 8 {
            errors.add(
                "password2",
                "This password is too short. It must contain at least 8 characters.",
            );
        }
        if password.chars().all(|c| c.is_ascii_digit()) {
            errors.add("password2", "This password is entirely numeric.");
        }
        if password.eq_ignore_ascii_case(self.username.trim()) {
            errors.add("password2", "The password is too similar to the username.");
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginPage {
    pub username: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPage {
    pub form: RegisterForm,
    pub errors: FormErrors,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: UserSummary,
    pub role: crate::models::role::Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            username: "ana".into(),
            first_name: "Ana".into(),
            last_name: "Pop".into(),
            email: "ana@site.com".into(),
            password1: "drive-safely-9".into(),
            password2: "drive-safely-9".into(),
        }
    }

    #[test]
    fn valid_form_has_no_errors() {
        assert!(form().check().is_empty());
    }

    #[test]
    fn blank_fields_are_required() {
        let errors = RegisterForm::default().check();
        for field in ["username", "first_name", "last_name", "email", "password1", "password2"] {
            assert_eq!(errors.fields[field], vec!["This field is required.".to_string()], "{}", field);
        }
    }

    #[test]
    fn instructor_domain_is_rejected() {
        let errors = RegisterForm {
            email: "x@instructor.com".into(),
            ..form()
        }
        .check();
        assert_eq!(errors.fields["email"], vec![INSTRUCTOR_EMAIL_RESERVED.to_string()]);
    }

    #[test]
    fn password_rules() {
        let mismatch = RegisterForm { password2: "other-pass-1".into(), ..form() }.check();
        assert!(mismatch.has("password2"));

        let numeric = RegisterForm { password1: "12345678".into(), password2: "12345678".into(), ..form() }.check();
        assert_eq!(numeric.fields["password2"], vec!["This password is entirely numeric.".to_string()]);

        let short = RegisterForm { password1: "abc".into(), password2: "abc".into(), ..form() }.check();
        assert!(short.fields["password2"][0].contains("too short"));
    }
}
