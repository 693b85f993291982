use crate::models::role::Role;

pub const LOGIN_PATH: &str = "/login/";
pub const ADMIN_PATH: &str = "/admin/";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visitor {
    Anonymous,
    Normal,
    Privileged(Role),
}

impl Visitor {
    pub fn from_role(role: Option<Role>) -> Self {
        match role {
            None => Visitor::Anonymous,
            Some(Role::Normal) => Visitor::Normal,
            Some(role) => Visitor::Privileged(role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect {
        location: &'static str,
        message: &'static str,
    },
}

pub fn front_end(visitor: Visitor) -> GateDecision {
    match visitor {
        Visitor::Normal => GateDecision::Allow,
        Visitor::Anonymous => GateDecision::Redirect {
            location: LOGIN_PATH,
            message: "Please log in to access this page.",
        },
        Visitor::Privileged(role) => GateDecision::Redirect {
            location: ADMIN_PATH,
            message: privileged_redirect_message(role),
        },
    }
}

fn privileged_redirect_message(role: Role) -> &'static str {
    match role {
        Role::Instructor => {
            "Instructor accounts work from the administration panel. You have been redirected there."
        }
        Role::Superuser => {
            "Administrator accounts work from the administration panel. You have been redirected there."
        }
        _ => "Staff accounts work from the administration panel. You have been redirected there.",
    }
}

pub fn login_refusal(role: Role) -> Option<&'static str> {
    match role {
        Role::Normal => None,
        Role::Instructor => Some(
            "Instructor accounts cannot sign in here. Please use the administration panel login.",
        ),
        Role::Superuser => Some(
            "Administrator accounts cannot sign in here. Please use the administration panel login.",
        ),
        Role::Staff => {
            Some("Staff accounts cannot sign in here. Please use the administration panel login.")
        }
    }
}

pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => HOME_PATH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_users_pass() {
        assert_eq!(front_end(Visitor::from_role(Some(Role::Normal))), GateDecision::Allow);
    }

    #[test]
    fn anonymous_visitors_go_to_login() {
        match front_end(Visitor::Anonymous) {
            GateDecision::Redirect { location, .. } => assert_eq!(location, LOGIN_PATH),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn every_privileged_role_goes_to_admin_with_its_own_message() {
        let mut seen = Vec::new();
        for role in [Role::Superuser, Role::Instructor, Role::Staff] {
            match front_end(Visitor::Privileged(role)) {
                GateDecision::Redirect { location, message } => {
                    assert_eq!(location, ADMIN_PATH);
                    assert!(!seen.contains(&message));
                    seen.push(message);
                }
                GateDecision::Allow => panic!("{:?} must not reach the front end", role),
            }
        }
    }

    #[test]
    fn login_refuses_privileged_roles() {
        assert!(login_refusal(Role::Normal).is_none());
        assert!(login_refusal(Role::Instructor).unwrap().contains("Instructor"));
        assert!(login_refusal(Role::Superuser).is_some());
        assert!(login_refusal(Role::Staff).is_some());
    }

    #[test]
    fn next_must_stay_local() {
        assert_eq!(safe_next(Some("/quiz/")), "/quiz/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
