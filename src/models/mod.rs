pub mod content;
pub mod question;
pub mod quiz_attempt;
pub mod role;
pub mod session;
pub mod user;
