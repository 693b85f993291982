pub mod access_gate;
pub mod admin_scope;
pub mod admin_service;
pub mod attempt_service;
pub mod auth_service;
pub mod content_service;
pub mod grading_service;
pub mod quiz_service;
pub mod sampler;
