pub mod cookies;
pub mod crypto;
pub mod flash;
pub mod jwt;
pub mod time;
pub mod token;
pub mod validation;
