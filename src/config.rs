use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub admin_token_ttl_hours: i64,
    pub quiz_ticket_ttl_minutes: i64,
    pub media_root: PathBuf,
    pub auth_rps: u32,
    pub cookie_secure: bool,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let storage_backend: StorageBackend = get_env_parse_or("STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = match storage_backend {
            StorageBackend::Postgres => Some(get_env("DATABASE_URL")?),
            StorageBackend::Memory => env::var("DATABASE_URL").ok(),
        };

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8000"),
            storage_backend,
            database_url,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: get_env("JWT_SECRET")?,
            session_ttl_hours: get_env_parse_or("SESSION_TTL_HOURS", 24 * 14)?,
            admin_token_ttl_hours: get_env_parse_or("ADMIN_TOKEN_TTL_HOURS", 8)?,
            quiz_ticket_ttl_minutes: get_env_parse_or("QUIZ_TICKET_TTL_MINUTES", 120)?,
            media_root: PathBuf::from(get_env_or("MEDIA_ROOT", "./media")),
            auth_rps: get_env_parse_or("AUTH_RPS", 20)?,
            cookie_secure: get_env_parse_or("COOKIE_SECURE", false)?,
            argon2_memory_kib: get_env_parse_or("ARGON2_MEMORY_KIB", 19 * 1024)?,
            argon2_iterations: get_env_parse_or("ARGON2_ITERATIONS", 2)?,
            log_format: get_env_parse_or("LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    pub fn for_tests() -> Self {
        Self {
            server_address: "127.0.0.1:0".to_string(),
            storage_backend: StorageBackend::Memory,
            database_url: None,
            database_max_connections: 1,
            jwt_secret: "test_secret_key".to_string(),
            session_ttl_hours: 2,
            admin_token_ttl_hours: 1,
            quiz_ticket_ttl_minutes: 30,
            media_root: PathBuf::from("./media"),
            auth_rps: 1000,
            cookie_secure: false,
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            log_format: LogFormat::Pretty,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_parses_known_names() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!("Postgres".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_config_uses_memory_backend() {
        let config = Config::for_tests();
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.database_url.is_none());
    }
}
