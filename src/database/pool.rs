use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Config;
use crate::error::{Error, Result};

pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let Some(url) = config.database_url.as_deref() else {
        return Err(Error::Config(
            "DATABASE_URL is required for the postgres backend".to_string(),
        ));
    };
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(url)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
