use std::net::SocketAddr;
use std::sync::Arc;

use porsche_school::{
    config::{Config, LogFormat, StorageBackend},
    database::pool::{create_pool, migrate},
    repositories::MemoryStore,
    routes,
    services::sampler::RandomSampler,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let addr: SocketAddr = config.server_address.parse()?;
    let app_state = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config).await?;
            migrate(&pool).await?;
            info!("Connected to postgres, migrations applied");
            AppState::new(config, pool)?
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            AppState::from_store(config, Arc::new(MemoryStore::new()), Arc::new(RandomSampler))?
        }
    };

    let app = routes::router(app_state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
