use anyhow::Result;
use dashboard::config::{AppConfig, StorageBackend};
use dashboard::server::ServerBuilder;
use dashboard::storage::{InMemoryStore, SeedData};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dashboard=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;
    let bind = config.server.bind.clone();

    let builder = match config.database.backend {
        StorageBackend::InMemory => {
            let store = InMemoryStore::new();
            if config.seed {
                SeedData::placeholder()?.load_into(&store)?;
                tracing::info!("loaded placeholder data");
            }
            ServerBuilder::new().with_store(store)
        }
        StorageBackend::Postgres => postgres_builder(&config).await?,
    };

    builder.with_config(config).serve(&bind).await
}

#[cfg(feature = "postgres")]
async fn postgres_builder(config: &AppConfig) -> Result<ServerBuilder> {
    use dashboard::storage::PostgresStore;

    let url = config
        .database
        .url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("database.url is required for the postgres backend"))?;

    let store = PostgresStore::connect(url, config.database.max_connections).await?;
    store.run_migrations().await?;
    if config.seed {
        store.seed(&SeedData::placeholder()?).await?;
        tracing::info!("seeded placeholder data");
    }
    Ok(ServerBuilder::new().with_store(store))
}

#[cfg(not(feature = "postgres"))]
async fn postgres_builder(_config: &AppConfig) -> Result<ServerBuilder> {
    anyhow::bail!("postgres backend requested but the `postgres` feature is not enabled")
}
