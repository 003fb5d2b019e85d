use booklist::config::Config;
use booklist::database::Sqlite;
use booklist::http::{AppState, HttpServer, HttpServerConfig};
use booklist::seed::SeedData;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let store = Sqlite::connect(config.database_url(), &SeedData::demo()).await?;
    let state = AppState::new(store);
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
