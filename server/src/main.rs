mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use page_extract_cli::{fetch::HttpFetcher, utils::init_tracing, ProcessorRegistry};
use tokio::net::TcpListener;
use tracing::info;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let cors = config.cors()?;

    let fetcher = HttpFetcher::new(config.fetch.clone())?;
    let state = AppState::new(ProcessorRegistry::with_defaults(), Arc::new(fetcher));
    let app = routes::app(state, cors);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "relay listening");
    axum::serve(listener, app).await?;
    Ok(())
}
