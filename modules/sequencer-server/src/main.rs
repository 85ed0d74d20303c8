use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use sequencer_common::Config;
use sequencer_engine::{NotionStore, Sequencer};
use sequencer_server::{init_tracing, routes::build_router};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.json_logs)?;
    config.log_redacted();

    let store = Arc::new(NotionStore::from_config(&config));
    let app = build_router(Sequencer::new(store));

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Meeting sequencer listening on {addr}");
    info!("Webhook endpoint: POST http://{addr}/webhook");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
