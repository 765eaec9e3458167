use tracing::{info, warn};

use pbi_embed_api::{app, config, database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and the AAD
    // credentials without exporting them by hand.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    let missing = config.missing_settings();
    if !missing.is_empty() {
        warn!(
            ?missing,
            "starting with incomplete configuration; embed requests will fail until these are set"
        );
    }

    let pool = database::connect(&config.database)?;
    let state = AppState {
        pool: pool.clone(),
        http: reqwest::Client::new(),
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("embed API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database::close(&pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
    }
}
