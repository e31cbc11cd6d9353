use backend_lib::{config::Settings, router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration, falling back to explicit paths
    let settings = Settings::load()
        .or_else(|_| Settings::load_from("config/default.toml"))
        .or_else(|_| Settings::load_from("./config/default.toml"))?;

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let bind_addr = settings.bind_addr;

    // Create application state with flat-file storage
    let state = Arc::new(AppState::from_settings(settings)?);

    // Create the router
    let app = router::create_router(state);

    // Start the server
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
