use homework_tracker::{load_store, persist_store, router, AppConfig, AppState, Workspace};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut store = load_store(&config.data_path).await;
    let workspace = Workspace::load(&mut store, config.seed_roster)?;
    if let Err(err) = persist_store(&config.data_path, &store).await {
        error!("initial save failed: {err}");
    }
    info!(
        "loaded group {} with {} students",
        workspace.groups().current_id(),
        workspace.roster().students().len()
    );

    let state = AppState::new(&config, store, workspace);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
