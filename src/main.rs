use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;

use cert_portal::{Config, db, router, telemetry};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;
    telemetry::init(&cfg.loglevel);

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        session_cookie = %cfg.session_cookie
    );

    let store = db::connect(&cfg.database_url).await?;
    let state = router::PortalState::from_store(store.clone(), cfg.session_cookie.as_str());
    let app = router::portal_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
