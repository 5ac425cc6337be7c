use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::{records::RecordService, storage::Driver};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the storage driver and build the router for `cfg`.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let driver = Driver::open(&cfg.storage.data_dir).await?;
    info!(data_dir = %driver.dir().display(), "storage ready");

    let state = ServerState { users: RecordService::new(Arc::new(driver)) };
    Ok(routes::build_router(state, &cfg.api.prefix, build_cors()))
}

/// Resolve when the process receives Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!(event = "shutdown_signal", "received shutdown signal, shutting down");
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!(event = "shutdown_complete", "server shutdown successfully");
    Ok(())
}

/// Public entry: build the app and run the HTTP server until a termination signal.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let listener = TcpListener::bind(cfg.bind_addr()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, prefix = %cfg.api.prefix, "listening");

    serve(listener, app, shutdown_signal()).await
}
