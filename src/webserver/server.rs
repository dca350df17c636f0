//! Axum webserver implementation
//!
//! Server lifecycle management including startup, shutdown, and graceful termination

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::{
    config::Config,
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Global shutdown notifier
static SHUTDOWN_NOTIFY: once_cell::sync::Lazy<Arc<Notify>> =
    once_cell::sync::Lazy::new(|| Arc::new(Notify::new()));

/// Start the webserver
///
/// This function blocks until the server is shut down, either through
/// [`shutdown`] or a termination signal.
pub async fn start_server(config: Arc<Config>) -> Result<(), String> {
    let bind_address = config.webserver.bind_address();
    let port = config.webserver.port;
    logger::debug(
        LogTag::Webserver,
        &format!("Starting webserver on {}", bind_address),
    );

    let state = Arc::new(AppState::from_shared(config));
    let app = build_app(Arc::clone(&state));

    let listener = TcpListener::bind(bind_address.as_str()).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => format!(
            "Failed to bind to {}: Address already in use\n\
             \n\
             Another process (possibly another mind-orchestrator) owns this port.\n\
             Stop it or choose a different one with --port / ORCHESTRATOR_PORT.",
            bind_address
        ),
        std::io::ErrorKind::PermissionDenied => format!(
            "Failed to bind to {}: Permission denied\n\
             \n\
             Port {} requires elevated privileges on this system.\n\
             Consider using a port above 1024 or running with appropriate permissions.",
            bind_address, port
        ),
        _ => format!("Failed to bind to {}: {}", bind_address, e),
    })?;

    let addr: SocketAddr = listener
        .local_addr()
        .map_err(|e| format!("Failed to read bound address: {}", e))?;

    logger::info(
        LogTag::Webserver,
        &format!(
            "Listening on http://{} (POST {})",
            addr,
            routes::chat::CHAT_COMPLETIONS_PATH
        ),
    );

    let shutdown_signal = async {
        tokio::select! {
            _ = SHUTDOWN_NOTIFY.notified() => {
                logger::debug(LogTag::Webserver, "Shutdown requested");
            }
            signal_name = wait_for_shutdown_signal() => {
                logger::info(
                    LogTag::System,
                    &format!("Shutdown signal received ({}), stopping webserver...", signal_name),
                );
            }
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    logger::info(
        LogTag::Webserver,
        &format!(
            "Webserver stopped gracefully after {}s",
            state.uptime_seconds()
        ),
    );

    Ok(())
}

/// Trigger webserver shutdown
pub fn shutdown() {
    logger::debug(LogTag::Webserver, "Triggering webserver shutdown...");
    SHUTDOWN_NOTIFY.notify_one();
}

/// Build the Axum application with all routes
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state)
}

/// Waits until Ctrl-C (SIGINT) or SIGTERM is received
async fn wait_for_shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT",
                _ = term.recv() => "SIGTERM",
            },
            Err(e) => {
                logger::warning(
                    LogTag::System,
                    &format!("Failed to bind SIGTERM, only Ctrl-C will stop the server: {}", e),
                );
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "CTRL_C"
    }
}
