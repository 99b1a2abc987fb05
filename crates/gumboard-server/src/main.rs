mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use gumboard_api::notify::{
    LogMessenger, MemoryDebounceStore, Messenger, Notifier, SlackMessenger, run_prune_loop,
};
use gumboard_api::{AppStateInner, router};
use gumboard_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gumboard=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = Database::open(&config.db_path)?;

    let messenger: Arc<dyn Messenger> = match &config.slack_bot_token {
        Some(token) => Arc::new(SlackMessenger::new(token.clone())?),
        None => {
            warn!("GUMBOARD_SLACK_BOT_TOKEN not set; Slack notifications are logged only");
            Arc::new(LogMessenger)
        }
    };
    let notifier = Arc::new(Notifier::new(
        Arc::new(MemoryDebounceStore::new(config.debounce_max_entries)),
        messenger,
        config.debounce_window,
    ));

    // Prune the debounce store once per window
    tokio::spawn(run_prune_loop(
        notifier.clone(),
        config.debounce_window.max(Duration::from_secs(1)),
    ));

    let state = Arc::new(AppStateInner {
        db,
        session_secret: config.session_secret.clone(),
        notifier,
    });

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Gumboard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
