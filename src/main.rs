use std::sync::Arc;

use anyhow::Context;

use valentine_card::card::{CardSession, HttpSubmitter, terminal};
use valentine_card::config::{NotifyConfig, ServerConfig, SessionConfig};
use valentine_card::notifier::{NotifierRouteState, Notifier, ResendSinkFactory, notifier_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    match mode.as_str() {
        "serve" => serve().await,
        "play" => play().await,
        other => {
            eprintln!("Unknown mode: {other}");
            eprintln!("  usage: valentine-card [serve|play]");
            std::process::exit(2);
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env();

    eprintln!("💌 Valentine Card v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Submit: http://{}/api/submit-response",
        server_config.addr()
    );
    eprintln!("   Health: http://{}/health", server_config.addr());

    // Configuration is checked per request; this only warns early.
    if let Err(e) = NotifyConfig::from_env() {
        eprintln!("   Warning: {e} (submissions will fail until set)");
    }

    let sinks = Arc::new(ResendSinkFactory::new().context("Failed to build HTTP client")?);
    let app = notifier_routes(NotifierRouteState {
        notifier: Notifier::from_env(sinks),
    });

    let listener = tokio::net::TcpListener::bind(server_config.addr())
        .await
        .with_context(|| format!("Failed to bind {}", server_config.addr()))?;
    tracing::info!(addr = %server_config.addr(), "Valentine card server started");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

async fn play() -> anyhow::Result<()> {
    let session_config = SessionConfig::from_env();
    let submitter = Arc::new(HttpSubmitter::new(&session_config.server_url));

    eprintln!("💌 Valentine Card v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Answers go to: {}", submitter.endpoint());
    eprintln!("   Enter opens, then yes / no. 'quit' to exit.\n");

    let session = CardSession::new(session_config, submitter);
    terminal::run(session).await.context("Terminal session failed")?;

    Ok(())
}
