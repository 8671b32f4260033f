//! MaxDigi Webhook Server
//!
//! Serves the DigiFlazz status callback endpoint and logs every accepted
//! transaction status update.

use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;

use maxdigi::webhook::{webhook_router, LoggingPublisher, WebhookState, WebhookVerifier};
use maxdigi::Config;

/// MaxDigi Webhook Server
#[derive(Parser, Debug)]
#[command(name = "maxdigi-webhook")]
#[command(version)]
#[command(about = "Inbound webhook endpoint for DigiFlazz transaction status callbacks")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3100")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let state = Arc::new(WebhookState::new(
        WebhookVerifier::new(config.webhook_secret.clone()),
        Arc::new(LoggingPublisher),
    ));
    let app = webhook_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("MaxDigi webhook server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
