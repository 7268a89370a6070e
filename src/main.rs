use clap::Parser;
use signal_broker::api::handlers::router;
use signal_broker::broker::SignalBroker;
use signal_broker::config::cli::Cli;
use signal_broker::node::types::NodeAddress;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config()?;
    config.validate()?;

    // 1. Identity and store:
    let address = NodeAddress::local();
    tracing::info!("Starting node {} on {}", address, config.store.describe());

    let broker = SignalBroker::connect(&config.store, address, config.broker_options()).await?;

    // 2. Presence heartbeat:
    let heartbeat = broker
        .heartbeat(config.heartbeat_interval())
        .start();

    // 3. Inbox consumer. No transport is attached to this binary, so payloads are only logged.
    let consumer = broker
        .consumer(config.consumer_timeout(), |message| async move {
            tracing::info!("Received {} byte message", message.len());
            Ok(())
        })
        .start();

    // 4. Admin HTTP API:
    let app = router(broker.clone());
    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;

    tracing::info!("Admin API listening on {}", config.http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    // 5. Shutdown:
    tracing::info!("Shutting down");
    heartbeat.abort();
    consumer.abort();
    broker.detach_all().await;

    Ok(())
}
