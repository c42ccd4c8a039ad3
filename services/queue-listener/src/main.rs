//! Queue listener - consumes one per-kind broker queue, deduplicates
//! records, appends unique ones to a CSV sink, and raises transponder alerts.
//!
//! Run one process per queue, selecting the kind with `LISTENER_KIND`.

mod alert;
mod config;
mod dedup;
mod listener;
mod notify;
mod sink;

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alert::AlertEngine;
use config::Config;
use dedup::DedupStore;
use listener::Listener;
use notify::EmailNotifier;
use sbs_core::broker::Broker;
use sink::CsvSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    info!("===========================================");
    info!("   Queue Listener - {} messages", config.kind);
    info!("===========================================");
    info!("Configuration:");
    info!("  Queue: {}", config.kind.queue());
    info!("  Broker: {}", config.broker_url);
    info!("  Output: {}", config.output_dir.display());
    info!("  Dedup capacity: {}", config.dedup_capacity);

    let notifier = match &config.smtp {
        Some(smtp) => EmailNotifier::from_config(Some(smtp)),
        None => EmailNotifier::disabled(),
    };
    if !notifier.is_enabled() {
        info!("No SMTP settings configured, alerts will be logged only");
    }

    let sink = CsvSink::new(&config.output_dir, config.kind);
    info!("  Sink file: {}", sink.path().display());
    let mut listener = Listener::new(
        config.kind,
        DedupStore::new(config.dedup_capacity),
        AlertEngine::new(&config.alert_extra_codes),
        sink,
        notifier,
    );

    let mut broker = Broker::connect(&config.broker_url).await?;
    info!("Connected to broker at {}", config.broker_url);
    info!(
        "{} listener is waiting for messages on '{}'. To exit, press Ctrl+C",
        config.kind,
        config.kind.queue()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down");
                break;
            }
            message = broker.next_message(config.kind.queue(), Duration::from_secs(1)) => {
                match message {
                    Ok(Some(body)) => listener.handle(&body).await,
                    Ok(None) => {} // wait elapsed, check for shutdown again
                    Err(e) => {
                        error!("{}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        if let Err(e) = broker.reconnect().await {
                            error!("Broker reconnect failed: {}", e);
                        }
                    }
                }
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}
