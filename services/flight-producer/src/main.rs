//! Flight data producer - reads the SBS-1 feed over TCP, classifies each
//! line, and publishes typed records to per-kind broker queues.

mod classify;
mod config;
mod dispatch;
mod feed;
mod heartbeat;
mod publisher;

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use dispatch::{DispatchBuffer, PublishRequest};
use feed::{FeedError, FeedReader};
use sbs_core::broker::Broker;

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

    info!("===========================================");
    info!("   Flight Data Producer - SBS-1 feed");
    info!("===========================================");

    let config = Config::from_env();
    info!("Configuration:");
    info!("  Feed: {}:{}", config.feed_host, config.feed_port);
    info!("  Broker: {}", config.broker_url);
    info!("  Idle timeout: {}s", config.idle_timeout_secs);
    info!("  Heartbeat interval: {}s", config.heartbeat_interval_secs);
    info!("  Buffer capacity: {}", config.buffer_capacity);

    let mut feed = match FeedReader::connect(
        &config.feed_host,
        config.feed_port,
        Duration::from_secs(config.idle_timeout_secs),
    )
    .await
    {
        Ok(feed) => feed,
        Err(e) => {
            error!("{}. Make sure the receiver is running and the address is correct.", e);
            return Err(e.into());
        }
    };

    let broker = Broker::connect(&config.broker_url).await?;
    info!("Connected to broker at {}", config.broker_url);

    // Single-writer channel into the publisher task; the main loop and the
    // heartbeat task never touch the broker connection directly
    let (publish_tx, publish_rx) = mpsc::channel::<PublishRequest>(config.buffer_capacity);
    let publisher_handle = tokio::spawn(publisher::run(
        broker,
        publish_rx,
        publisher::RetryPolicy {
            attempts: config.publish_retry_attempts,
            backoff: Duration::from_millis(config.publish_retry_backoff_ms),
        },
    ));

    let heartbeat_handle = tokio::spawn(heartbeat::run(
        publish_tx.clone(),
        Duration::from_secs(config.heartbeat_interval_secs),
    ));

    let mut buffer = DispatchBuffer::new(config.buffer_capacity);

    // Main read / classify / dispatch loop
    loop {
        let lines = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down");
                break;
            }
            chunk = feed.read_chunk() => match chunk {
                Ok(lines) => lines,
                Err(e @ (FeedError::StreamClosed | FeedError::StreamTimeout(_))) => {
                    info!("{}", e);
                    break;
                }
                Err(e) => {
                    error!("{}", e);
                    break;
                }
            }
        };

        for line in lines {
            let Some(kind) = classify::classify(&line) else {
                continue;
            };
            let Some(record) = classify::extract(&line, kind) else {
                continue;
            };
            if let Err(e) = buffer.push(kind, record.to_body()) {
                warn!("{}", e);
            }
        }

        // Drain the cycle's records, in arrival order, before the next read
        if !buffer.is_empty() {
            debug!("Flushing {} records", buffer.len());
            buffer.flush(&publish_tx).await;
        }
    }

    // Let the publisher drain what is already queued, then exit
    heartbeat_handle.abort();
    drop(publish_tx);
    let _ = publisher_handle.await;

    info!("Shutdown complete");
    Ok(())
}
