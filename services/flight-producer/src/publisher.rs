//! Publisher task: the single writer to the broker connection.
//!
//! The main loop and the heartbeat task both feed this task through one mpsc
//! channel, which serializes every publish without a lock around the
//! connection handle.

use std::time::Duration;

use sbs_core::broker::{publish_with_retry, Broker};
use sbs_core::message::{MessageKind, HEARTBEAT_BODY};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::dispatch::PublishRequest;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

/// Drain publish requests until all senders hang up.
///
/// Records get bounded retry and are dropped with a terminal error once the
/// bound is exhausted. The heartbeat is sent once; its loss is acceptable.
pub async fn run(
    mut broker: Broker,
    mut requests: mpsc::Receiver<PublishRequest>,
    retry: RetryPolicy,
) {
    while let Some(request) = requests.recv().await {
        match request {
            PublishRequest::Record { kind, body } => {
                match publish_with_retry(
                    &mut broker,
                    kind.queue(),
                    &body,
                    retry.attempts,
                    retry.backoff,
                )
                .await
                {
                    Ok(()) => info!("{}", body),
                    Err(e) => error!("{}", e),
                }
            }
            PublishRequest::Heartbeat => {
                match broker
                    .publish(MessageKind::PositionReport.queue(), HEARTBEAT_BODY)
                    .await
                {
                    Ok(()) => info!("Sent heartbeat message"),
                    Err(e) => warn!("Failed to send heartbeat message: {}", e),
                }
            }
        }
    }
}
