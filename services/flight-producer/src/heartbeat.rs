//! Periodic liveness sentinel for consumers sharing the ADS-B queue.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::dispatch::PublishRequest;

/// Queue a heartbeat at a fixed interval until the publisher hangs up.
///
/// The heartbeat bypasses classification and the dispatch buffer; the
/// publisher task sends it once and accepts its loss.
pub async fn run(publisher: mpsc::Sender<PublishRequest>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        if publisher.send(PublishRequest::Heartbeat).await.is_err() {
            break;
        }
    }
}
