//! Broker client over Redis lists, one durable list per message kind.
//!
//! Publishing is an `RPUSH`, consuming a `BLPOP`, so each queue is FIFO and a
//! delivered message is removed from the broker immediately (at-most-once
//! from the broker's perspective; duplicate suppression is the listeners'
//! concern).

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker connection failed: {0}")]
    Connect(#[source] redis::RedisError),
    #[error("broker command failed: {0}")]
    Command(#[source] redis::RedisError),
}

/// Terminal publish failure, raised once the retry bound is exhausted.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish to '{queue}' failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        queue: String,
        attempts: u32,
        #[source]
        last: redis::RedisError,
    },
}

/// The publish side of a broker connection, as the retry loop sees it.
pub trait PublishTransport {
    /// One publish attempt.
    fn send(&mut self, queue: &str, body: &str)
        -> impl Future<Output = Result<(), BrokerError>> + Send;
    /// Repair the connection between failed attempts.
    fn recover(&mut self) -> impl Future<Output = Result<(), BrokerError>> + Send;
}

/// Publish with a bounded attempt count and fixed backoff, recovering the
/// transport between attempts. On exhaustion the caller logs the terminal
/// error and drops the record; there is no persistent outbox.
pub async fn publish_with_retry<T: PublishTransport>(
    transport: &mut T,
    queue: &str,
    body: &str,
    attempts: u32,
    backoff: Duration,
) -> Result<(), PublishError> {
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match transport.send(queue, body).await {
            Ok(()) => return Ok(()),
            Err(BrokerError::Connect(e)) | Err(BrokerError::Command(e)) => e,
        };
        if attempt >= attempts {
            return Err(PublishError::RetriesExhausted {
                queue: queue.to_string(),
                attempts: attempt,
                last: error,
            });
        }
        warn!(
            "Publish to '{}' failed (attempt {}/{}), retrying: {}",
            queue, attempt, attempts, error
        );
        tokio::time::sleep(backoff).await;
        if let Err(e) = transport.recover().await {
            warn!("Broker reconnect failed: {}", e);
        }
    }
}

pub struct Broker {
    client: redis::Client,
    conn: redis::aio::MultiplexedConnection,
}

impl Broker {
    /// Connect and verify the broker is reachable.
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let client = redis::Client::open(url).map_err(BrokerError::Connect)?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(BrokerError::Connect)?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(BrokerError::Connect)?;
        Ok(Self { client, conn })
    }

    /// Replace the underlying connection after a failure.
    pub async fn reconnect(&mut self) -> Result<(), BrokerError> {
        self.conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(BrokerError::Connect)?;
        Ok(())
    }

    /// Publish one body to a queue, single attempt.
    pub async fn publish(&mut self, queue: &str, body: &str) -> Result<(), BrokerError> {
        let _: i64 = redis::cmd("RPUSH")
            .arg(queue)
            .arg(body)
            .query_async(&mut self.conn)
            .await
            .map_err(BrokerError::Command)?;
        Ok(())
    }

    /// Wait up to `timeout` for the next message on a queue. `None` means the
    /// wait elapsed, letting the caller check for shutdown and come back.
    pub async fn next_message(
        &mut self,
        queue: &str,
        timeout: Duration,
    ) -> Result<Option<String>, BrokerError> {
        let reply: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(queue)
            .arg(timeout.as_secs_f64())
            .query_async(&mut self.conn)
            .await
            .map_err(BrokerError::Command)?;
        Ok(reply.map(|(_queue, body)| body))
    }
}

impl PublishTransport for Broker {
    async fn send(&mut self, queue: &str, body: &str) -> Result<(), BrokerError> {
        self.publish(queue, body).await
    }

    async fn recover(&mut self) -> Result<(), BrokerError> {
        self.reconnect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn command_error() -> BrokerError {
        BrokerError::Command(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "simulated broker outage",
        )))
    }

    /// Fails the first `failures_left` sends, then succeeds.
    struct FlakyTransport {
        failures_left: u32,
        sends: u32,
        recoveries: u32,
    }

    impl FlakyTransport {
        fn new(failures_left: u32) -> Self {
            Self {
                failures_left,
                sends: 0,
                recoveries: 0,
            }
        }
    }

    impl PublishTransport for FlakyTransport {
        async fn send(&mut self, _queue: &str, _body: &str) -> Result<(), BrokerError> {
            self.sends += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(command_error());
            }
            Ok(())
        }

        async fn recover(&mut self) -> Result<(), BrokerError> {
            self.recoveries += 1;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_succeeds_within_retry_bound() {
        let mut transport = FlakyTransport::new(3);
        let backoff = Duration::from_secs(1);
        let start = Instant::now();

        let result =
            publish_with_retry(&mut transport, "transponder_queue", "body", 10, backoff).await;

        assert!(result.is_ok());
        assert_eq!(transport.sends, 4);
        assert_eq!(transport.recoveries, 3);
        // One fixed backoff per failed attempt, none after the success
        assert_eq!(start.elapsed(), backoff * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_yields_one_terminal_error() {
        let mut transport = FlakyTransport::new(u32::MAX);

        let result = publish_with_retry(
            &mut transport,
            "nav_data",
            "body",
            10,
            Duration::from_secs(1),
        )
        .await;

        match result {
            Err(PublishError::RetriesExhausted { queue, attempts, .. }) => {
                assert_eq!(queue, "nav_data");
                assert_eq!(attempts, 10);
            }
            Ok(()) => panic!("expected exhaustion"),
        }
        assert_eq!(transport.sends, 10);
        // No backoff or recovery follows the last attempt
        assert_eq!(transport.recoveries, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_is_clamped_to_one() {
        let mut transport = FlakyTransport::new(u32::MAX);

        let result = publish_with_retry(
            &mut transport,
            "adsb_data_queue",
            "body",
            0,
            Duration::from_secs(1),
        )
        .await;

        assert!(matches!(
            result,
            Err(PublishError::RetriesExhausted { attempts: 1, .. })
        ));
        assert_eq!(transport.sends, 1);
        assert_eq!(transport.recoveries, 0);
    }
}
