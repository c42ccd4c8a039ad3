//! Configuration loaded from environment variables

/// Producer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Hostname of the SBS-1 feed (e.g. a PiAware receiver)
    pub feed_host: String,

    /// TCP port of the feed (30003 is the BaseStation convention)
    pub feed_port: u16,

    /// Broker URL for the per-kind queues
    pub broker_url: String,

    /// Close the feed connection after this many seconds without data
    pub idle_timeout_secs: u64,

    /// Interval between liveness heartbeats on the ADS-B queue
    pub heartbeat_interval_secs: u64,

    /// Dispatch buffer capacity (records per read cycle)
    pub buffer_capacity: usize,

    /// Publish retry bound before a record is dropped
    pub publish_retry_attempts: u32,

    /// Fixed backoff between publish retries, in milliseconds
    pub publish_retry_backoff_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            feed_host: std::env::var("FEED_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),

            feed_port: std::env::var("FEED_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30003),

            broker_url: std::env::var("BROKER_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            idle_timeout_secs: std::env::var("FEED_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1500),

            heartbeat_interval_secs: std::env::var("HEARTBEAT_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            buffer_capacity: std::env::var("BUFFER_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),

            publish_retry_attempts: std::env::var("PUBLISH_RETRY_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            publish_retry_backoff_ms: std::env::var("PUBLISH_RETRY_BACKOFF_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        }
    }
}
