//! Per-cycle dispatch buffer feeding the publisher task.

use sbs_core::message::MessageKind;
use thiserror::Error;
use tokio::sync::mpsc;

/// A publish request handed to the publisher task.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishRequest {
    /// A classified record body for the queue bound to `kind`.
    Record { kind: MessageKind, body: String },
    /// The liveness sentinel, sent once without retry.
    Heartbeat,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch buffer full ({capacity} records), {kind} record rejected")]
    BufferFull {
        kind: MessageKind,
        capacity: usize,
    },
}

/// Bounded FIFO buffer holding one read cycle's classified records.
///
/// The buffer is drained completely after every cycle, so the bound only
/// matters when a single cycle produces more than `capacity` lines. A full
/// buffer rejects instead of blocking; the caller logs the rejection.
pub struct DispatchBuffer {
    entries: Vec<(MessageKind, String)>,
    capacity: usize,
}

impl DispatchBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, kind: MessageKind, body: String) -> Result<(), DispatchError> {
        if self.entries.len() >= self.capacity {
            return Err(DispatchError::BufferFull {
                kind,
                capacity: self.capacity,
            });
        }
        self.entries.push((kind, body));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain completely, in arrival order, into the publisher channel.
    pub async fn flush(&mut self, publisher: &mpsc::Sender<PublishRequest>) {
        for (kind, body) in self.entries.drain(..) {
            if publisher
                .send(PublishRequest::Record { kind, body })
                .await
                .is_err()
            {
                // Publisher task gone, we are shutting down
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rejects_on_overflow() {
        let mut buffer = DispatchBuffer::new(2);
        buffer
            .push(MessageKind::Transponder, "a".to_string())
            .unwrap();
        buffer
            .push(MessageKind::Transponder, "b".to_string())
            .unwrap();
        assert!(matches!(
            buffer.push(MessageKind::Transponder, "c".to_string()),
            Err(DispatchError::BufferFull { capacity: 2, .. })
        ));
        assert_eq!(buffer.len(), 2);
    }

    #[tokio::test]
    async fn test_flush_preserves_arrival_order() {
        let (tx, mut rx) = mpsc::channel(10);
        let mut buffer = DispatchBuffer::new(10);
        buffer
            .push(MessageKind::Transponder, "first".to_string())
            .unwrap();
        buffer
            .push(MessageKind::PositionReport, "second".to_string())
            .unwrap();
        buffer
            .push(MessageKind::Velocity, "third".to_string())
            .unwrap();

        buffer.flush(&tx).await;
        assert!(buffer.is_empty());

        let bodies: Vec<String> = [rx.recv().await, rx.recv().await, rx.recv().await]
            .into_iter()
            .map(|request| match request {
                Some(PublishRequest::Record { body, .. }) => body,
                other => panic!("unexpected request: {:?}", other),
            })
            .collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
    }
}
