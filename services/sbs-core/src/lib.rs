//! Shared message model and broker client for the SBS-1 feed pipeline.
//!
//! The producer and the queue listeners agree on three things: the set of
//! message kinds and their queue topology, the comma-joined wire body of a
//! record, and the broker client used to move bodies around. All three live
//! here.

pub mod broker;
pub mod message;
