//! Rule-based transponder alerting over a fixed watch-set.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// Canonical distress codes: hijack (7500), radio failure (7600),
/// emergency (7700).
const WATCH_CODES: [&str; 3] = ["7500", "7600", "7700"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub timestamp: DateTime<Utc>,
    pub code: String,
}

/// Stateless membership check over the watch-set. Repeated appearances of a
/// watched code each fire independently; at-most-once per (aircraft, code)
/// pair is guaranteed upstream by the dedup filter.
pub struct AlertEngine {
    watch_set: HashSet<String>,
}

impl AlertEngine {
    /// Watch-set of the canonical codes plus any configured extras (e.g. a
    /// test code used to exercise the notification path).
    pub fn new(extra_codes: &[String]) -> Self {
        let watch_set = WATCH_CODES
            .iter()
            .map(|code| code.to_string())
            .chain(extra_codes.iter().cloned())
            .collect();
        Self { watch_set }
    }

    /// Fires iff `code` is watched.
    pub fn check(&self, code: &str) -> Option<Alert> {
        self.watch_set.contains(code).then(|| Alert {
            timestamp: Utc::now(),
            code: code.to_string(),
        })
    }
}
