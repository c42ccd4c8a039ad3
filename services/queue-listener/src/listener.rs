//! Queue consumption: dedup, sink forwarding, and the transponder alert
//! check.
//!
//! Per message the loop is Idle -> Receiving -> (Duplicate | New) -> Idle:
//! discard the heartbeat sentinel, decode, suppress duplicates by key, append
//! new records to the sink, and for the transponder queue run the alert
//! engine. Dedup runs before the alert check, so one (aircraft, code) pair
//! alerts at most once per listener.

use std::collections::HashSet;

use sbs_core::message::{MessageKind, ParsedRecord, HEARTBEAT_BODY};
use tracing::{debug, error, info};

use crate::alert::{Alert, AlertEngine};
use crate::dedup::DedupStore;
use crate::notify::EmailNotifier;
use crate::sink::CsvSink;

/// What to do with one delivered message body.
#[derive(Debug, PartialEq)]
pub enum Disposition {
    /// Liveness sentinel, discarded before field parsing.
    Heartbeat,
    /// Body did not match the kind's field layout.
    Malformed,
    /// Dedup key already seen; no sink write, no alert.
    Duplicate,
    /// New record to append, with an alert if its transponder code is
    /// watched.
    Store {
        record: ParsedRecord,
        alert: Option<Alert>,
    },
}

/// Decide the fate of one message body.
pub fn evaluate(
    kind: MessageKind,
    body: &str,
    dedup: &mut DedupStore,
    alerts: &AlertEngine,
) -> Disposition {
    if body == HEARTBEAT_BODY {
        return Disposition::Heartbeat;
    }

    let record = match ParsedRecord::from_body(kind, body) {
        Ok(record) => record,
        Err(_) => return Disposition::Malformed,
    };

    if let Some(key) = record.dedup_key() {
        if !dedup.insert(&key) {
            return Disposition::Duplicate;
        }
    }

    let alert = match kind {
        MessageKind::Transponder => record
            .extra
            .first()
            .and_then(|code| alerts.check(code)),
        _ => None,
    };

    Disposition::Store { record, alert }
}

/// Per-record progress line. The velocity queue spells out its payload
/// fields; every other kind uses the generic form.
fn progress_line(kind: MessageKind, record: &ParsedRecord) -> String {
    match kind {
        MessageKind::Velocity => format!(
            "Received ADSB data (speed, heading) for aircraft ICAO ID: {} / {}",
            record.aircraft_icao_id,
            record.extra.join(" / ")
        ),
        _ => format!(
            "Received data for aircraft ICAO ID: {} / {}",
            record.aircraft_icao_id,
            record.extra.join(" / ")
        ),
    }
}

/// One listener bound to one queue kind.
pub struct Listener {
    kind: MessageKind,
    dedup: DedupStore,
    alerts: AlertEngine,
    sink: CsvSink,
    notifier: EmailNotifier,
    /// Distinct company ids seen (identification queue only)
    company_ids: HashSet<String>,
}

impl Listener {
    pub fn new(
        kind: MessageKind,
        dedup: DedupStore,
        alerts: AlertEngine,
        sink: CsvSink,
        notifier: EmailNotifier,
    ) -> Self {
        Self {
            kind,
            dedup,
            alerts,
            sink,
            notifier,
            company_ids: HashSet::new(),
        }
    }

    /// Handle one delivered body. Every failure is isolated to the message;
    /// nothing here takes the loop down.
    pub async fn handle(&mut self, body: &str) {
        match evaluate(self.kind, body, &mut self.dedup, &self.alerts) {
            Disposition::Heartbeat => {}
            Disposition::Malformed => {
                debug!("Skipping malformed body: {}", body);
            }
            Disposition::Duplicate => {
                debug!("Duplicate record discarded ({} keys tracked)", self.dedup.len());
            }
            Disposition::Store { record, alert } => {
                info!("{}", progress_line(self.kind, &record));

                if self.kind == MessageKind::Identification {
                    if let Some(company) = record.extra.first() {
                        if self.company_ids.insert(company.clone()) {
                            info!("Count of unique company IDs: {}", self.company_ids.len());
                        }
                    }
                }

                if let Err(e) = self.sink.append(&record.csv_fields()) {
                    error!("{}", e);
                }

                if let Some(alert) = alert {
                    let timestamp = alert.timestamp.format("%Y-%m-%d %H:%M:%S");
                    info!(
                        "Transponder alert at: {}, transponder: {}",
                        timestamp, alert.code
                    );
                    self.notifier
                        .notify(
                            &format!("Transponder Alert: {} received", alert.code),
                            &format!("Timestamp: {}, Transponder: {}", timestamp, alert.code),
                        )
                        .await;
                }
            }
        }
    }
}
