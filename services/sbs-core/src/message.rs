//! Message kinds, parsed records, and the static queue topology.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reserved message body signalling producer liveness. Never carries
/// telemetry; listeners discard it before field parsing.
pub const HEARTBEAT_BODY: &str = "Heartbeat Message";

/// Classification tag assigned to an SBS-1 line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// MSG,6 - surveillance reply with the transponder (squawk) code
    Transponder,
    /// MSG,3 - airborne position with altitude, latitude, longitude
    PositionReport,
    /// MSG,1 - identification message carrying the callsign / company id
    Identification,
    /// MSG,4 - airborne velocity with speed and heading
    Velocity,
}

impl MessageKind {
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Transponder,
        MessageKind::PositionReport,
        MessageKind::Identification,
        MessageKind::Velocity,
    ];

    /// Five-character kind code at the start of a raw line.
    pub fn prefix(&self) -> &'static str {
        match self {
            MessageKind::Transponder => "MSG,6",
            MessageKind::PositionReport => "MSG,3",
            MessageKind::Identification => "MSG,1",
            MessageKind::Velocity => "MSG,4",
        }
    }

    /// Minimum raw line length for this kind to be accepted by the
    /// classifier. Shorter lines are filtered out, not errors.
    pub fn min_line_len(&self) -> usize {
        match self {
            MessageKind::PositionReport => 104,
            _ => 86,
        }
    }

    /// Durable queue bound to this kind. The mapping is static, one-to-one,
    /// and never changes at runtime; the names are part of the wire contract.
    pub fn queue(&self) -> &'static str {
        match self {
            MessageKind::Transponder => "transponder_queue",
            MessageKind::PositionReport => "adsb_data_queue",
            MessageKind::Identification => "aircraft_icao_id_queue",
            MessageKind::Velocity => "nav_data",
        }
    }

    /// Header row for the CSV sink of this kind. Field count and order match
    /// the wire body exactly.
    pub fn csv_headers(&self) -> &'static [&'static str] {
        match self {
            MessageKind::Transponder => &[
                "type_msg",
                "aircraft_icao_id",
                "first_date",
                "first_timestamp",
                "transponder",
            ],
            MessageKind::PositionReport => &[
                "type_msg",
                "aircraft_icao_id",
                "first_date",
                "first_timestamp",
                "altitude",
                "latitude",
                "longitude",
            ],
            MessageKind::Identification => &[
                "type_msg",
                "aircraft_icao_id",
                "first_date",
                "first_timestamp",
                "company_id",
            ],
            MessageKind::Velocity => &[
                "type_msg",
                "aircraft_icao_id",
                "first_date",
                "first_timestamp",
                "speed",
                "heading",
            ],
        }
    }

    /// Destination file for the CSV sink of this kind.
    pub fn csv_filename(&self) -> &'static str {
        match self {
            MessageKind::Transponder => "transponder_messages.csv",
            MessageKind::PositionReport => "adsb_data_messages.csv",
            MessageKind::Identification => "aircraft_icao_id_messages.csv",
            MessageKind::Velocity => "nav_data_messages.csv",
        }
    }

    /// Number of comma-separated fields in a record body of this kind.
    pub fn field_count(&self) -> usize {
        self.csv_headers().len()
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Transponder => "transponder",
            MessageKind::PositionReport => "position",
            MessageKind::Identification => "identification",
            MessageKind::Velocity => "velocity",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transponder" => Ok(MessageKind::Transponder),
            "position" => Ok(MessageKind::PositionReport),
            "identification" => Ok(MessageKind::Identification),
            "velocity" => Ok(MessageKind::Velocity),
            other => Err(format!(
                "unknown message kind '{}' (expected transponder, position, identification or velocity)",
                other
            )),
        }
    }
}

/// A typed record extracted from one raw feed line.
///
/// `extra` holds the kind-specific tail fields, in the order declared by the
/// kind's CSV header (altitude/lat/lon, speed/heading, transponder code, or
/// company id).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub kind: MessageKind,
    /// Concatenation of the first two raw fields, e.g. "MSG3".
    pub type_msg: String,
    pub aircraft_icao_id: String,
    pub first_date: String,
    pub first_timestamp: String,
    pub extra: Vec<String>,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected {expected} fields for a {kind} body, got {got}")]
    FieldCount {
        kind: MessageKind,
        expected: usize,
        got: usize,
    },
}

impl ParsedRecord {
    /// Comma-joined wire body, in the fixed per-kind field order.
    pub fn to_body(&self) -> String {
        let mut fields = Vec::with_capacity(self.kind.field_count());
        fields.push(self.type_msg.as_str());
        fields.push(self.aircraft_icao_id.as_str());
        fields.push(self.first_date.as_str());
        fields.push(self.first_timestamp.as_str());
        fields.extend(self.extra.iter().map(|s| s.as_str()));
        fields.join(",")
    }

    /// Parse a queue message body back into a record. The field count must
    /// match the kind's declared layout exactly.
    pub fn from_body(kind: MessageKind, body: &str) -> Result<Self, RecordError> {
        let fields: Vec<&str> = body.split(',').collect();
        let expected = kind.field_count();
        if fields.len() != expected {
            return Err(RecordError::FieldCount {
                kind,
                expected,
                got: fields.len(),
            });
        }
        Ok(Self {
            kind,
            type_msg: fields[0].to_string(),
            aircraft_icao_id: fields[1].to_string(),
            first_date: fields[2].to_string(),
            first_timestamp: fields[3].to_string(),
            extra: fields[4..].iter().map(|s| s.to_string()).collect(),
        })
    }

    /// All fields in CSV column order.
    pub fn csv_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.type_msg.clone(),
            self.aircraft_icao_id.clone(),
            self.first_date.clone(),
            self.first_timestamp.clone(),
        ];
        fields.extend(self.extra.iter().cloned());
        fields
    }

    /// Composite identity used to suppress repeat records, or `None` for
    /// kinds that write every record unconditionally (position reports).
    pub fn dedup_key(&self) -> Option<String> {
        match self.kind {
            MessageKind::PositionReport => None,
            _ => {
                let mut key = self.aircraft_icao_id.clone();
                for field in &self.extra {
                    key.push('-');
                    key.push_str(field);
                }
                Some(key)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_topology_is_one_to_one() {
        let queues: std::collections::HashSet<&str> =
            MessageKind::ALL.iter().map(|k| k.queue()).collect();
        assert_eq!(queues.len(), MessageKind::ALL.len());
    }

    #[test]
    fn test_headers_match_field_count() {
        assert_eq!(MessageKind::PositionReport.field_count(), 7);
        assert_eq!(MessageKind::Velocity.field_count(), 6);
        assert_eq!(MessageKind::Transponder.field_count(), 5);
        assert_eq!(MessageKind::Identification.field_count(), 5);
    }

    #[test]
    fn test_body_round_trip() {
        let body = "MSG6,ABC123,2023/09/26,10:00:00,7700";
        let record = ParsedRecord::from_body(MessageKind::Transponder, body).unwrap();
        assert_eq!(record.aircraft_icao_id, "ABC123");
        assert_eq!(record.extra, vec!["7700"]);
        assert_eq!(record.to_body(), body);
    }

    #[test]
    fn test_from_body_rejects_wrong_field_count() {
        let err = ParsedRecord::from_body(MessageKind::PositionReport, "MSG3,ABC123,too,short");
        assert!(matches!(
            err,
            Err(RecordError::FieldCount { expected: 7, got: 4, .. })
        ));
    }

    #[test]
    fn test_dedup_key_per_kind() {
        let transponder = ParsedRecord::from_body(
            MessageKind::Transponder,
            "MSG6,XYZ999,2023/09/26,10:00:00,7700",
        )
        .unwrap();
        assert_eq!(transponder.dedup_key().as_deref(), Some("XYZ999-7700"));

        let velocity = ParsedRecord::from_body(
            MessageKind::Velocity,
            "MSG4,XYZ999,2023/09/26,10:00:00,450,180",
        )
        .unwrap();
        assert_eq!(velocity.dedup_key().as_deref(), Some("XYZ999-450-180"));

        let position = ParsedRecord::from_body(
            MessageKind::PositionReport,
            "MSG3,XYZ999,2023/09/26,10:00:00,5000,40.1,-73.9",
        )
        .unwrap();
        assert_eq!(position.dedup_key(), None);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            "transponder".parse::<MessageKind>().unwrap(),
            MessageKind::Transponder
        );
        assert!("squawk".parse::<MessageKind>().is_err());
    }
}
