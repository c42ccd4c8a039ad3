//! SBS-1 line classification and positional field extraction.

use sbs_core::message::{MessageKind, ParsedRecord};

/// Classify a raw line by its five-character kind code and kind-specific
/// minimum length.
///
/// Lines failing either check return `None` and are skipped upstream. This is
/// a deliberate filter: most feed traffic is uninteresting, not anomalous.
pub fn classify(line: &str) -> Option<MessageKind> {
    MessageKind::ALL
        .into_iter()
        .find(|kind| line.len() >= kind.min_line_len() && line.starts_with(kind.prefix()))
}

/// Extract the kind-specific positional fields from a classified line.
///
/// Field indices follow the BaseStation convention: ICAO id at 4, date at 6,
/// timestamp at 7, then the kind-specific tail. Returns `None` when the line
/// has too few fields to index; such lines are never published.
pub fn extract(line: &str, kind: MessageKind) -> Option<ParsedRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    let field = |index: usize| fields.get(index).map(|s| s.to_string());

    let type_msg = format!("{}{}", fields.first()?, fields.get(1)?);
    let aircraft_icao_id = field(4)?;
    let first_date = field(6)?;
    let first_timestamp = field(7)?;

    let extra = match kind {
        MessageKind::PositionReport => vec![field(11)?, field(14)?, field(15)?],
        MessageKind::Velocity => vec![field(12)?, field(13)?],
        MessageKind::Transponder => vec![field(17)?],
        // The company id is the first three characters of the callsign field
        MessageKind::Identification => {
            vec![fields.get(10)?.chars().take(3).collect()]
        }
    };

    Some(ParsedRecord {
        kind,
        type_msg,
        aircraft_icao_id,
        first_date,
        first_timestamp,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A MSG,3 line of exactly 104 characters with altitude at field 11,
    /// latitude at 14 and longitude at 15.
    fn sample_position_line() -> String {
        let mut fields = vec![""; 22];
        fields[0] = "MSG";
        fields[1] = "3";
        fields[2] = "1";
        fields[3] = "1";
        fields[4] = "ABC123";
        fields[5] = "1";
        fields[6] = "2023/09/26";
        fields[7] = "10:00:00";
        fields[8] = "2023/09/26";
        fields[9] = "10:00:00";
        fields[11] = "5000";
        fields[14] = "40.1";
        fields[15] = "-73.9";
        let mut line = fields.join(",");
        while line.len() < 104 {
            line.push('0');
        }
        line
    }

    fn sample_line(prefix: &str, len: usize) -> String {
        let mut fields = vec![""; 22];
        fields[0] = "MSG";
        fields[1] = &prefix[4..5];
        fields[4] = "XYZ999";
        fields[6] = "2023/09/26";
        fields[7] = "10:00:00";
        fields[10] = "UAL1234Z";
        fields[12] = "450";
        fields[13] = "180";
        fields[17] = "7700";
        let mut line = fields.join(",");
        while line.len() < len {
            line.push('0');
        }
        line
    }

    #[test]
    fn test_classify_position_report() {
        let line = sample_position_line();
        assert_eq!(line.len(), 104);
        assert_eq!(classify(&line), Some(MessageKind::PositionReport));
    }

    #[test]
    fn test_classify_rejects_short_lines() {
        // Same prefix, one byte short of the kind minimum
        let mut line = sample_position_line();
        line.truncate(103);
        assert_eq!(classify(&line), None);

        let mut line = sample_line("MSG,6", 86);
        line.truncate(85);
        assert_eq!(classify(&line), None);
    }

    #[test]
    fn test_classify_rejects_unknown_prefixes() {
        // MSG,2 (surface position) is not a handled kind
        let line = sample_line("MSG,2", 104);
        assert_eq!(classify(&line), None);

        let mut line = sample_position_line();
        line.replace_range(0..5, "STA,1");
        assert_eq!(classify(&line), None);
    }

    #[test]
    fn test_extract_position_report_fields_in_order() {
        let line = sample_position_line();
        let record = extract(&line, MessageKind::PositionReport).unwrap();
        assert_eq!(
            record.csv_fields(),
            vec![
                "MSG3",
                "ABC123",
                "2023/09/26",
                "10:00:00",
                "5000",
                "40.1",
                "-73.9"
            ]
        );
        assert_eq!(record.csv_fields().len(), 7);
    }

    #[test]
    fn test_extract_transponder_and_velocity() {
        let line = sample_line("MSG,6", 86);
        let record = extract(&line, MessageKind::Transponder).unwrap();
        assert_eq!(record.type_msg, "MSG6");
        assert_eq!(record.extra, vec!["7700"]);

        let line = sample_line("MSG,4", 86);
        let record = extract(&line, MessageKind::Velocity).unwrap();
        assert_eq!(record.extra, vec!["450", "180"]);
    }

    #[test]
    fn test_extract_identification_truncates_company_id() {
        let line = sample_line("MSG,1", 86);
        let record = extract(&line, MessageKind::Identification).unwrap();
        assert_eq!(record.extra, vec!["UAL"]);
    }

    #[test]
    fn test_extract_rejects_lines_with_too_few_fields() {
        assert_eq!(extract("MSG,6,1,1", MessageKind::Transponder), None);
    }

    #[test]
    fn test_end_to_end_example_body() {
        let line = sample_position_line();
        let kind = classify(&line).unwrap();
        let record = extract(&line, kind).unwrap();
        assert_eq!(
            record.to_body(),
            "MSG3,ABC123,2023/09/26,10:00:00,5000,40.1,-73.9"
        );
        assert_eq!(kind.queue(), "adsb_data_queue");
    }
}
