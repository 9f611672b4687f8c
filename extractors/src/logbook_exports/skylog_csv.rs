//! The app's own logbook export.
//!
//! One record per line, `;` separated, first line naming the columns. Text
//! fields write `;` as `|`, and line breaks inside a field continue on a new
//! physical line starting with `<`.

use crate::reassembly::{reassemble, ContinuationRule};
use shared_types::{
    CompleteLogbookExtractor, ExtractionError, FlightExtractor, FlightRecord, ImportedFlights,
    SourceFormat,
};
use std::collections::HashMap;

pub const FIELD_SEPARATOR: char = ';';
pub const ESCAPED_SEPARATOR: char = '|';
pub const CONTINUATION_MARKER: char = '<';

pub const COLUMNS: [&str; 23] = [
    "flightNumber",
    "origin",
    "destination",
    "timeOut",
    "timeIn",
    "aircraftType",
    "registration",
    "crew",
    "isPlanned",
    "isSim",
    "simMinutes",
    "remarks",
    "isPIC",
    "isCoPilot",
    "isPICUS",
    "isDual",
    "isInstructor",
    "isPF",
    "takeoffDay",
    "takeoffNight",
    "landingDay",
    "landingNight",
    "autoLand",
];

const REQUIRED_COLUMNS: [&str; 5] = ["flightNumber", "origin", "destination", "timeOut", "timeIn"];

pub fn escape(value: &str) -> String {
    value.replace(FIELD_SEPARATOR, &ESCAPED_SEPARATOR.to_string())
}

pub fn unescape(value: &str) -> String {
    value.replace(ESCAPED_SEPARATOR, &FIELD_SEPARATOR.to_string())
}

/// Column name -> position, taken from the header line
struct HeaderIndex {
    positions: HashMap<String, usize>,
    len: usize,
}

impl HeaderIndex {
    fn parse(header: &str) -> Self {
        let names: Vec<&str> = header.split(FIELD_SEPARATOR).map(str::trim).collect();
        Self {
            len: names.len(),
            positions: names
                .iter()
                .enumerate()
                .map(|(position, name)| (name.to_string(), position))
                .collect(),
        }
    }

    fn has(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }
}

/// A data line split into fields, addressed through the header index
struct Row<'a> {
    index: &'a HeaderIndex,
    fields: Vec<&'a str>,
}

impl<'a> Row<'a> {
    fn raw(&self, column: &str) -> Option<&'a str> {
        self.index
            .positions
            .get(column)
            .and_then(|&position| self.fields.get(position).copied())
    }

    fn text(&self, column: &str) -> String {
        self.raw(column).map(unescape).unwrap_or_default()
    }

    fn number<T: std::str::FromStr + Default>(&self, column: &str) -> Option<T> {
        match self.raw(column).map(str::trim) {
            None | Some("") => Some(T::default()),
            Some(value) => value.parse().ok(),
        }
    }

    fn flag(&self, column: &str) -> bool {
        matches!(self.raw(column).map(str::trim), Some("true") | Some("1"))
    }
}

fn parse_row(row: &Row) -> Option<FlightRecord> {
    let time_out: i64 = row.raw("timeOut")?.trim().parse().ok()?;
    let time_in: i64 = row.raw("timeIn")?.trim().parse().ok()?;
    if time_in <= time_out {
        return None;
    }

    let crew_names = row
        .text("crew")
        .split(FIELD_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    let is_simulator = row.flag("isSim");

    Some(FlightRecord {
        flight_number: row.text("flightNumber").trim().to_string(),
        origin: row.text("origin").trim().to_string(),
        destination: row.text("destination").trim().to_string(),
        time_out,
        time_in,
        aircraft_type: row.text("aircraftType"),
        registration: row.text("registration"),
        crew_names,
        is_planned: row.flag("isPlanned"),
        is_simulator,
        simulator_minutes: if is_simulator {
            row.number("simMinutes")?
        } else {
            0
        },
        remarks: row.text("remarks"),
        is_pic: row.flag("isPIC"),
        is_copilot: row.flag("isCoPilot"),
        is_picus: row.flag("isPICUS"),
        is_dual: row.flag("isDual"),
        is_instructor: row.flag("isInstructor"),
        is_pilot_flying: row.flag("isPF"),
        takeoffs_day: row.number("takeoffDay")?,
        takeoffs_night: row.number("takeoffNight")?,
        landings_day: row.number("landingDay")?,
        landings_night: row.number("landingNight")?,
        autolands: row.number("autoLand")?,
    })
}

/// Extractor for the app's own `;` separated logbook export
#[derive(Debug, Clone, Default)]
pub struct SkylogCsvExtractor;

impl SkylogCsvExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl CompleteLogbookExtractor for SkylogCsvExtractor {
    fn extract_logbook(
        &self,
        lines: &[String],
    ) -> Result<Option<Vec<FlightRecord>>, ExtractionError> {
        let logical = reassemble(lines, &ContinuationRule::MarkerPrefixed(CONTINUATION_MARKER));
        let mut numbered = logical
            .iter()
            .filter(|record| !record.text.trim().is_empty())
            .map(|record| (record.number, record.text.as_str()));

        let Some((_, header)) = numbered.next() else {
            return Ok(None);
        };
        let index = HeaderIndex::parse(header);
        if !REQUIRED_COLUMNS.iter().all(|column| index.has(column)) {
            return Ok(None);
        }

        let mut flights = Vec::new();
        for (line_number, line) in numbered {
            let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
            if fields.len() != index.len {
                tracing::warn!(
                    "Logbook export line {} has {} fields, header has {}",
                    line_number,
                    fields.len(),
                    index.len
                );
                return Err(ExtractionError::CorruptedData {
                    line: line_number,
                    expected: index.len,
                    found: fields.len(),
                });
            }

            let row = Row {
                index: &index,
                fields,
            };
            match parse_row(&row) {
                Some(flight) => flights.push(flight),
                None => tracing::debug!("Skipping unparsable logbook line {}", line_number),
            }
        }

        Ok(Some(flights))
    }
}

impl FlightExtractor for SkylogCsvExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::SkylogCsv
    }

    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError> {
        Ok(self
            .extract_logbook(lines)?
            .map(ImportedFlights::CompleteLogbook))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    const SAMPLE: &str = "\
flightNumber;origin;destination;timeOut;timeIn;aircraftType;registration;crew;isPlanned;isSim;simMinutes;remarks;isPIC;isCoPilot;isPICUS;isDual;isInstructor;isPF;takeoffDay;takeoffNight;landingDay;landingNight;autoLand
KL1587;EHAM;ENBR;1646207700;1646216700;E190;PH-EXA;SELF|Jongepier, Shahane;false;false;0;gusty| wet runway;true;false;false;false;false;true;1;0;1;0;0
;EHAM;EHAM;1646290800;1646305200;B738;;;false;true;240;LOFT
<second remark line;false;false;false;false;false;false;0;0;0;0;0";

    #[test]
    fn test_extract_sample() {
        let flights = SkylogCsvExtractor::new()
            .extract_logbook(&lines(SAMPLE))
            .unwrap()
            .unwrap();

        assert_eq!(flights.len(), 2);

        let flight = &flights[0];
        assert_eq!(flight.flight_number, "KL1587");
        assert_eq!(flight.origin, "EHAM");
        assert_eq!(flight.destination, "ENBR");
        assert_eq!(flight.time_in - flight.time_out, 9000);
        assert_eq!(flight.crew_names, vec!["SELF", "Jongepier, Shahane"]);
        assert_eq!(flight.remarks, "gusty; wet runway");
        assert!(flight.is_pic);
        assert!(flight.is_pilot_flying);
        assert_eq!(flight.takeoffs_day, 1);

        let sim = &flights[1];
        assert!(sim.is_simulator);
        assert_eq!(sim.simulator_minutes, 240);
        assert_eq!(sim.remarks, "LOFT\nsecond remark line");
        assert!(sim.crew_names.is_empty());
    }

    #[test]
    fn test_column_order_is_irrelevant() {
        let text = "timeIn;timeOut;destination;origin;flightNumber\n2000;1000;EHAM;ENBR;KL1588";
        let flights = SkylogCsvExtractor::new()
            .extract_logbook(&lines(text))
            .unwrap()
            .unwrap();

        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].origin, "ENBR");
        assert_eq!(flights[0].time_out, 1000);
        assert_eq!(flights[0].aircraft_type, "");
    }

    #[test]
    fn test_not_a_logbook_export() {
        let text = "KLM Cityhopper   Period: 02Mar22 - 27Mar22\nWed02\n";
        assert!(SkylogCsvExtractor::new()
            .extract_logbook(&lines(text))
            .unwrap()
            .is_none());
        assert!(SkylogCsvExtractor::new().extract_logbook(&[]).unwrap().is_none());
    }

    #[test]
    fn test_field_count_mismatch_is_corruption() {
        let text = "\
flightNumber;origin;destination;timeOut;timeIn
KL1587;EHAM;ENBR;1000;2000
KL1588;ENBR;EHAM;3000";

        let err = SkylogCsvExtractor::new()
            .extract_logbook(&lines(text))
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::CorruptedData {
                line: 3,
                expected: 5,
                found: 4
            }
        ));
    }

    #[test]
    fn test_corruption_reports_physical_line() {
        let text = "\
flightNumber;origin;destination;timeOut;timeIn;remarks
KL1587;EHAM;ENBR;1000;2000;r1
<r2
KL1588;ENBR;EHAM;3000;4000";

        let err = SkylogCsvExtractor::new()
            .extract_logbook(&lines(text))
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::CorruptedData {
                line: 4,
                expected: 6,
                found: 5
            }
        ));
    }

    #[test]
    fn test_bad_row_is_dropped() {
        let text = "\
flightNumber;origin;destination;timeOut;timeIn
KL1587;EHAM;ENBR;soon;2000
KL1588;ENBR;EHAM;3000;2000
KL1589;ENBR;EHAM;3000;4000";

        let flights = SkylogCsvExtractor::new()
            .extract_logbook(&lines(text))
            .unwrap()
            .unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].flight_number, "KL1589");
    }
}
