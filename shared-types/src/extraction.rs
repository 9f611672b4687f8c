use crate::{CoveringPeriod, FlightRecord, ReferenceData};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// Extractor for self-describing exports that carry a complete logbook
pub trait CompleteLogbookExtractor {
    /// `Ok(None)` when the lines are not in this extractor's format
    fn extract_logbook(&self, lines: &[String])
        -> Result<Option<Vec<FlightRecord>>, ExtractionError>;
}

/// Extractor for documents listing flown flights over a bounded period
pub trait CompletedFlightsExtractor {
    fn extract_completed(&self, lines: &[String])
        -> Result<Option<CompletedFlights>, ExtractionError>;
}

/// Extractor for documents listing a future schedule
pub trait PlannedFlightsExtractor {
    fn extract_planned(&self, lines: &[String])
        -> Result<Option<PlannedFlights>, ExtractionError>;
}

/// Object-safe view over the three capability traits, used by the dispatcher
pub trait FlightExtractor: Send + Sync {
    /// Which source format this extractor understands
    fn format(&self) -> SourceFormat;

    /// Extract from raw lines; `Ok(None)` means "not my format, try the next one"
    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError>;

    /// Get extractor version for tracking
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

/// Extraction error types
///
/// A format mismatch is not an error: extractors return `Ok(None)` for it, and
/// single unparsable lines are dropped without surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Corrupted data on line {line}: expected {expected} fields, found {found}")]
    CorruptedData {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    SkylogCsv,
    MccPilotLog,
    LogTenPro,
    KlcRoster,
    KlmIcaRoster,
    KlcBriefing,
    KlmMonthly,
    KlcMonthly,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 8] = [
        SourceFormat::SkylogCsv,
        SourceFormat::MccPilotLog,
        SourceFormat::LogTenPro,
        SourceFormat::KlcRoster,
        SourceFormat::KlmIcaRoster,
        SourceFormat::KlcBriefing,
        SourceFormat::KlmMonthly,
        SourceFormat::KlcMonthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::SkylogCsv => "skylog-csv",
            SourceFormat::MccPilotLog => "mcc-pilot-log",
            SourceFormat::LogTenPro => "log-ten-pro",
            SourceFormat::KlcRoster => "klc-roster",
            SourceFormat::KlmIcaRoster => "klm-ica-roster",
            SourceFormat::KlcBriefing => "klc-briefing",
            SourceFormat::KlmMonthly => "klm-monthly",
            SourceFormat::KlcMonthly => "klc-monthly",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| ExtractionError::InvalidInput(format!("Unknown source format: {s}")))
    }
}

/// Flown flights plus the period they are asserted to cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CompletedFlights {
    pub flights: Vec<FlightRecord>,
    pub period: CoveringPeriod,
}

/// Scheduled flights plus the period of the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct PlannedFlights {
    pub flights: Vec<FlightRecord>,
    pub period: CoveringPeriod,
}

/// Outcome of a successful extraction, tagged by capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ImportedFlights {
    CompleteLogbook(Vec<FlightRecord>),
    CompletedFlights(CompletedFlights),
    PlannedFlights(PlannedFlights),
}

impl ImportedFlights {
    pub fn flights(&self) -> &[FlightRecord] {
        match self {
            ImportedFlights::CompleteLogbook(flights) => flights,
            ImportedFlights::CompletedFlights(completed) => &completed.flights,
            ImportedFlights::PlannedFlights(planned) => &planned.flights,
        }
    }

    pub fn period(&self) -> Option<CoveringPeriod> {
        match self {
            ImportedFlights::CompleteLogbook(_) => None,
            ImportedFlights::CompletedFlights(completed) => Some(completed.period),
            ImportedFlights::PlannedFlights(planned) => Some(planned.period),
        }
    }
}

/// Everything an extractor may read besides its input lines
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    /// "Now" anchor for formats that do not declare their own period
    pub reference_date: NaiveDate,
    pub reference_data: ReferenceData,
}

impl ExtractionContext {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            reference_data: ReferenceData::default(),
        }
    }

    pub fn with_reference_data(mut self, reference_data: ReferenceData) -> Self {
        self.reference_data = reference_data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_serialization() {
        let json = serde_json::to_string(&SourceFormat::KlmIcaRoster).unwrap();
        assert_eq!(json, "\"klm-ica-roster\"");

        let deserialized: SourceFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, SourceFormat::KlmIcaRoster);
    }

    #[test]
    fn test_source_format_from_str_matches_serde_names() {
        for format in SourceFormat::ALL {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json.trim_matches('"'), format.as_str());
            assert_eq!(format.as_str().parse::<SourceFormat>().unwrap(), format);
        }
        assert!(matches!(
            "pdf".parse::<SourceFormat>(),
            Err(ExtractionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_imported_flights_tagging() {
        let imported = ImportedFlights::PlannedFlights(PlannedFlights {
            flights: vec![FlightRecord {
                time_out: 10,
                time_in: 20,
                is_planned: true,
                ..Default::default()
            }],
            period: CoveringPeriod::new(0, 100),
        });

        let json = serde_json::to_value(&imported).unwrap();
        assert_eq!(json["type"], "planned-flights");
        assert_eq!(json["data"]["period"]["end"], 100);

        assert_eq!(imported.flights().len(), 1);
        assert_eq!(imported.period(), Some(CoveringPeriod::new(0, 100)));
        assert_eq!(ImportedFlights::CompleteLogbook(vec![]).period(), None);
    }

    #[test]
    fn test_corrupted_data_message() {
        let err = ExtractionError::CorruptedData {
            line: 3,
            expected: 23,
            found: 22,
        };
        assert_eq!(
            err.to_string(),
            "Corrupted data on line 3: expected 23 fields, found 22"
        );
    }
}
