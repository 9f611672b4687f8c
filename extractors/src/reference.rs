use crate::logbook_exports::CsvParser;
use shared_types::{ExtractionError, ReferenceData};
use std::collections::HashMap;

const AIRPORT_COLUMNS: [&str; 2] = ["iata", "icao"];

/// Read an `iata,icao` airport table
///
/// Rows with a blank code on either side are skipped; codes are upper cased.
pub fn parse_airport_codes(content: &str) -> Result<HashMap<String, String>, ExtractionError> {
    let table = CsvParser::new(b',')
        .parse_to_maps(content, &AIRPORT_COLUMNS)?
        .ok_or_else(|| {
            ExtractionError::ConfigError("Airport table needs `iata` and `icao` columns".into())
        })?;

    let codes: HashMap<String, String> = table
        .rows
        .iter()
        .filter_map(|row| {
            let iata = row.value("iata")?.to_uppercase();
            let icao = row.value("icao")?.to_uppercase();
            Some((iata, icao))
        })
        .collect();

    tracing::debug!("Loaded {} airport codes", codes.len());
    Ok(codes)
}

/// Reference data from an optional airport table and an aircraft type map
pub fn build_reference_data(
    airports_csv: Option<&str>,
    aircraft_types: HashMap<String, String>,
) -> Result<ReferenceData, ExtractionError> {
    let iata_to_icao = match airports_csv {
        Some(content) => parse_airport_codes(content)?,
        None => HashMap::new(),
    };

    Ok(ReferenceData {
        iata_to_icao,
        aircraft_types,
    })
}
