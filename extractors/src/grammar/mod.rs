//! Field normalization shared by the format grammars.

mod simulator;

pub use simulator::{
    find_simulator_session, recognize_simulator_session, SimulatorSession, SIMULATOR_SESSIONS,
};

use shared_types::ReferenceData;

/// Registration prefix for Dutch aircraft, omitted by some KLM documents
pub const DUTCH_REGISTRATION_PREFIX: &str = "PH-";

/// Short type codes printed on rosters and overviews
const AIRCRAFT_TYPE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("73H", "B738"),
    ("73W", "B737"),
    ("73J", "B739"),
    ("7M8", "B38M"),
    ("737", "B737"),
    ("738", "B738"),
    ("739", "B739"),
    ("332", "A332"),
    ("333", "A333"),
    ("359", "A359"),
    ("772", "B772"),
    ("77W", "B77W"),
    ("789", "B789"),
    ("781", "B78X"),
    ("E90", "E190"),
    ("E95", "E195"),
    ("E75", "E175"),
    ("E7W", "E175"),
    ("295", "E295"),
    ("F70", "F70"),
    ("100", "F100"),
];

/// Remove all whitespace from a carrier + number token (`KL 1587` -> `KL1587`)
pub fn compact_flight_number(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Upper case a registration and re-insert the hyphen of a bare 5 letter block
///
/// `PHEXA` becomes `PH-EXA`; anything already hyphenated or of another
/// length is returned upper cased.
pub fn normalize_registration(raw: &str) -> String {
    let registration = raw.trim().to_uppercase();
    if registration.len() == 5
        && !registration.contains('-')
        && registration.chars().all(|c| c.is_ascii_alphanumeric())
    {
        format!("{}-{}", &registration[..2], &registration[2..])
    } else {
        registration
    }
}

/// Registration for documents that only print the part after `PH-`
pub fn dutch_registration(raw: &str) -> String {
    let suffix = raw.trim().to_uppercase();
    if suffix.is_empty() {
        return suffix;
    }
    if suffix.len() == 3 && suffix.chars().all(|c| c.is_ascii_alphabetic()) {
        format!("{DUTCH_REGISTRATION_PREFIX}{suffix}")
    } else {
        normalize_registration(&suffix)
    }
}

/// Type designator for a short code or a free-form type name
///
/// The fixed abbreviation table is consulted first, then the reference data;
/// unknown codes are returned as given.
pub fn aircraft_type(code: &str, reference: &ReferenceData) -> String {
    let code = code.trim();
    let upper = code.to_uppercase();
    AIRCRAFT_TYPE_ABBREVIATIONS
        .iter()
        .find(|(abbreviation, _)| *abbreviation == upper)
        .map(|(_, designator)| designator.to_string())
        .or_else(|| reference.aircraft_type(code).map(str::to_string))
        .unwrap_or_else(|| code.to_string())
}

/// Field that may legitimately be missing; trims and maps blank to empty
pub fn optional_field(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_compact_flight_number() {
        assert_eq!(compact_flight_number("KL 1587"), "KL1587");
        assert_eq!(compact_flight_number(" KL  0643 "), "KL0643");
        assert_eq!(compact_flight_number("KL1587"), "KL1587");
    }

    #[test]
    fn test_normalize_registration() {
        assert_eq!(normalize_registration("PHEXA"), "PH-EXA");
        assert_eq!(normalize_registration("phexa"), "PH-EXA");
        assert_eq!(normalize_registration("PH-EXA"), "PH-EXA");
        assert_eq!(normalize_registration("N12345"), "N12345");
        assert_eq!(normalize_registration(""), "");
    }

    #[test]
    fn test_dutch_registration() {
        assert_eq!(dutch_registration("BQA"), "PH-BQA");
        assert_eq!(dutch_registration("aea"), "PH-AEA");
        assert_eq!(dutch_registration("PHBQA"), "PH-BQA");
        assert_eq!(dutch_registration(""), "");
    }

    #[test]
    fn test_aircraft_type_table_then_reference() {
        let reference = ReferenceData {
            aircraft_types: HashMap::from([("Embraer 190".to_string(), "E190".to_string())]),
            ..Default::default()
        };

        assert_eq!(aircraft_type("73H", &reference), "B738");
        assert_eq!(aircraft_type("e90", &reference), "E190");
        assert_eq!(aircraft_type("Embraer 190", &reference), "E190");
        assert_eq!(aircraft_type("A320", &reference), "A320");
    }

    #[test]
    fn test_optional_field() {
        assert_eq!(optional_field(Some("  PH-EXA ")), "PH-EXA");
        assert_eq!(optional_field(None), "");
    }
}
