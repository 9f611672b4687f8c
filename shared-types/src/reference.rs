use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only lookup tables handed to extractors by the surrounding application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    /// IATA code -> ICAO code
    #[serde(default)]
    pub iata_to_icao: HashMap<String, String>,

    /// Free-form aircraft type name or abbreviation -> type designator
    #[serde(default)]
    pub aircraft_types: HashMap<String, String>,
}

impl ReferenceData {
    /// ICAO code for a three letter IATA code; anything else is returned as given
    pub fn icao_for(&self, code: &str) -> String {
        let code = code.trim();
        if code.len() == 3 {
            if let Some(icao) = self.iata_to_icao.get(&code.to_uppercase()) {
                return icao.clone();
            }
        }
        code.to_string()
    }

    /// IATA code for a four letter ICAO code; anything else is returned as given
    pub fn iata_for(&self, code: &str) -> String {
        let code = code.trim();
        if code.len() == 4 {
            let wanted = code.to_uppercase();
            if let Some((iata, _)) = self.iata_to_icao.iter().find(|(_, icao)| **icao == wanted) {
                return iata.clone();
            }
        }
        code.to_string()
    }

    /// Type designator for a free-form name, exact match first, then ignoring case
    pub fn aircraft_type(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.aircraft_types
            .get(name)
            .or_else(|| {
                self.aircraft_types
                    .iter()
                    .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
                    .map(|(_, designator)| designator)
            })
            .map(String::as_str)
    }
}
