use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Sentinel crew name for the person the imported document belongs to
pub const SELF_NAME: &str = "SELF";

/// Canonical, format-independent flight or simulator session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    pub flight_number: String,

    // Airport codes, ICAO or IATA depending on the source format
    pub origin: String,
    pub destination: String,

    // UTC epoch seconds
    pub time_out: i64,
    pub time_in: i64,

    pub aircraft_type: String,
    pub registration: String,

    /// First entry is the primary (left seat) name, the rest are other crew
    pub crew_names: Vec<String>,

    pub is_planned: bool,
    pub is_simulator: bool,
    pub simulator_minutes: i64,
    pub remarks: String,

    // Role flags
    pub is_pic: bool,
    pub is_copilot: bool,
    pub is_picus: bool,
    pub is_dual: bool,
    pub is_instructor: bool,
    pub is_pilot_flying: bool,

    // Counters
    pub takeoffs_day: u32,
    pub takeoffs_night: u32,
    pub landings_day: u32,
    pub landings_night: u32,
    pub autolands: u32,
}

impl FlightRecord {
    /// First crew name, or an empty string when no crew is known
    pub fn primary_name(&self) -> &str {
        self.crew_names.first().map(String::as_str).unwrap_or("")
    }

    /// All crew names except the primary one, joined with `;`
    pub fn secondary_names(&self) -> String {
        self.crew_names
            .iter()
            .skip(1)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.time_in - self.time_out) / 60
    }

    /// Replace the crew list; a primary name of [`SELF_NAME`] marks the record as PIC
    pub fn set_crew(&mut self, crew: Vec<String>) {
        if crew.first().map(String::as_str) == Some(SELF_NAME) {
            self.is_pic = true;
        }
        self.crew_names = crew;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crew_accessors() {
        let mut flight = FlightRecord::default();
        assert_eq!(flight.primary_name(), "");
        assert_eq!(flight.secondary_names(), "");

        flight.set_crew(vec![
            SELF_NAME.to_string(),
            "Jongepier, Shahane".to_string(),
            "Berg, Jan van der".to_string(),
        ]);

        assert!(flight.is_pic);
        assert_eq!(flight.primary_name(), "SELF");
        assert_eq!(
            flight.secondary_names(),
            "Jongepier, Shahane;Berg, Jan van der"
        );
    }

    #[test]
    fn test_other_primary_does_not_set_pic() {
        let mut flight = FlightRecord::default();
        flight.set_crew(vec!["Welle, Joost".to_string()]);
        assert!(!flight.is_pic);
    }

    #[test]
    fn test_serializes_camel_case() {
        let flight = FlightRecord {
            flight_number: "KL1587".to_string(),
            time_out: 100,
            time_in: 200,
            ..Default::default()
        };

        let json = serde_json::to_value(&flight).unwrap();
        assert_eq!(json["flightNumber"], "KL1587");
        assert_eq!(json["timeOut"], 100);
        assert_eq!(json["isPilotFlying"], false);

        let back: FlightRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, flight);
    }
}
