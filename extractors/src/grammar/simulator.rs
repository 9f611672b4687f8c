use regex::Regex;
use shared_types::FlightRecord;
use std::sync::LazyLock;

/// A known simulator session type
#[derive(Debug, PartialEq, Eq)]
pub struct SimulatorSession {
    pub phrase: &'static str,
    pub description: &'static str,
    pub aircraft_type: Option<&'static str>,
}

impl SimulatorSession {
    /// Turn a record into a simulator session of this type
    pub fn apply_to(&self, record: &mut FlightRecord, minutes: i64) {
        record.is_simulator = true;
        record.simulator_minutes = minutes;
        record.remarks = self.description.to_string();
        if let Some(aircraft_type) = self.aircraft_type {
            record.aircraft_type = aircraft_type.to_string();
        }
    }
}

// Most specific phrase first
pub static SIMULATOR_SESSIONS: &[SimulatorSession] = &[
    SimulatorSession {
        phrase: "MAX DIFF",
        description: "Differences training 737 MAX",
        aircraft_type: Some("B38M"),
    },
    SimulatorSession {
        phrase: "TYPE RATING",
        description: "Type rating training",
        aircraft_type: None,
    },
    SimulatorSession {
        phrase: "LOFT",
        description: "Line oriented flight training",
        aircraft_type: None,
    },
    SimulatorSession {
        phrase: "LOE",
        description: "Line oriented evaluation",
        aircraft_type: None,
    },
    SimulatorSession {
        phrase: "OPC",
        description: "Operator proficiency check",
        aircraft_type: None,
    },
    SimulatorSession {
        phrase: "LPC",
        description: "Licence proficiency check",
        aircraft_type: None,
    },
    SimulatorSession {
        phrase: "RECURRENT",
        description: "Recurrent training",
        aircraft_type: None,
    },
];

static SESSION_PATTERNS: LazyLock<Vec<(Regex, &'static SimulatorSession)>> = LazyLock::new(|| {
    SIMULATOR_SESSIONS
        .iter()
        .map(|session| {
            let words: Vec<String> = session
                .phrase
                .split_whitespace()
                .map(regex::escape)
                .collect();
            let pattern = format!(r"(?i)\b{}\b", words.join(r"\s+"));
            (Regex::new(&pattern).unwrap(), session)
        })
        .collect()
});

/// Find the first known session phrase in a line of text
pub fn recognize_simulator_session(text: &str) -> Option<&'static SimulatorSession> {
    find_simulator_session(text).map(|(session, _)| session)
}

/// Like [`recognize_simulator_session`], also returning the byte offset just
/// past the matched phrase
pub fn find_simulator_session(text: &str) -> Option<(&'static SimulatorSession, usize)> {
    SESSION_PATTERNS.iter().find_map(|(pattern, session)| {
        pattern
            .find(text)
            .map(|matched| (*session, matched.end()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_phrases_as_words() {
        let session = recognize_simulator_session("05  SIM LOFT 0900 1300").unwrap();
        assert_eq!(session.description, "Line oriented flight training");

        // LOE must not match inside another word
        assert_eq!(recognize_simulator_session("12 KL 1587 SLOEP"), None);
    }

    #[test]
    fn test_specific_phrase_wins() {
        let session = recognize_simulator_session("07 SIM  max   diff LOFT 0800 1200").unwrap();
        assert_eq!(session.phrase, "MAX DIFF");
        assert_eq!(session.aircraft_type, Some("B38M"));
    }

    #[test]
    fn test_apply_to_record() {
        let mut record = FlightRecord {
            aircraft_type: "B738".to_string(),
            ..Default::default()
        };
        recognize_simulator_session("MAX DIFF")
            .unwrap()
            .apply_to(&mut record, 240);

        assert!(record.is_simulator);
        assert_eq!(record.simulator_minutes, 240);
        assert_eq!(record.aircraft_type, "B38M");
        assert_eq!(record.remarks, "Differences training 737 MAX");

        let mut record = FlightRecord {
            aircraft_type: "B738".to_string(),
            ..Default::default()
        };
        recognize_simulator_session("OPC").unwrap().apply_to(&mut record, 120);
        assert_eq!(record.aircraft_type, "B738");
    }

    #[test]
    fn test_find_reports_phrase_end() {
        let (session, end) = find_simulator_session("SIM LOFT EHAM").unwrap();
        assert_eq!(session.phrase, "LOFT");
        assert_eq!(end, 8);
    }

    #[test]
    fn test_no_session() {
        assert_eq!(recognize_simulator_session("01 KL 0643 AMS 1002 1838 JFK"), None);
    }
}
