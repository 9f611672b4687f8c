//! Crew manifest resolution.
//!
//! A manifest lists, per flight, personnel numbers followed by names:
//!
//! ```text
//! 17Feb KL1199 44692 WELLE, JOOST 59852 JONGEPIER, SHAHANE
//! 18Feb KL1196
//! ```
//!
//! Only the first flight of a rotation carries the crew; later lines without
//! personnel numbers fly with the crew of the last line that had them.

use super::names::{name_key, CrewName};
use chrono::{DateTime, NaiveDate};
use shared_types::{FlightRecord, SELF_NAME};
use std::collections::HashMap;

/// Personnel number -> name, built per input; later entries overwrite earlier ones
pub type CrewNameTable = HashMap<u64, CrewName>;

/// Identifies the flight a manifest line belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightKey {
    pub date: NaiveDate,
    pub flight_number: String,
}

/// One manifest line, split into its flight prefix and the crew text after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLine {
    pub flight: Option<FlightKey>,
    pub crew_text: String,
}

/// Crew list resolved for one manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewAssignment {
    pub flight: Option<FlightKey>,
    pub crew: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumericToken {
    personnel_number: u64,
    start: usize,
    end: usize,
}

/// Whitespace separated tokens made only of ASCII digits, in line order
fn numeric_tokens(text: &str) -> Vec<NumericToken> {
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;

    for (index, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        match (c.is_whitespace(), token_start) {
            (false, None) => token_start = Some(index),
            (true, Some(start)) => {
                let token = &text[start..index];
                if token.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(personnel_number) = token.parse() {
                        tokens.push(NumericToken {
                            personnel_number,
                            start,
                            end: index,
                        });
                    }
                }
                token_start = None;
            }
            _ => {}
        }
    }

    tokens
}

/// Build the personnel number table from every manifest line
///
/// The raw name of a number is the text up to the next number, or to the end
/// of the line for the last one. Blank names leave no entry.
pub fn build_name_table(lines: &[ManifestLine]) -> CrewNameTable {
    let mut table = CrewNameTable::new();

    for line in lines {
        let tokens = numeric_tokens(&line.crew_text);
        for (index, token) in tokens.iter().enumerate() {
            let name_end = tokens
                .get(index + 1)
                .map(|next| next.start)
                .unwrap_or(line.crew_text.len());

            if let Some(name) = CrewName::parse(&line.crew_text[token.end..name_end]) {
                table.insert(token.personnel_number, name);
            }
        }
    }

    table
}

/// Placeholder for a personnel number that has no name in the table
pub fn unknown_crew_placeholder(personnel_number: u64) -> String {
    format!("UNKNOWN({personnel_number})")
}

/// Resolves manifest lines to crew lists, replacing the viewer's own name with [`SELF_NAME`]
#[derive(Debug, Clone, Default)]
pub struct CrewManifestResolver {
    viewer_key: Option<String>,
}

impl CrewManifestResolver {
    pub fn new(viewer_name: Option<&str>) -> Self {
        Self {
            viewer_key: viewer_name
                .map(name_key)
                .filter(|key| !key.is_empty()),
        }
    }

    fn render(&self, name: &CrewName) -> String {
        match &self.viewer_key {
            Some(viewer) if *viewer == name.key() => SELF_NAME.to_string(),
            _ => name.display(),
        }
    }

    fn lookup(&self, table: &CrewNameTable, personnel_number: u64) -> String {
        table
            .get(&personnel_number)
            .map(|name| self.render(name))
            .unwrap_or_else(|| unknown_crew_placeholder(personnel_number))
    }

    /// Current crew for every manifest line, in input order
    pub fn resolve(&self, lines: &[ManifestLine]) -> Vec<CrewAssignment> {
        let table = build_name_table(lines);

        lines
            .iter()
            .scan(Vec::<String>::new(), |current_crew, line| {
                let tokens = numeric_tokens(&line.crew_text);
                if !tokens.is_empty() {
                    *current_crew = tokens
                        .iter()
                        .map(|token| self.lookup(&table, token.personnel_number))
                        .collect();
                }
                Some(CrewAssignment {
                    flight: line.flight.clone(),
                    crew: current_crew.clone(),
                })
            })
            .collect()
    }
}

fn departure_date(flight: &FlightRecord) -> Option<NaiveDate> {
    DateTime::from_timestamp(flight.time_out, 0).map(|dt| dt.date_naive())
}

/// Attach crew to flights matched by exact (departure date, flight number)
///
/// Assignments without a matching flight (ground duties, standby) are skipped.
/// Returns how many assignments matched.
pub fn assign_crew(flights: &mut [FlightRecord], assignments: &[CrewAssignment]) -> usize {
    let index: HashMap<FlightKey, usize> = flights
        .iter()
        .enumerate()
        .filter_map(|(position, flight)| {
            let key = FlightKey {
                date: departure_date(flight)?,
                flight_number: flight.flight_number.clone(),
            };
            Some((key, position))
        })
        .collect();

    let mut matched = 0;
    for assignment in assignments {
        let Some(key) = &assignment.flight else {
            continue;
        };
        match index.get(key) {
            Some(&position) => {
                flights[position].set_crew(assignment.crew.clone());
                matched += 1;
            }
            None => {
                tracing::debug!(
                    "No flight {} on {} for manifest line",
                    key.flight_number,
                    key.date
                );
            }
        }
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_time::epoch_seconds;
    use chrono::NaiveTime;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, m, d).unwrap()
    }

    fn line(day: u32, flight_number: &str, crew_text: &str) -> ManifestLine {
        ManifestLine {
            flight: Some(FlightKey {
                date: date(2, day),
                flight_number: flight_number.to_string(),
            }),
            crew_text: crew_text.to_string(),
        }
    }

    fn flight(day: u32, flight_number: &str) -> FlightRecord {
        let time_out = epoch_seconds(date(2, day), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        FlightRecord {
            flight_number: flight_number.to_string(),
            time_out,
            time_in: time_out + 7200,
            ..Default::default()
        }
    }

    #[test]
    fn test_numeric_tokens() {
        let tokens = numeric_tokens(" 44692 WELLE, JOOST 59852 JONGEPIER 12a 7");
        let numbers: Vec<u64> = tokens.iter().map(|t| t.personnel_number).collect();
        assert_eq!(numbers, vec![44692, 59852, 7]);
        assert_eq!(tokens[0].start, 1);
        assert_eq!(tokens[0].end, 6);
    }

    #[test]
    fn test_name_table_slices_between_numbers() {
        let lines = vec![line(17, "KL1199", " 44692 WELLE, JOOST 59852 JONGEPIER, SHAHANE")];
        let table = build_name_table(&lines);

        assert_eq!(table.len(), 2);
        assert_eq!(table[&44692].display(), "Welle, Joost");
        assert_eq!(table[&59852].display(), "Jongepier, Shahane");
    }

    #[test]
    fn test_blank_name_leaves_no_entry() {
        let lines = vec![line(17, "KL1199", " 44692 59852 JONGEPIER, SHAHANE")];
        let table = build_name_table(&lines);
        assert!(!table.contains_key(&44692));
        assert!(table.contains_key(&59852));
    }

    #[test]
    fn test_missing_lookup_is_a_placeholder() {
        let lines = vec![line(17, "KL1199", " 44692 59852 JONGEPIER, SHAHANE")];
        let assignments = CrewManifestResolver::new(None).resolve(&lines);
        assert_eq!(
            assignments[0].crew,
            vec!["UNKNOWN(44692)".to_string(), "Jongepier, Shahane".to_string()]
        );
    }

    #[test]
    fn test_duplicate_personnel_number_last_write_wins() {
        let lines = vec![
            line(17, "KL1199", " 59852 JONGEPIER, SHAHANE"),
            line(18, "KL1197", " 59852 JONGEPIER, SHAHANE-MARIE"),
        ];
        let assignments = CrewManifestResolver::new(None).resolve(&lines);

        // The table is built before the walk, so the first line sees the later name too
        assert_eq!(assignments[0].crew, vec!["Jongepier, Shahane-Marie"]);
        assert_eq!(assignments[1].crew, vec!["Jongepier, Shahane-Marie"]);
    }

    #[test]
    fn test_current_crew_carries_forward() {
        let lines = vec![
            line(17, "KL1199", " 44692 WELLE, JOOST 59852 JONGEPIER, SHAHANE"),
            line(18, "KL1196", ""),
            line(19, "KL1201", " 61234 BERG, VAN DER, JAN"),
            line(19, "KL1202", "   "),
        ];
        let assignments = CrewManifestResolver::new(Some("WELLE JOOST")).resolve(&lines);

        assert_eq!(assignments[0].crew, vec!["SELF", "Jongepier, Shahane"]);
        assert_eq!(assignments[1].crew, vec!["SELF", "Jongepier, Shahane"]);
        assert_eq!(assignments[2].crew, vec!["Berg, Jan van der"]);
        assert_eq!(assignments[3].crew, vec!["Berg, Jan van der"]);
    }

    #[test]
    fn test_lines_before_any_crew_have_empty_crew() {
        let lines = vec![line(16, "KL1000", "")];
        let assignments = CrewManifestResolver::new(None).resolve(&lines);
        assert!(assignments[0].crew.is_empty());
    }

    #[test]
    fn test_viewer_match_ignores_case_and_spacing() {
        let lines = vec![line(17, "KL1199", " 44692 welle,  joost")];
        let assignments = CrewManifestResolver::new(Some("  WELLE   JOOST")).resolve(&lines);
        assert_eq!(assignments[0].crew, vec!["SELF"]);
    }

    #[test]
    fn test_worked_example() {
        let lines = vec![
            line(17, "KL1199", " 44692 WELLE, JOOST 59852 JONGEPIER, SHAHANE"),
            line(18, "KL1196", ""),
        ];
        let mut flights = vec![flight(17, "KL1199"), flight(18, "KL1196")];

        let assignments = CrewManifestResolver::new(Some("WELLE JOOST")).resolve(&lines);
        assert_eq!(assign_crew(&mut flights, &assignments), 2);

        let kl1196 = &flights[1];
        assert_eq!(kl1196.primary_name(), "SELF");
        assert_eq!(kl1196.secondary_names(), "Jongepier, Shahane");
        assert!(kl1196.is_pic);
    }

    #[test]
    fn test_unmatched_lines_are_skipped() {
        let lines = vec![
            line(17, "KL1199", " 59852 JONGEPIER, SHAHANE"),
            ManifestLine {
                flight: None,
                crew_text: " 61234 BERG, JAN".to_string(),
            },
            line(20, "KL9999", ""),
        ];
        let mut flights = vec![flight(17, "KL1199")];
        let assignments = CrewManifestResolver::new(None).resolve(&lines);

        assert_eq!(assign_crew(&mut flights, &assignments), 1);
        assert_eq!(flights[0].crew_names, vec!["Jongepier, Shahane"]);
        assert!(!flights[0].is_pic);
    }

    #[test]
    fn test_flight_date_must_match_exactly() {
        let lines = vec![line(18, "KL1199", " 59852 JONGEPIER, SHAHANE")];
        let mut flights = vec![flight(17, "KL1199")];
        let assignments = CrewManifestResolver::new(None).resolve(&lines);

        assert_eq!(assign_crew(&mut flights, &assignments), 0);
        assert!(flights[0].crew_names.is_empty());
    }
}
