use crate::crew::{assign_crew, CrewManifestResolver, FlightKey, ManifestLine};
use crate::date_time::{
    parse_clock, parse_day_marker, parse_day_month, parse_day_month_year, period_between,
    restrict_to_period, BlockTimes, DateAnchor,
};
use crate::grammar::{aircraft_type, compact_flight_number};
use chrono::NaiveDate;
use regex::Regex;
use shared_types::{
    ExtractionContext, ExtractionError, FlightExtractor, FlightRecord, ImportedFlights,
    PlannedFlights, PlannedFlightsExtractor, SourceFormat,
};
use std::sync::LazyLock;

const VIEWER_PREFIX: &str = "Name:";
const VIEWER_SUFFIX: &str = "Rank:";
const MANIFEST_START: &str = "CREW INFO";

static PERIOD_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Period:\s*(\d{1,2}[A-Za-z]{3}\d{2})\s*-\s*(\d{1,2}[A-Za-z]{3}\d{2})").unwrap()
});

static FLIGHT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<date>\d{1,2}[A-Za-z]{3})\s+(?P<flight>[A-Z0-9]{2}\s?\d{1,4}[A-Z]?)\s+(?P<from>[A-Z]{3})\s+(?P<out>\d{4})\s+(?P<in>\d{4})(?:\s*(?P<days>\+\d))?\s+(?P<to>[A-Z]{3})(?:\s+(?P<type>[A-Z0-9]{3,4}))?\s*$",
    )
    .unwrap()
});

static MANIFEST_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<date>\d{1,2}[A-Za-z]{3})\s+(?P<flight>[A-Z0-9]{2}\s?\d{1,4}[A-Z]?)(?P<crew>\s.*)?$")
        .unwrap()
});

/// Extractor for KLM intercontinental (ICA) rosters
///
/// The roster opens with the viewer's name and rank, then the flight table,
/// then a `CREW INFO` manifest listing personnel numbers and names per flight.
pub struct KlmIcaRosterExtractor {
    context: ExtractionContext,
}

impl KlmIcaRosterExtractor {
    pub fn new(context: ExtractionContext) -> Self {
        Self { context }
    }

    fn viewer_name(lines: &[String]) -> Option<String> {
        lines.iter().find_map(|line| {
            let (_, after_prefix) = line.split_once(VIEWER_PREFIX)?;
            let (name, _) = after_prefix.split_once(VIEWER_SUFFIX)?;
            Some(name.trim().to_string())
        })
    }

    fn parse_period(lines: &[String]) -> Option<(NaiveDate, NaiveDate)> {
        lines.iter().find_map(|line| {
            let caps = PERIOD_BANNER.captures(line)?;
            let first = parse_day_month_year(caps.get(1)?.as_str())?;
            let last = parse_day_month_year(caps.get(2)?.as_str())?;
            Some((first, last))
        })
    }

    fn parse_flight(&self, line: &str, anchor: &DateAnchor) -> Option<FlightRecord> {
        let caps = FLIGHT_LINE.captures(line)?;
        let (day, month) = parse_day_month(caps.name("date")?.as_str())?;
        let date = anchor.resolve_day_month(day, month)?;
        let departure = parse_clock(caps.name("out")?.as_str())?;
        let arrival = parse_clock(caps.name("in")?.as_str())?;
        let days_later = caps.name("days").and_then(|m| parse_day_marker(m.as_str()));
        let times = BlockTimes::resolve(date, departure, arrival, days_later)?;

        let mut flight = FlightRecord {
            flight_number: compact_flight_number(caps.name("flight")?.as_str()),
            origin: caps.name("from")?.as_str().to_string(),
            destination: caps.name("to")?.as_str().to_string(),
            aircraft_type: caps
                .name("type")
                .map(|m| aircraft_type(m.as_str(), &self.context.reference_data))
                .unwrap_or_default(),
            is_planned: true,
            ..Default::default()
        };
        times.apply_to(&mut flight);
        Some(flight)
    }

    fn parse_manifest_line(line: &str, anchor: &DateAnchor) -> ManifestLine {
        let flight_prefix = MANIFEST_PREFIX.captures(line).and_then(|caps| {
            let (day, month) = parse_day_month(caps.name("date")?.as_str())?;
            let key = FlightKey {
                date: anchor.resolve_day_month(day, month)?,
                flight_number: compact_flight_number(caps.name("flight")?.as_str()),
            };
            let crew_text = caps.name("crew").map_or("", |m| m.as_str()).to_string();
            Some((key, crew_text))
        });

        match flight_prefix {
            Some((key, crew_text)) => ManifestLine {
                flight: Some(key),
                crew_text,
            },
            None => ManifestLine {
                flight: None,
                crew_text: line.to_string(),
            },
        }
    }
}

impl PlannedFlightsExtractor for KlmIcaRosterExtractor {
    fn extract_planned(
        &self,
        lines: &[String],
    ) -> Result<Option<PlannedFlights>, ExtractionError> {
        let Some(viewer) = Self::viewer_name(lines) else {
            return Ok(None);
        };
        let Some((first, last)) = Self::parse_period(lines) else {
            return Ok(None);
        };
        let Some(period) = period_between(first, last) else {
            tracing::debug!("Roster period ends before it starts");
            return Ok(None);
        };

        let anchor = DateAnchor::period_start(first);
        let mut flights = Vec::new();
        let mut manifest = Vec::new();
        let mut in_manifest = false;

        for (position, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with(MANIFEST_START) {
                in_manifest = true;
                continue;
            }

            if in_manifest {
                manifest.push(Self::parse_manifest_line(line, &anchor));
            } else if FLIGHT_LINE.is_match(line) {
                match self.parse_flight(line, &anchor) {
                    Some(flight) => flights.push(flight),
                    None => tracing::debug!("Skipping roster line {}: {}", position + 1, line),
                }
            }
        }

        let resolver = CrewManifestResolver::new(Some(viewer.as_str()));
        let assignments = resolver.resolve(&manifest);
        let matched = assign_crew(&mut flights, &assignments);
        tracing::debug!(
            "Assigned crew to {} of {} roster flights",
            matched,
            flights.len()
        );

        let (flights, period) = restrict_to_period(flights, period);
        Ok(Some(PlannedFlights { flights, period }))
    }
}

impl FlightExtractor for KlmIcaRosterExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::KlmIcaRoster
    }

    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError> {
        Ok(self
            .extract_planned(lines)?
            .map(ImportedFlights::PlannedFlights))
    }
}
