use super::KLC_BASE_ICAO;
use crate::date_time::{
    month_number, month_period, parse_clock, parse_date, parse_day_marker, restrict_to_period,
    BlockTimes,
};
use crate::grammar::{
    aircraft_type, compact_flight_number, find_simulator_session, normalize_registration,
};
use regex::Regex;
use shared_types::{
    CompletedFlights, CompletedFlightsExtractor, ExtractionContext, ExtractionError,
    FlightExtractor, FlightRecord, ImportedFlights, SourceFormat,
};
use std::sync::LazyLock;

const OVERVIEW_BANNER: &str = "Flight Time Overview";

const DATE_FORMATS: [&str; 2] = ["%d.%m.%y", "%d.%m.%Y"];

static MONTH_BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:Month|Maand):\s*([A-Za-z]+)\s+(\d{4})\b").unwrap());

static FLIGHT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<date>\d{2}\.\d{2}\.\d{2,4})\s+(?P<flight>[A-Z0-9]{2}\s?\d{1,4}[A-Z]?)\s+(?P<from>[A-Z]{4})\s+(?P<to>[A-Z]{4})\s+(?P<out>\d{1,2}:\d{2})\s*-\s*(?P<in>\d{1,2}:\d{2})(?:\s*(?P<days>\+\d))?(?:\s+(?P<reg>[A-Z]{2}-?[A-Z0-9]{3}))?(?:\s+(?P<type>\S+))?\s*$",
    )
    .unwrap()
});

static SIMULATOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<date>\d{2}\.\d{2}\.\d{2,4})\s+(?P<text>.+?)\s+(?P<out>\d{1,2}:\d{2})\s*-\s*(?P<in>\d{1,2}:\d{2})\b",
    )
    .unwrap()
});

static ICAO_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Z]{4}\b").unwrap());

/// Extractor for KLM Cityhopper monthly flight time overviews
///
/// Covers the whole month named in the banner, in English or Dutch.
pub struct KlcMonthlyExtractor {
    context: ExtractionContext,
}

impl KlcMonthlyExtractor {
    pub fn new(context: ExtractionContext) -> Self {
        Self { context }
    }

    fn parse_flight(&self, line: &str) -> Option<FlightRecord> {
        let caps = FLIGHT_LINE.captures(line)?;
        let date = parse_date(caps.name("date")?.as_str(), &DATE_FORMATS)?;
        let departure = parse_clock(caps.name("out")?.as_str())?;
        let arrival = parse_clock(caps.name("in")?.as_str())?;
        let days_later = caps.name("days").and_then(|m| parse_day_marker(m.as_str()));
        let times = BlockTimes::resolve(date, departure, arrival, days_later)?;

        let mut flight = FlightRecord {
            flight_number: compact_flight_number(caps.name("flight")?.as_str()),
            origin: caps.name("from")?.as_str().to_string(),
            destination: caps.name("to")?.as_str().to_string(),
            registration: caps
                .name("reg")
                .map(|m| normalize_registration(m.as_str()))
                .unwrap_or_default(),
            aircraft_type: caps
                .name("type")
                .map(|m| aircraft_type(m.as_str(), &self.context.reference_data))
                .unwrap_or_default(),
            ..Default::default()
        };
        times.apply_to(&mut flight);
        Some(flight)
    }

    fn parse_simulator(line: &str) -> Option<FlightRecord> {
        let caps = SIMULATOR_LINE.captures(line)?;
        let text = caps.name("text")?.as_str();
        let (session, phrase_end) = find_simulator_session(text)?;
        let date = parse_date(caps.name("date")?.as_str(), &DATE_FORMATS)?;
        let departure = parse_clock(caps.name("out")?.as_str())?;
        let arrival = parse_clock(caps.name("in")?.as_str())?;
        let times = BlockTimes::resolve(date, departure, arrival, None)?;
        // The session phrase itself can look like an ICAO code
        let location = ICAO_TOKEN
            .find(&text[phrase_end..])
            .map_or(KLC_BASE_ICAO, |m| m.as_str());

        let mut flight = FlightRecord {
            origin: location.to_string(),
            destination: location.to_string(),
            ..Default::default()
        };
        times.apply_to(&mut flight);
        session.apply_to(&mut flight, times.minutes());
        Some(flight)
    }
}

impl CompletedFlightsExtractor for KlcMonthlyExtractor {
    fn extract_completed(
        &self,
        lines: &[String],
    ) -> Result<Option<CompletedFlights>, ExtractionError> {
        if !lines.iter().any(|line| line.contains(OVERVIEW_BANNER)) {
            return Ok(None);
        }
        let Some(period) = lines.iter().find_map(|line| {
            let caps = MONTH_BANNER.captures(line)?;
            let month = month_number(caps.get(1)?.as_str())?;
            let year: i32 = caps.get(2)?.as_str().parse().ok()?;
            month_period(year, month)
        }) else {
            return Ok(None);
        };

        let mut flights = Vec::new();
        for (position, line) in lines.iter().enumerate() {
            let line = line.trim();
            if !SIMULATOR_LINE.is_match(line) {
                continue;
            }
            let parsed = self
                .parse_flight(line)
                .or_else(|| Self::parse_simulator(line));
            match parsed {
                Some(flight) => flights.push(flight),
                None => tracing::debug!("Skipping overview line {}: {}", position + 1, line),
            }
        }

        let (flights, period) = restrict_to_period(flights, period);
        Ok(Some(CompletedFlights { flights, period }))
    }
}

impl FlightExtractor for KlcMonthlyExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::KlcMonthly
    }

    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError> {
        Ok(self
            .extract_completed(lines)?
            .map(ImportedFlights::CompletedFlights))
    }
}
