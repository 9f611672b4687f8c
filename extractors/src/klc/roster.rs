use super::KLC_BASE;
use crate::date_time::{
    parse_clock, parse_day_marker, parse_day_month_year, period_between, restrict_to_period,
    BlockTimes, DateAnchor,
};
use crate::grammar::{aircraft_type, compact_flight_number, recognize_simulator_session};
use chrono::NaiveDate;
use regex::Regex;
use shared_types::{
    ExtractionContext, ExtractionError, FlightExtractor, FlightRecord, ImportedFlights,
    PlannedFlights, PlannedFlightsExtractor, SourceFormat,
};
use std::sync::LazyLock;

static PERIOD_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Period:\s*(\d{1,2}[A-Za-z]{3}\d{2})\s*-\s*(\d{1,2}[A-Za-z]{3}\d{2})").unwrap()
});

static DAY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun|ma|di|wo|do|vr|za|zo)\s?(\d{1,2})$").unwrap()
});

static FLIGHT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<flight>[A-Z0-9]{2}\s?\d{1,4}[A-Z]?)\s+(?P<from>[A-Z]{3})\s+(?P<out>\d{4})\s+(?P<in>\d{4})(?:\s*(?P<days>\+\d))?\s+(?P<to>[A-Z]{3})(?:\s+(?P<type>[A-Z0-9]{3,4}))?\s*$",
    )
    .unwrap()
});

static SIMULATOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^SIM\s+(?P<text>.+?)(?:\s+(?P<at>[A-Z]{3}))?\s+(?P<out>\d{4})\s+(?P<in>\d{4})\s*$",
    )
    .unwrap()
});

/// Extractor for KLM Cityhopper monthly rosters
///
/// ```text
/// KLM Cityhopper   Period: 02Mar22 - 27Mar22
/// Wed02
/// KL 1587  AMS 0755 1025 BGO  E90
/// KL 1588  BGO 2255 0040 +1 AMS  E90
/// Thu03
/// SIM LOFT 0800 1200
/// ```
pub struct KlcRosterExtractor {
    context: ExtractionContext,
}

impl KlcRosterExtractor {
    pub fn new(context: ExtractionContext) -> Self {
        Self { context }
    }

    fn parse_period(lines: &[String]) -> Option<(NaiveDate, NaiveDate)> {
        lines.iter().find_map(|line| {
            let caps = PERIOD_BANNER.captures(line)?;
            let first = parse_day_month_year(caps.get(1)?.as_str())?;
            let last = parse_day_month_year(caps.get(2)?.as_str())?;
            Some((first, last))
        })
    }

    fn parse_flight(&self, line: &str, date: NaiveDate) -> Option<FlightRecord> {
        let caps = FLIGHT_LINE.captures(line)?;
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

    fn parse_simulator(line: &str, date: NaiveDate) -> Option<FlightRecord> {
        let caps = SIMULATOR_LINE.captures(line)?;
        let session = recognize_simulator_session(caps.name("text")?.as_str())?;
        let departure = parse_clock(caps.name("out")?.as_str())?;
        let arrival = parse_clock(caps.name("in")?.as_str())?;
        let times = BlockTimes::resolve(date, departure, arrival, None)?;
        let location = caps
            .name("at")
            .map(|m| m.as_str())
            .filter(|at| recognize_simulator_session(at).is_none())
            .unwrap_or(KLC_BASE);

        let mut flight = FlightRecord {
            origin: location.to_string(),
            destination: location.to_string(),
            is_planned: true,
            ..Default::default()
        };
        times.apply_to(&mut flight);
        session.apply_to(&mut flight, times.minutes());
        Some(flight)
    }
}

impl PlannedFlightsExtractor for KlcRosterExtractor {
    fn extract_planned(
        &self,
        lines: &[String],
    ) -> Result<Option<PlannedFlights>, ExtractionError> {
        let Some((first, last)) = Self::parse_period(lines) else {
            return Ok(None);
        };
        let Some(period) = period_between(first, last) else {
            tracing::debug!("Roster period ends before it starts");
            return Ok(None);
        };

        let anchor = DateAnchor::period_start(first);
        let mut current_day: Option<NaiveDate> = None;
        let mut flights = Vec::new();

        for (position, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.is_empty() || PERIOD_BANNER.is_match(line) {
                continue;
            }

            if let Some(caps) = DAY_HEADER.captures(line) {
                current_day = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .and_then(|day| anchor.resolve_day(day));
                continue;
            }

            let Some(date) = current_day else {
                continue;
            };

            let parsed = if line.starts_with("SIM") {
                Self::parse_simulator(line, date)
            } else {
                self.parse_flight(line, date)
            };
            match parsed {
                Some(flight) => flights.push(flight),
                None => tracing::debug!("Skipping roster line {}: {}", position + 1, line),
            }
        }

        let (flights, period) = restrict_to_period(flights, period);
        Ok(Some(PlannedFlights { flights, period }))
    }
}

impl FlightExtractor for KlcRosterExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::KlcRoster
    }

    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError> {
        Ok(self
            .extract_planned(lines)?
            .map(ImportedFlights::PlannedFlights))
    }
}
