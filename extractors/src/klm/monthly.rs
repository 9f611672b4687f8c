use super::KLM_BASE;
use crate::date_time::{
    parse_clock, parse_date, parse_day_marker, period_between, restrict_to_period, BlockTimes,
    DateAnchor,
};
use crate::grammar::{
    aircraft_type, compact_flight_number, dutch_registration, recognize_simulator_session,
};
use crate::reassembly::{reassemble, ContinuationRule};
use chrono::NaiveDate;
use regex::{Captures, Regex};
use shared_types::{
    CompletedFlights, CompletedFlightsExtractor, ExtractionContext, ExtractionError,
    FlightExtractor, FlightRecord, ImportedFlights, SourceFormat,
};
use std::sync::LazyLock;

const OVERVIEW_BANNER: &str = "FLIGHT TIME OVERVIEW";

const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%d-%m-%y"];

static PERIOD_BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Period:\s*(\d{2}-\d{2}-\d{2,4})\s*-\s*(\d{2}-\d{2}-\d{2,4})").unwrap()
});

static FLIGHT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<day>\d{2})\s+(?P<flight>[A-Z0-9]{2}\s?\d{1,4}[A-Z]?)\s+(?P<from>[A-Z]{3})\s+(?P<out>\d{4})\s+(?P<in>\d{4})(?:\s*(?P<days>\+\d))?\s+(?P<to>[A-Z]{3})\s+(?P<type>[A-Z0-9]{3})\s+(?P<reg>[A-Z]{3})\s+(?P<function>CP|FO|PU|IN|DU)\b(?:\s+(?P<pf>PF)\b)?(?P<remarks>.*)$",
    )
    .unwrap()
});

static SIMULATOR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<day>\d{2})\s+(?P<text>.*?)\b(?P<out>\d{4})\s+(?P<in>\d{4})\b(?P<rest>.*)$")
        .unwrap()
});

static FUNCTION_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(CP|FO|PU|IN|DU)\b").unwrap());

/// Role flags for a function code
fn apply_function(flight: &mut FlightRecord, code: &str) {
    match code {
        "CP" => flight.is_pic = true,
        "FO" => flight.is_copilot = true,
        "PU" => flight.is_picus = true,
        "IN" => flight.is_instructor = true,
        "DU" => flight.is_dual = true,
        _ => {}
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extractor for KLM monthly flight time overviews
///
/// Remarks may wrap over several physical lines; a record only starts at a
/// line beginning with a two digit day of month.
///
/// ```text
/// 01  KL 0643  AMS 1002 1838 JFK  332  AEA  CP  PF  diverted
///     to BOS due to weather
/// ```
pub struct KlmMonthlyExtractor {
    context: ExtractionContext,
}

impl KlmMonthlyExtractor {
    pub fn new(context: ExtractionContext) -> Self {
        Self { context }
    }

    fn parse_period(lines: &[String]) -> Option<(NaiveDate, NaiveDate)> {
        lines.iter().find_map(|line| {
            let caps = PERIOD_BANNER.captures(line)?;
            let first = parse_date(caps.get(1)?.as_str(), &DATE_FORMATS)?;
            let last = parse_date(caps.get(2)?.as_str(), &DATE_FORMATS)?;
            Some((first, last))
        })
    }

    fn resolve_date(caps: &Captures, anchor: &DateAnchor) -> Option<NaiveDate> {
        let day: u32 = caps.name("day")?.as_str().parse().ok()?;
        anchor.resolve_day(day)
    }

    fn parse_flight(&self, line: &str, anchor: &DateAnchor) -> Option<FlightRecord> {
        let caps = FLIGHT_LINE.captures(line)?;
        let date = Self::resolve_date(&caps, anchor)?;
        let departure = parse_clock(caps.name("out")?.as_str())?;
        let arrival = parse_clock(caps.name("in")?.as_str())?;
        let days_later = caps.name("days").and_then(|m| parse_day_marker(m.as_str()));
        let times = BlockTimes::resolve(date, departure, arrival, days_later)?;

        let mut flight = FlightRecord {
            flight_number: compact_flight_number(caps.name("flight")?.as_str()),
            origin: caps.name("from")?.as_str().to_string(),
            destination: caps.name("to")?.as_str().to_string(),
            aircraft_type: aircraft_type(caps.name("type")?.as_str(), &self.context.reference_data),
            registration: dutch_registration(caps.name("reg")?.as_str()),
            remarks: caps
                .name("remarks")
                .map(|m| collapse_whitespace(m.as_str()))
                .unwrap_or_default(),
            ..Default::default()
        };
        apply_function(&mut flight, caps.name("function")?.as_str());
        if caps.name("pf").is_some() {
            flight.is_pilot_flying = true;
            flight.takeoffs_day = 1;
            flight.landings_day = 1;
        }
        times.apply_to(&mut flight);
        Some(flight)
    }

    fn parse_simulator(line: &str, anchor: &DateAnchor) -> Option<FlightRecord> {
        let caps = SIMULATOR_LINE.captures(line)?;
        let session = recognize_simulator_session(caps.name("text")?.as_str())?;
        let date = Self::resolve_date(&caps, anchor)?;
        let departure = parse_clock(caps.name("out")?.as_str())?;
        let arrival = parse_clock(caps.name("in")?.as_str())?;
        let times = BlockTimes::resolve(date, departure, arrival, None)?;

        let mut flight = FlightRecord {
            origin: KLM_BASE.to_string(),
            destination: KLM_BASE.to_string(),
            ..Default::default()
        };
        times.apply_to(&mut flight);
        session.apply_to(&mut flight, times.minutes());
        if let Some(code) = caps
            .name("rest")
            .and_then(|rest| FUNCTION_CODE.captures(rest.as_str()))
            .and_then(|function| function.get(1))
        {
            apply_function(&mut flight, code.as_str());
        }
        Some(flight)
    }
}

impl CompletedFlightsExtractor for KlmMonthlyExtractor {
    fn extract_completed(
        &self,
        lines: &[String],
    ) -> Result<Option<CompletedFlights>, ExtractionError> {
        if !lines.iter().any(|line| line.contains(OVERVIEW_BANNER)) {
            return Ok(None);
        }
        let Some((first, last)) = Self::parse_period(lines) else {
            return Ok(None);
        };
        let Some(period) = period_between(first, last) else {
            tracing::debug!("Overview period ends before it starts");
            return Ok(None);
        };

        let anchor = DateAnchor::period_start(first);
        let logical = reassemble(lines, &ContinuationRule::day_of_month());
        let mut flights = Vec::new();

        for record in &logical {
            let line = record.text.as_str();
            if !SIMULATOR_LINE.is_match(line) {
                continue;
            }
            let parsed = self
                .parse_flight(line, &anchor)
                .or_else(|| Self::parse_simulator(line, &anchor));
            match parsed {
                Some(flight) => flights.push(flight),
                None => tracing::debug!("Skipping overview record {}: {}", record.number, line),
            }
        }

        let (flights, period) = restrict_to_period(flights, period);
        Ok(Some(CompletedFlights { flights, period }))
    }
}

impl FlightExtractor for KlmMonthlyExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::KlmMonthly
    }

    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError> {
        Ok(self
            .extract_completed(lines)?
            .map(ImportedFlights::CompletedFlights))
    }
}
