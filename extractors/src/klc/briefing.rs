use crate::date_time::{
    parse_clock, parse_day_marker, parse_day_month, parse_day_month_year, period_between,
    BlockTimes, DateAnchor,
};
use crate::grammar::{aircraft_type, compact_flight_number, normalize_registration};
use chrono::NaiveDate;
use regex::Regex;
use shared_types::{
    CoveringPeriod, ExtractionContext, ExtractionError, FlightExtractor, FlightRecord,
    ImportedFlights, PlannedFlights, PlannedFlightsExtractor, SourceFormat,
};
use std::sync::LazyLock;

const BRIEFING_BANNER: &str = "CREW BRIEFING";

static DATE_BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Date:\s*(\d{1,2}[A-Za-z]{3}(?:\d{2}|\d{4})?)\b").unwrap());

static FLIGHT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<flight>[A-Z0-9]{2}\s?\d{1,4}[A-Z]?)\s+(?P<date>\d{1,2}[A-Za-z]{3})\s+(?P<from>[A-Z]{3})\s+(?P<out>\d{4})Z?\s+(?P<to>[A-Z]{3})\s+(?P<in>\d{4})Z?(?:\s*(?P<days>\+\d))?(?:\s+(?P<type>\S+))?(?:\s+(?P<reg>[A-Z]{2}-?[A-Z0-9]{3}))?\s*$",
    )
    .unwrap()
});

/// Extractor for KLM Cityhopper crew briefing sheets
///
/// The briefing date may omit the year; it is then taken closest to the
/// reference date of the context.
pub struct KlcBriefingExtractor {
    context: ExtractionContext,
}

impl KlcBriefingExtractor {
    pub fn new(context: ExtractionContext) -> Self {
        Self { context }
    }

    fn briefing_date(&self, lines: &[String]) -> Option<NaiveDate> {
        let token = lines
            .iter()
            .find_map(|line| DATE_BANNER.captures(line)?.get(1))?
            .as_str();

        parse_day_month_year(token).or_else(|| {
            let (day, month) = parse_day_month(token)?;
            DateAnchor::new(self.context.reference_date).resolve_day_month(day, month)
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
            registration: caps
                .name("reg")
                .map(|m| normalize_registration(m.as_str()))
                .unwrap_or_default(),
            is_planned: true,
            ..Default::default()
        };
        times.apply_to(&mut flight);
        Some(flight)
    }
}

impl PlannedFlightsExtractor for KlcBriefingExtractor {
    fn extract_planned(
        &self,
        lines: &[String],
    ) -> Result<Option<PlannedFlights>, ExtractionError> {
        if !lines.iter().any(|line| line.contains(BRIEFING_BANNER)) {
            return Ok(None);
        }
        let Some(briefing_date) = self.briefing_date(lines) else {
            return Ok(None);
        };

        let anchor = DateAnchor::new(briefing_date);
        let mut flights = Vec::new();
        for (position, line) in lines.iter().enumerate() {
            let line = line.trim();
            if !FLIGHT_LINE.is_match(line) {
                continue;
            }
            match self.parse_flight(line, &anchor) {
                Some(flight) => flights.push(flight),
                None => tracing::debug!("Skipping briefing line {}: {}", position + 1, line),
            }
        }

        let period = CoveringPeriod::covering(&flights)
            .or_else(|| period_between(briefing_date, briefing_date))
            .ok_or_else(|| ExtractionError::InvalidInput("Briefing date out of range".into()))?;

        Ok(Some(PlannedFlights { flights, period }))
    }
}

impl FlightExtractor for KlcBriefingExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::KlcBriefing
    }

    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError> {
        Ok(self
            .extract_planned(lines)?
            .map(ImportedFlights::PlannedFlights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_time::{epoch_seconds, start_of_day};
    use chrono::NaiveTime;

    const SAMPLE: &str = "\
KLM Cityhopper               CREW BRIEFING
Date: 17MAR22                Base: AMS

Flight  Date   From       To         Type  Reg
KL1587  17MAR  AMS 0755Z  BGO 1025Z  E190  PHEXA
KL1588  17MAR  BGO 2305Z  AMS 0050Z +1  E90  PH-EXA
KL1589  31FEB  AMS 0755Z  BGO 1025Z  E190  PHEXA";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn extractor(reference_date: NaiveDate) -> KlcBriefingExtractor {
        KlcBriefingExtractor::new(ExtractionContext::new(reference_date))
    }

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_extract_briefing() {
        let planned = extractor(date(2024, 1, 1))
            .extract_planned(&lines(SAMPLE))
            .unwrap()
            .unwrap();

        assert_eq!(planned.flights.len(), 2);

        let first = &planned.flights[0];
        assert_eq!(first.flight_number, "KL1587");
        assert_eq!(first.time_out, epoch_seconds(date(2022, 3, 17), time(7, 55)));
        assert_eq!(first.aircraft_type, "E190");
        assert_eq!(first.registration, "PH-EXA");
        assert!(first.is_planned);

        let second = &planned.flights[1];
        assert_eq!(second.aircraft_type, "E190");
        assert_eq!(second.time_in, epoch_seconds(date(2022, 3, 18), time(0, 50)));

        assert_eq!(planned.period.start, first.time_out);
        assert_eq!(planned.period.end, second.time_in);
    }

    #[test]
    fn test_date_without_year_uses_reference_date() {
        let text = "CREW BRIEFING\nDate: 02JAN\nKL1001  02JAN  AMS 0600Z  LHR 0715Z  E75";
        let planned = extractor(date(2022, 12, 30))
            .extract_planned(&lines(text))
            .unwrap()
            .unwrap();

        assert_eq!(planned.flights[0].time_out, epoch_seconds(date(2023, 1, 2), time(6, 0)));
        assert_eq!(planned.flights[0].aircraft_type, "E175");
    }

    #[test]
    fn test_empty_briefing_covers_its_day() {
        let text = "CREW BRIEFING\nDate: 17MAR22\nNo flights";
        let planned = extractor(date(2022, 3, 1))
            .extract_planned(&lines(text))
            .unwrap()
            .unwrap();

        assert!(planned.flights.is_empty());
        assert_eq!(planned.period.start, start_of_day(date(2022, 3, 17)));
    }

    #[test]
    fn test_missing_banner_is_no_match() {
        let text = "Date: 17MAR22\nKL1587  17MAR  AMS 0755Z  BGO 1025Z  E190  PHEXA";
        assert!(extractor(date(2022, 3, 1))
            .extract_planned(&lines(text))
            .unwrap()
            .is_none());
    }
}
