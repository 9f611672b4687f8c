use super::csv_parser::{CsvParser, CsvRow};
use crate::date_time::{parse_clock, parse_date, BlockTimes};
use crate::grammar::{aircraft_type, compact_flight_number, normalize_registration, optional_field};
use shared_types::{
    CompleteLogbookExtractor, ExtractionContext, ExtractionError, FlightExtractor, FlightRecord,
    ImportedFlights, SourceFormat, SELF_NAME,
};

const REQUIRED_COLUMNS: [&str; 5] = [
    "flight_flightDate",
    "flight_from",
    "flight_to",
    "flight_actualDepartureTime",
    "flight_actualArrivalTime",
];

const CREW_COLUMNS: [&str; 3] = [
    "flight_selectedCrewPIC",
    "flight_selectedCrewSIC",
    "flight_selectedCrewRelief",
];

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Extractor for LogTen Pro tab-separated exports
///
/// LogTen writes IATA airport codes; three letter codes are mapped to ICAO
/// through the reference data.
pub struct LogTenProExtractor {
    csv_parser: CsvParser,
    context: ExtractionContext,
}

impl LogTenProExtractor {
    pub fn new(context: ExtractionContext) -> Self {
        Self {
            csv_parser: CsvParser::new(b'\t').without_quoting(),
            context,
        }
    }

    fn airport(&self, row: &CsvRow, column: &str) -> String {
        row.value(column)
            .map(|code| self.context.reference_data.icao_for(code).to_uppercase())
            .unwrap_or_default()
    }

    fn parse_row(&self, row: &CsvRow) -> Option<FlightRecord> {
        let date = parse_date(row.value("flight_flightDate")?, &DATE_FORMATS)?;
        let departure = parse_clock(row.value("flight_actualDepartureTime")?)?;
        let arrival = parse_clock(row.value("flight_actualArrivalTime")?)?;
        let times = BlockTimes::resolve(date, departure, arrival, None)?;

        let crew: Vec<String> = CREW_COLUMNS
            .iter()
            .filter_map(|column| row.value(column))
            .map(|name| {
                if name.eq_ignore_ascii_case(SELF_NAME) {
                    SELF_NAME.to_string()
                } else {
                    name.to_string()
                }
            })
            .collect();

        let simulator_minutes = row.minutes("flight_simulator");
        let is_simulator = simulator_minutes > 0;

        let mut flight = FlightRecord {
            flight_number: compact_flight_number(&optional_field(row.get("flight_flightNumber"))),
            origin: self.airport(row, "flight_from"),
            destination: self.airport(row, "flight_to"),
            aircraft_type: row
                .value("aircraftType_type")
                .map(|code| aircraft_type(code, &self.context.reference_data))
                .unwrap_or_default(),
            registration: normalize_registration(&optional_field(row.get("aircraft_aircraftID"))),
            is_simulator,
            simulator_minutes,
            remarks: optional_field(row.get("flight_remarks")),
            is_pic: row.minutes("flight_pic") > 0,
            is_copilot: row.minutes("flight_sic") > 0,
            is_picus: row.minutes("flight_picus") > 0,
            is_dual: row.minutes("flight_dualReceived") > 0,
            is_instructor: row.minutes("flight_dualGiven") > 0,
            is_pilot_flying: row.flag("flight_pilotFlying"),
            takeoffs_day: row.count("flight_dayTakeoffs"),
            takeoffs_night: row.count("flight_nightTakeoffs"),
            landings_day: row.count("flight_dayLandings"),
            landings_night: row.count("flight_nightLandings"),
            autolands: row.count("flight_autolands"),
            ..Default::default()
        };
        times.apply_to(&mut flight);
        flight.set_crew(crew);

        Some(flight)
    }
}

impl CompleteLogbookExtractor for LogTenProExtractor {
    fn extract_logbook(
        &self,
        lines: &[String],
    ) -> Result<Option<Vec<FlightRecord>>, ExtractionError> {
        let content = lines.join("\n");
        let Some(table) = self.csv_parser.parse_to_maps(&content, &REQUIRED_COLUMNS)? else {
            return Ok(None);
        };

        let mut flights = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            match self.parse_row(row) {
                Some(flight) => flights.push(flight),
                None => tracing::debug!("Skipping unparsable LogTen Pro row {}", row.line),
            }
        }

        Ok(Some(flights))
    }
}

impl FlightExtractor for LogTenProExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::LogTenPro
    }

    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError> {
        Ok(self
            .extract_logbook(lines)?
            .map(ImportedFlights::CompleteLogbook))
    }
}
