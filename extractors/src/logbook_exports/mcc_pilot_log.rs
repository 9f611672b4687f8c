use super::csv_parser::{CsvParser, CsvRow};
use crate::date_time::{parse_clock, parse_date, BlockTimes};
use crate::grammar::{aircraft_type, compact_flight_number, normalize_registration, optional_field};
use shared_types::{
    CompleteLogbookExtractor, ExtractionContext, ExtractionError, FlightExtractor, FlightRecord,
    ImportedFlights, SourceFormat, SELF_NAME,
};

const REQUIRED_COLUMNS: [&str; 6] = [
    "mcc_DATE",
    "FLIGHTNUMBER",
    "AF_DEP",
    "TIME_DEP",
    "AF_ARR",
    "TIME_ARR",
];

const PILOT_COLUMNS: [&str; 4] = ["PILOT1_NAME", "PILOT2_NAME", "PILOT3_NAME", "PILOT4_NAME"];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Extractor for MCC PilotLog CSV exports
pub struct MccPilotLogExtractor {
    csv_parser: CsvParser,
    context: ExtractionContext,
}

impl MccPilotLogExtractor {
    pub fn new(context: ExtractionContext) -> Self {
        Self {
            csv_parser: CsvParser::new(b','),
            context,
        }
    }

    fn parse_row(&self, row: &CsvRow) -> Option<FlightRecord> {
        let date = parse_date(row.value("mcc_DATE")?, &DATE_FORMATS)?;
        let departure = parse_clock(row.value("TIME_DEP")?)?;
        let arrival = parse_clock(row.value("TIME_ARR")?)?;
        let times = BlockTimes::resolve(date, departure, arrival, None)?;

        let crew: Vec<String> = PILOT_COLUMNS
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

        let is_simulator = row.flag("AC_ISSIM");

        let mut flight = FlightRecord {
            flight_number: compact_flight_number(&optional_field(row.get("FLIGHTNUMBER"))),
            origin: optional_field(row.get("AF_DEP")).to_uppercase(),
            destination: optional_field(row.get("AF_ARR")).to_uppercase(),
            aircraft_type: row
                .value("AC_MODEL")
                .map(|model| aircraft_type(model, &self.context.reference_data))
                .unwrap_or_default(),
            registration: normalize_registration(&optional_field(row.get("AC_REG"))),
            is_simulator,
            simulator_minutes: if is_simulator {
                row.minutes("TIME_TOTALSIM")
            } else {
                0
            },
            remarks: optional_field(row.get("REMARKS")),
            is_pic: row.minutes("TIME_PIC") > 0,
            is_copilot: row.minutes("TIME_SIC") > 0,
            is_picus: row.minutes("TIME_PICUS") > 0,
            is_dual: row.minutes("TIME_DUAL") > 0,
            is_instructor: row.minutes("TIME_INSTRUCTOR") > 0,
            is_pilot_flying: row.flag("PF"),
            takeoffs_day: row.count("TO_DAY"),
            takeoffs_night: row.count("TO_NIGHT"),
            landings_day: row.count("LDG_DAY"),
            landings_night: row.count("LDG_NIGHT"),
            autolands: row.count("AUTOLAND"),
            ..Default::default()
        };
        times.apply_to(&mut flight);
        flight.set_crew(crew);

        Some(flight)
    }
}

impl CompleteLogbookExtractor for MccPilotLogExtractor {
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
                None => tracing::debug!("Skipping unparsable MCC PilotLog row {}", row.line),
            }
        }

        Ok(Some(flights))
    }
}

impl FlightExtractor for MccPilotLogExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::MccPilotLog
    }

    fn extract(&self, lines: &[String]) -> Result<Option<ImportedFlights>, ExtractionError> {
        Ok(self
            .extract_logbook(lines)?
            .map(ImportedFlights::CompleteLogbook))
    }
}
