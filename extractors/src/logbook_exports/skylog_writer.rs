use super::skylog_csv::{escape, COLUMNS, CONTINUATION_MARKER, FIELD_SEPARATOR};
use shared_types::FlightRecord;

/// Serialize records into the `;` separated export, one physical line per entry
///
/// Line breaks inside text fields are written as continuation lines so that
/// [`SkylogCsvExtractor`](super::SkylogCsvExtractor) restores them.
pub fn write_skylog_csv(flights: &[FlightRecord]) -> Vec<String> {
    let separator = FIELD_SEPARATOR.to_string();
    let mut output = vec![COLUMNS.join(&separator)];

    for flight in flights {
        let fields = [
            escape(&flight.flight_number),
            escape(&flight.origin),
            escape(&flight.destination),
            flight.time_out.to_string(),
            flight.time_in.to_string(),
            escape(&flight.aircraft_type),
            escape(&flight.registration),
            escape(&flight.crew_names.join(&separator)),
            flight.is_planned.to_string(),
            flight.is_simulator.to_string(),
            flight.simulator_minutes.to_string(),
            escape(&flight.remarks),
            flight.is_pic.to_string(),
            flight.is_copilot.to_string(),
            flight.is_picus.to_string(),
            flight.is_dual.to_string(),
            flight.is_instructor.to_string(),
            flight.is_pilot_flying.to_string(),
            flight.takeoffs_day.to_string(),
            flight.takeoffs_night.to_string(),
            flight.landings_day.to_string(),
            flight.landings_night.to_string(),
            flight.autolands.to_string(),
        ];

        let line = fields.join(&separator);
        let mut physical = line.split('\n');
        if let Some(first) = physical.next() {
            output.push(first.to_string());
        }
        output.extend(physical.map(|rest| format!("{CONTINUATION_MARKER}{rest}")));
    }

    output
}
