//! Self-describing logbook exports with a header row naming the columns.

pub mod csv_parser;
pub mod log_ten_pro;
pub mod mcc_pilot_log;
pub mod skylog_csv;
pub mod skylog_writer;

pub use csv_parser::{CsvParser, CsvRow, CsvTable};
pub use log_ten_pro::LogTenProExtractor;
pub use mcc_pilot_log::MccPilotLogExtractor;
pub use skylog_csv::SkylogCsvExtractor;
pub use skylog_writer::write_skylog_csv;
