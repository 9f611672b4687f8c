//! Extractors Crate
//!
//! This crate turns plain-text dumps of airline rosters, briefing sheets,
//! monthly flight time overviews and third-party logbook exports into
//! canonical flight records.
//!
//! # Architecture
//!
//! - **Types**: Flight records, periods and the extractor traits are defined in
//!   the `shared-types` crate
//! - **Implementations**: One extractor per source format lives in this crate,
//!   built from shared line reassembly, field grammar, date/time and crew
//!   manifest helpers
//!
//! # Available Extractors
//!
//! - `SkylogCsvExtractor`, `MccPilotLogExtractor`, `LogTenProExtractor`:
//!   complete logbooks from header-indexed exports
//! - `KlcRosterExtractor`, `KlmIcaRosterExtractor`, `KlcBriefingExtractor`:
//!   planned flights with the period they cover
//! - `KlmMonthlyExtractor`, `KlcMonthlyExtractor`: flown flights for a month
//!
//! # Example
//!
//! ```rust,ignore
//! use extractors::ImportDispatcher;
//! use shared_types::ExtractionContext;
//!
//! let dispatcher = ImportDispatcher::new(ExtractionContext::new(today));
//! if let Some((format, imported)) = dispatcher.dispatch(&lines)? {
//!     println!("{format}: {} flights", imported.flights().len());
//! }
//! ```

pub mod crew;
pub mod date_time;
pub mod dispatcher;
pub mod grammar;
pub mod klc;
pub mod klm;
pub mod logbook_exports;
pub mod reassembly;
pub mod reference;

// Re-export commonly used types
pub use dispatcher::ImportDispatcher;
pub use klc::{KlcBriefingExtractor, KlcMonthlyExtractor, KlcRosterExtractor};
pub use klm::{KlmIcaRosterExtractor, KlmMonthlyExtractor};
pub use logbook_exports::{
    write_skylog_csv, LogTenProExtractor, MccPilotLogExtractor, SkylogCsvExtractor,
};
pub use reference::{build_reference_data, parse_airport_codes};

// Re-export the extractor traits from shared-types for convenience
pub use shared_types::{
    CompleteLogbookExtractor, CompletedFlightsExtractor, FlightExtractor, PlannedFlightsExtractor,
};
