pub mod extraction;
pub mod flight;
pub mod period;
pub mod reference;

pub use extraction::{
    CompleteLogbookExtractor, CompletedFlights, CompletedFlightsExtractor, ExtractionContext,
    ExtractionError, FlightExtractor, ImportedFlights, PlannedFlights, PlannedFlightsExtractor,
    SourceFormat,
};
pub use flight::{FlightRecord, SELF_NAME};
pub use period::CoveringPeriod;
pub use reference::ReferenceData;
