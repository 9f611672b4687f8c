//! KLM Cityhopper documents: monthly rosters, crew briefing sheets and
//! flight time overviews.

pub mod briefing;
pub mod monthly;
pub mod roster;

pub use briefing::KlcBriefingExtractor;
pub use monthly::KlcMonthlyExtractor;
pub use roster::KlcRosterExtractor;

/// Home base for simulator sessions printed without a location
pub const KLC_BASE: &str = "AMS";
pub const KLC_BASE_ICAO: &str = "EHAM";
