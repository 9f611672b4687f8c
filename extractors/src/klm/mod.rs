//! KLM mainline documents: intercontinental rosters with crew manifests and
//! monthly flight time overviews.

pub mod ica_roster;
pub mod monthly;

pub use ica_roster::KlmIcaRosterExtractor;
pub use monthly::KlmMonthlyExtractor;

/// Home base for simulator sessions in the monthly overview
pub const KLM_BASE: &str = "AMS";
