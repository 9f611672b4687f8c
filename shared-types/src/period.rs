use crate::FlightRecord;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Closed interval of UTC epoch seconds a batch of records is asserted to cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CoveringPeriod {
    pub start: i64,
    pub end: i64,
}

impl CoveringPeriod {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Earliest departure to latest arrival, `None` for an empty batch
    pub fn covering(flights: &[FlightRecord]) -> Option<Self> {
        let start = flights.iter().map(|f| f.time_out).min()?;
        let end = flights.iter().map(|f| f.time_in).max()?;
        Some(Self { start, end })
    }

    pub fn contains(&self, instant: i64) -> bool {
        instant >= self.start && instant <= self.end
    }
}
