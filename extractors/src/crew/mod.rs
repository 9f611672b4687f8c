mod manifest;
mod names;

pub use manifest::{
    assign_crew, build_name_table, unknown_crew_placeholder, CrewAssignment,
    CrewManifestResolver, CrewNameTable, FlightKey, ManifestLine,
};
pub use names::{capitalize_words, name_key, CrewName};
