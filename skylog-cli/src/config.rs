use chrono::NaiveDate;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"
[import]
# Anchor for documents that print dates without a year, defaults to today
# reference_date = "2022-03-01"

[reference]
# Airport table with `iata` and `icao` columns
# airports_csv = "/path/to/airports.csv"

[reference.aircraft_types]
# "embraer 190" = "E190"

[output]
pretty = false
"#;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ImportConfig {
    pub import: Option<ImportSection>,
    pub reference: Option<ReferenceConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ImportSection {
    pub reference_date: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ReferenceConfig {
    pub airports_csv: Option<PathBuf>,
    #[serde(default)]
    pub aircraft_types: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
}

impl ImportConfig {
    /// Load an explicit config file, or the default one (created when missing)
    pub fn load(explicit_path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Message(format!(
                        "Config file not found at {path:?}"
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let path = get_config_path();
                write_default_config(&path)?;
                path
            }
        };

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: ImportConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    /// Configured reference date, if any
    pub fn reference_date(&self) -> Result<Option<NaiveDate>, ConfigError> {
        let Some(raw) = self
            .import
            .as_ref()
            .and_then(|import| import.reference_date.as_deref())
        else {
            return Ok(None);
        };

        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|e| ConfigError::Message(format!("Invalid reference_date {raw:?}: {e}")))
    }

    pub fn airports_csv(&self) -> Option<&Path> {
        self.reference
            .as_ref()
            .and_then(|reference| reference.airports_csv.as_deref())
    }

    pub fn aircraft_types(&self) -> HashMap<String, String> {
        self.reference
            .as_ref()
            .map(|reference| reference.aircraft_types.clone())
            .unwrap_or_default()
    }

    pub fn pretty(&self) -> bool {
        self.output.as_ref().is_some_and(|output| output.pretty)
    }
}

fn write_default_config(config_path: &Path) -> Result<(), ConfigError> {
    // Create config directory if it doesn't exist
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::Message(format!("Failed to create config directory: {e}"))
        })?;
    }

    if !config_path.exists() {
        std::fs::write(config_path, DEFAULT_CONFIG).map_err(|e| {
            ConfigError::Message(format!("Failed to write default config: {e}"))
        })?;
    }

    Ok(())
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("skylog").join("import.toml")
    } else {
        PathBuf::from("import.toml")
    }
}
