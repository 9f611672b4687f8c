use csv::{ErrorKind, ReaderBuilder, StringRecord};
use shared_types::ExtractionError;
use std::collections::HashMap;

/// Reads delimited exports whose first row names the columns
pub struct CsvParser {
    delimiter: u8,
    quoting: bool,
}

/// One data row, addressed by column name
#[derive(Debug, Clone)]
pub struct CsvRow {
    pub line: u64,
    fields: HashMap<String, String>,
}

impl CsvRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Trimmed value, `None` when missing or blank
    pub fn value(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Non-negative count, blank counts as zero
    pub fn count(&self, column: &str) -> u32 {
        self.value(column)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Minutes from either `H:MM` or a plain number, blank counts as zero
    pub fn minutes(&self, column: &str) -> i64 {
        self.value(column)
            .and_then(|v| {
                crate::date_time::parse_duration_minutes(v).or_else(|| v.parse().ok())
            })
            .unwrap_or(0)
    }

    /// `true`, `1`, `yes` and `y` (any case) are true
    pub fn flag(&self, column: &str) -> bool {
        self.value(column)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "y"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvParser {
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            quoting: true,
        }
    }

    pub fn without_quoting(mut self) -> Self {
        self.quoting = false;
        self
    }

    /// Parse the content into rows keyed by header name
    ///
    /// Returns `Ok(None)` when the header row lacks one of `required_columns`,
    /// so unrelated text is never mistaken for corrupted data. A row whose
    /// field count differs from the header aborts with
    /// [`ExtractionError::CorruptedData`].
    pub fn parse_to_maps(
        &self,
        content: &str,
        required_columns: &[&str],
    ) -> Result<Option<CsvTable>, ExtractionError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quoting(self.quoting)
            .has_headers(true)
            .flexible(false)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = match reader.headers() {
            Ok(headers) => headers.iter().map(|h| h.trim().to_string()).collect(),
            Err(e) => {
                tracing::debug!("No readable header row: {}", e);
                return Ok(None);
            }
        };

        if !required_columns
            .iter()
            .all(|column| headers.iter().any(|h| h == column))
        {
            return Ok(None);
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(corruption_error)?;
            rows.push(to_row(&headers, &record));
        }

        Ok(Some(CsvTable { headers, rows }))
    }
}

fn to_row(headers: &[String], record: &StringRecord) -> CsvRow {
    let fields = headers
        .iter()
        .zip(record.iter())
        .map(|(header, field)| (header.clone(), field.to_string()))
        .collect();

    CsvRow {
        line: record.position().map(|p| p.line()).unwrap_or(0),
        fields,
    }
}

fn corruption_error(error: csv::Error) -> ExtractionError {
    match error.kind() {
        ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => ExtractionError::CorruptedData {
            line: pos.as_ref().map(|p| p.line() as usize).unwrap_or(0),
            expected: *expected_len as usize,
            found: *len as usize,
        },
        _ => ExtractionError::ParseError(error.to_string()),
    }
}
