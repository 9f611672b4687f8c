//! Re-joins soft-wrapped lines produced by the text extraction step.

use regex::Regex;

/// How a format marks a physical line as belonging to the previous record
#[derive(Debug, Clone)]
pub enum ContinuationRule {
    /// Lines starting with the marker continue the previous line. The marker is
    /// removed and a newline restores the wrapped text field.
    MarkerPrefixed(char),

    /// Only lines matching the shape start a record; anything else is appended
    /// to the current record, separated by a single space. Lines before the
    /// first record start are kept as they are.
    ShapeBased(Regex),
}

impl ContinuationRule {
    /// A record starts with a two digit day-of-month followed by whitespace
    pub fn day_of_month() -> Self {
        ContinuationRule::ShapeBased(Regex::new(r"^\d{2}\s").unwrap())
    }
}

/// A record after reassembly, numbered by the physical line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based
    pub number: usize,
    pub text: String,
}

/// Merge continuation lines into their logical record
///
/// The first line is always kept verbatim and no content is ever dropped.
/// Under the shape rule blank lines inside a record carry nothing and are
/// skipped, so page breaks do not cut a wrapped record short.
pub fn reassemble<S: AsRef<str>>(lines: &[S], rule: &ContinuationRule) -> Vec<LogicalLine> {
    let mut output: Vec<LogicalLine> = Vec::with_capacity(lines.len());
    let mut in_record = false;

    for (position, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let start = |text: &str| LogicalLine {
            number: position + 1,
            text: text.to_string(),
        };

        match rule {
            ContinuationRule::MarkerPrefixed(marker) => match line.strip_prefix(*marker) {
                Some(rest) if !output.is_empty() => {
                    if let Some(last) = output.last_mut() {
                        last.text.push('\n');
                        last.text.push_str(rest);
                    }
                }
                _ => output.push(start(line)),
            },
            ContinuationRule::ShapeBased(shape) => {
                if shape.is_match(line) {
                    in_record = true;
                    output.push(start(line));
                } else if in_record {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if let Some(last) = output.last_mut() {
                        last.text.push(' ');
                        last.text.push_str(line);
                    }
                } else {
                    output.push(start(line));
                }
            }
        }
    }

    output
}
