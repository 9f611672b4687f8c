use crate::klc::{KlcBriefingExtractor, KlcMonthlyExtractor, KlcRosterExtractor};
use crate::klm::{KlmIcaRosterExtractor, KlmMonthlyExtractor};
use crate::logbook_exports::{LogTenProExtractor, MccPilotLogExtractor, SkylogCsvExtractor};
use shared_types::{
    ExtractionContext, ExtractionError, FlightExtractor, ImportedFlights, SourceFormat,
};

/// Tries every registered extractor in turn until one recognizes the input
///
/// Order matters where banners overlap: the ICA roster carries the same
/// period banner as the Cityhopper roster and is tried first.
pub struct ImportDispatcher {
    extractors: Vec<Box<dyn FlightExtractor>>,
}

impl ImportDispatcher {
    /// Dispatcher with every supported format registered
    pub fn new(context: ExtractionContext) -> Self {
        Self::with_extractors(vec![
            Box::new(SkylogCsvExtractor::new()),
            Box::new(MccPilotLogExtractor::new(context.clone())),
            Box::new(LogTenProExtractor::new(context.clone())),
            Box::new(KlmIcaRosterExtractor::new(context.clone())),
            Box::new(KlcRosterExtractor::new(context.clone())),
            Box::new(KlcBriefingExtractor::new(context.clone())),
            Box::new(KlmMonthlyExtractor::new(context.clone())),
            Box::new(KlcMonthlyExtractor::new(context)),
        ])
    }

    pub fn with_extractors(extractors: Vec<Box<dyn FlightExtractor>>) -> Self {
        Self { extractors }
    }

    /// Registered formats, in the order they are tried
    pub fn formats(&self) -> Vec<SourceFormat> {
        self.extractors.iter().map(|e| e.format()).collect()
    }

    /// Extract with the first extractor that recognizes the lines
    ///
    /// `Ok(None)` when no extractor does. Corrupted data aborts the search:
    /// a file that looked like one format but failed to parse is not retried
    /// as another.
    pub fn dispatch(
        &self,
        lines: &[String],
    ) -> Result<Option<(SourceFormat, ImportedFlights)>, ExtractionError> {
        for extractor in &self.extractors {
            let format = extractor.format();
            match extractor.extract(lines) {
                Ok(Some(imported)) => {
                    tracing::info!(
                        "Recognized {} input with {} records (extractor v{})",
                        format,
                        imported.flights().len(),
                        extractor.version()
                    );
                    return Ok(Some((format, imported)));
                }
                Ok(None) => tracing::debug!("Input is not {}", format),
                Err(e) => {
                    tracing::warn!("{} extractor rejected the input: {}", format, e);
                    return Err(e);
                }
            }
        }

        tracing::debug!("No extractor recognized {} lines", lines.len());
        Ok(None)
    }

    /// Extract with one specific format, skipping detection
    pub fn extract_as(
        &self,
        format: SourceFormat,
        lines: &[String],
    ) -> Result<Option<ImportedFlights>, ExtractionError> {
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.format() == format)
            .ok_or_else(|| {
                ExtractionError::InvalidInput(format!("No extractor registered for {format}"))
            })?;

        extractor.extract(lines)
    }
}
