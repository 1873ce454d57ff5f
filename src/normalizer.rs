use crate::config::Config;
use crate::dataset::{Dataset, RawValue};
use crate::error::{DatasetError, ParseError};
use crate::parsers;
use crate::report::{Event, Reporter};
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Converts one raw cell to its canonical form. `Ok(None)` for empty input.
pub fn convert_single(raw: &RawValue<'_>) -> Result<Option<String>, ParseError> {
    Ok(parsers::parse(raw)?.map(|dt| parsers::format_canonical(&dt)))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    pub converted: usize,
    pub empty: usize,
    pub failed: usize,
}

pub struct Normalizer {
    output_column: String,
}

impl Normalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            output_column: config.output_column.clone(),
        }
    }

    /// Maps every value of `column` through [`convert_single`] and stores the
    /// result as the first column. Bad values become `None` and are reported;
    /// the row count never changes. `source` only labels rejection events.
    pub fn convert_timestamps(
        &self,
        source: &Path,
        dataset: Dataset,
        column: &str,
        reporter: &dyn Reporter,
    ) -> Result<(Dataset, ConversionStats), DatasetError> {
        let idx = dataset
            .column_index(column)
            .ok_or_else(|| DatasetError::UnknownColumn(column.to_string()))?;

        let results = convert_column(&dataset, idx);

        let mut stats = ConversionStats::default();
        let mut values = Vec::with_capacity(results.len());
        for (row, (raw, result)) in dataset.column_values(idx).zip(results).enumerate() {
            match result {
                Ok(Some(ts)) => {
                    stats.converted += 1;
                    values.push(Some(ts));
                }
                Ok(None) => {
                    stats.empty += 1;
                    values.push(None);
                }
                Err(err) => {
                    stats.failed += 1;
                    reporter.report(Event::ValueRejected {
                        path: source.to_path_buf(),
                        row,
                        value: raw.unwrap_or_default().to_string(),
                        error: err.to_string(),
                    });
                    values.push(None);
                }
            }
        }

        Ok((dataset.with_front_column(&self.output_column, values), stats))
    }
}

#[cfg(not(feature = "parallel"))]
fn convert_column(dataset: &Dataset, idx: usize) -> Vec<Result<Option<String>, ParseError>> {
    dataset
        .column_values(idx)
        .map(|v| convert_single(&RawValue::from(v)))
        .collect()
}

// Each value depends only on itself, so order is restored by `collect`.
#[cfg(feature = "parallel")]
fn convert_column(dataset: &Dataset, idx: usize) -> Vec<Result<Option<String>, ParseError>> {
    dataset
        .rows()
        .par_iter()
        .map(|row| convert_single(&RawValue::from(row.get(idx).and_then(|v| v.as_deref()))))
        .collect()
}
