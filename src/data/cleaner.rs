//! Data Cleaner Module
//! Applies the zero baseline, drops the aggregate column and forward-fills gaps.

use crate::data::table::{CleanedTable, DatedFrame, RawTable};
use crate::error::{PipelineError, Result};
use tracing::{debug, info};

/// Named cleaning parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    /// Column holding the national total, removed before any per-region work.
    pub aggregate_column: String,
    /// Treat the first reporting date as the baseline by forcing it to zero.
    pub zero_first_row: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            aggregate_column: "CH".to_string(),
            zero_first_row: true,
        }
    }
}

/// Turns a [`RawTable`] into a dense [`CleanedTable`].
pub struct Cleaner;

impl Cleaner {
    pub fn clean(raw: &RawTable, options: &CleanOptions) -> Result<CleanedTable> {
        if raw.height() == 0 {
            return Err(PipelineError::data_format("input table has no rows"));
        }

        let regions = raw.regions();
        if !regions.contains(&options.aggregate_column) {
            return Err(PipelineError::data_format(format!(
                "aggregate column '{}' not found",
                options.aggregate_column
            )));
        }
        if regions.len() == 1 {
            return Err(PipelineError::data_format(
                "no region columns remain once the aggregate column is dropped",
            ));
        }

        let mut columns = Vec::with_capacity(regions.len() - 1);
        for (region, mut values) in raw.columns()? {
            if region == options.aggregate_column {
                continue;
            }
            if options.zero_first_row {
                values[0] = Some(0.0);
            }

            let gaps = values.iter().filter(|v| v.is_none()).count();
            let filled = Self::forward_fill(&region, &values)?;
            if gaps > 0 {
                debug!(region = %region, gaps, "forward-filled missing values");
            }
            columns.push((region, filled.into_iter().map(Some).collect()));
        }

        info!(
            regions = columns.len(),
            dropped = %options.aggregate_column,
            "cleaned case table"
        );
        let table = DatedFrame::from_columns(raw.dates().to_vec(), columns)?;
        Ok(CleanedTable::new(table))
    }

    /// Replace each gap with the nearest earlier value in the same column.
    /// A gap with no earlier value is an error.
    pub fn forward_fill(region: &str, values: &[Option<f64>]) -> Result<Vec<f64>> {
        let mut last = None;
        values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                if value.is_some() {
                    last = *value;
                }
                last.ok_or_else(|| {
                    PipelineError::data_format(format!(
                        "region '{region}' is missing row {row} with no earlier value to carry forward"
                    ))
                })
            })
            .collect()
    }
}
