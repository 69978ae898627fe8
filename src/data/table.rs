//! Dated Table Module
//! A date axis paired with a polars frame of `Float64` region columns.
//!
//! Each pipeline stage wraps [`DatedFrame`] in its own newtype so a stage can
//! only consume the output of the stage before it.

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::ops::Deref;

/// Region columns indexed by reporting date.
#[derive(Debug, Clone)]
pub struct DatedFrame {
    dates: Vec<NaiveDate>,
    frame: DataFrame,
}

impl DatedFrame {
    /// Pair a date axis with a frame. Every column must be `Float64` and the
    /// frame height must match the number of dates.
    pub fn new(dates: Vec<NaiveDate>, frame: DataFrame) -> Result<Self> {
        if frame.width() > 0 && frame.height() != dates.len() {
            return Err(PipelineError::data_format(format!(
                "frame has {} rows but {} dates were given",
                frame.height(),
                dates.len()
            )));
        }
        if let Some(col) = frame
            .get_columns()
            .iter()
            .find(|col| col.dtype() != &DataType::Float64)
        {
            return Err(PipelineError::data_format(format!(
                "region column '{}' has type {}, expected f64",
                col.name(),
                col.dtype()
            )));
        }
        Ok(Self { dates, frame })
    }

    /// Build from per-region value vectors, keeping the given order.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();
        let frame = DataFrame::new(columns)?;
        Self::new(dates, frame)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of reporting days.
    pub fn height(&self) -> usize {
        self.dates.len()
    }

    /// Region names in column order.
    pub fn regions(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Values of one region, `None` where the cell is missing.
    pub fn values(&self, region: &str) -> Result<Vec<Option<f64>>> {
        let ca = self.frame.column(region)?.f64()?;
        Ok(ca.into_iter().collect())
    }

    /// Every region with its values, in column order.
    pub fn columns(&self) -> Result<Vec<(String, Vec<Option<f64>>)>> {
        self.regions()
            .into_iter()
            .map(|region| {
                let values = self.values(&region)?;
                Ok((region, values))
            })
            .collect()
    }

    /// Number of missing cells in one region.
    pub fn null_count(&self, region: &str) -> Result<usize> {
        Ok(self.frame.column(region)?.null_count())
    }
}

/// Unwrap every cell of a column that must have no gaps. `stage` names the
/// table in the error message.
pub(crate) fn dense_values(
    region: &str,
    values: &[Option<f64>],
    stage: &str,
) -> Result<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                PipelineError::data_format(format!(
                    "region '{region}' has a gap at row {row} in the {stage}"
                ))
            })
        })
        .collect()
}

macro_rules! stage_table {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(DatedFrame);

        impl $name {
            pub(crate) fn new(inner: DatedFrame) -> Self {
                Self(inner)
            }
        }

        impl Deref for $name {
            type Target = DatedFrame;

            fn deref(&self) -> &DatedFrame {
                &self.0
            }
        }
    };
}

stage_table!(
    /// Cumulative counts as loaded, including the aggregate column.
    RawTable
);
stage_table!(
    /// Cumulative counts with the baseline applied, the aggregate dropped and
    /// gaps forward-filled. Dense.
    CleanedTable
);
stage_table!(
    /// Day-over-day differences of a [`CleanedTable`]. Row 0 is zero.
    DeltaTable
);

impl RawTable {
    /// Wrap a frame as loaded input. Used by the loader and by callers that
    /// already hold the data in memory.
    pub fn from_frame(inner: DatedFrame) -> Self {
        Self::new(inner)
    }
}

/// Trailing means of a [`DeltaTable`]. The first `window - 1` rows are null.
#[derive(Debug, Clone)]
pub struct SmoothedTable {
    inner: DatedFrame,
    window: usize,
}

impl SmoothedTable {
    pub(crate) fn new(inner: DatedFrame, window: usize) -> Self {
        Self { inner, window }
    }

    /// First row index holding a real smoothed value.
    pub fn valid_from(&self) -> usize {
        self.window - 1
    }
}

impl Deref for SmoothedTable {
    type Target = DatedFrame;

    fn deref(&self) -> &DatedFrame {
        &self.inner
    }
}
