//! CSV Data Loader Module
//! Fetches the cumulative case table and parses it with Polars.

use crate::data::table::{DatedFrame, RawTable};
use crate::error::PipelineError;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to fetch source: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("{0}")]
    DataFormat(String),
}

fn format_err(msg: impl Into<String>) -> LoaderError {
    LoaderError::DataFormat(msg.into())
}

/// Loads a date-indexed table of cumulative counts, one column per region.
pub struct DataLoader;

impl DataLoader {
    /// Load from an `http(s)://` URL or a local path.
    pub fn load(source: &str) -> Result<RawTable, LoaderError> {
        let bytes = Self::read_source(source)?;
        let table = Self::parse_csv(bytes)?;
        info!(
            source = %source,
            rows = table.height(),
            regions = table.regions().len(),
            "loaded case table"
        );
        Ok(table)
    }

    /// Single blocking read of the source. Remote fetches are not retried.
    pub fn read_source(source: &str) -> Result<Vec<u8>, LoaderError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            info!(url = %source, "fetching CSV");
            let body = reqwest::blocking::get(source)?
                .error_for_status()?
                .bytes()?;
            Ok(body.to_vec())
        } else {
            debug!(path = %source, "reading CSV from disk");
            Ok(fs::read(source)?)
        }
    }

    /// Parse CSV bytes: first column is the date, the rest are regions.
    pub fn parse_csv(bytes: Vec<u8>) -> Result<RawTable, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        if df.width() < 2 {
            return Err(format_err(
                "expected a date column followed by at least one region column",
            ));
        }

        let columns = df.get_columns();
        let dates = Self::parse_dates(&columns[0])?;

        let mut regions = Vec::with_capacity(columns.len() - 1);
        for col in &columns[1..] {
            regions.push(Self::region_column(col)?);
        }

        let frame = DataFrame::new(regions)?;
        let table = DatedFrame::new(dates, frame).map_err(|e| match e {
            PipelineError::DataFormat(msg) => LoaderError::DataFormat(msg),
            other => LoaderError::DataFormat(other.to_string()),
        })?;
        Ok(RawTable::from_frame(table))
    }

    fn parse_dates(col: &Column) -> Result<Vec<NaiveDate>, LoaderError> {
        let as_str = col.cast(&DataType::String)?;
        let ca = as_str.as_materialized_series().str()?;

        let dates = ca
            .into_iter()
            .enumerate()
            .map(|(row, raw)| {
                let raw = raw.ok_or_else(|| {
                    format_err(format!("row {row} has no date"))
                })?;
                NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
                    format_err(format!("row {row}: bad date '{raw}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(format_err(format!(
                "dates must be strictly ascending, found {} followed by {}",
                pair[0], pair[1]
            )));
        }

        Ok(dates)
    }

    /// Cast a region column to `Float64`. All-empty columns come back from the
    /// CSV reader as strings and are accepted as fully missing.
    fn region_column(col: &Column) -> Result<Column, LoaderError> {
        let numeric = matches!(
            col.dtype(),
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        );
        let all_missing = col.null_count() == col.len();
        if !numeric && !all_missing {
            return Err(format_err(format!(
                "region column '{}' is not numeric ({})",
                col.name(),
                col.dtype()
            )));
        }

        let values = col.cast(&DataType::Float64)?;
        if let Some(row) = values
            .f64()?
            .into_iter()
            .position(|v| v.is_some_and(|v| v < 0.0))
        {
            return Err(format_err(format!(
                "region column '{}' has a negative count at row {row}",
                col.name()
            )));
        }

        Ok(values)
    }
}
