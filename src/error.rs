//! Error Module
//! Pipeline-level error taxonomy. Stages with their own failure modes (the
//! loader and the renderer) keep a local error enum that converts into
//! [`PipelineError`]. All variants are fatal.

use crate::charts::RenderError;
use crate::data::LoaderError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed input table: {0}")]
    DataFormat(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Region '{region}' has {actual} values but the date axis has {expected}")]
    Alignment {
        region: String,
        expected: usize,
        actual: usize,
    },
    #[error("Failed to load source: {0}")]
    Load(LoaderError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to render chart: {0}")]
    Render(#[from] RenderError),
}

impl PipelineError {
    pub(crate) fn data_format(msg: impl Into<String>) -> Self {
        PipelineError::DataFormat(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PipelineError::Config(msg.into())
    }
}

/// Malformed content found by the loader stays a `DataFormat` error; transport
/// and parser failures are wrapped.
impl From<LoaderError> for PipelineError {
    fn from(e: LoaderError) -> Self {
        match e {
            LoaderError::DataFormat(msg) => PipelineError::DataFormat(msg),
            other => PipelineError::Load(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
