//! casecurve - smoothed daily case curves per region
//!
//! Loads a cumulative case table, turns it into smoothed daily new cases and
//! writes an interactive HTML line chart.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod stats;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutput};
