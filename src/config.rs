//! Pipeline Configuration
//! Static settings for one run. Only the source can be overridden, through
//! the `CASES_SOURCE_URL` environment variable.

use crate::charts::RenderOptions;
use crate::data::CleanOptions;
use crate::stats::DEFAULT_WINDOW;
use std::path::PathBuf;

/// Cumulative cases per canton, openZH phase 2.
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/daenuprobst/covid19-cases-switzerland/master/covid19_cases_switzerland_openzh-phase2.csv";

pub const SOURCE_ENV_VAR: &str = "CASES_SOURCE_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// URL or local path of the CSV.
    pub source: String,
    pub clean: CleanOptions,
    /// Smoothing span in rows.
    pub window: usize,
    pub render: RenderOptions,
    pub output: PathBuf,
    /// Open the written page with the system default application.
    pub open_after_render: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            clean: CleanOptions::default(),
            window: DEFAULT_WINDOW,
            render: RenderOptions::default(),
            output: PathBuf::from("Corona cases Switzerland.html"),
            open_after_render: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults, with the source taken from `CASES_SOURCE_URL` when set.
    pub fn from_env() -> Self {
        Self::default().with_source_override(std::env::var(SOURCE_ENV_VAR).ok())
    }

    /// Open the written page once the run finishes. The binary does this;
    /// library callers stay headless unless they ask.
    pub fn show_when_done(mut self) -> Self {
        self.open_after_render = true;
        self
    }

    fn with_source_override(mut self, source: Option<String>) -> Self {
        if let Some(source) = source.filter(|s| !s.trim().is_empty()) {
            self.source = source.trim().to_string();
        }
        self
    }
}
