//! Pipeline Module
//! Runs Loader → Cleaner → DeltaComputer → Smoother → Reshaper → Renderer once.

use crate::charts::{ChartBundle, ColorAssignment, HtmlRenderer, Reshaper, PALETTE};
use crate::config::PipelineConfig;
use crate::data::{Cleaner, DataLoader, RawTable};
use crate::error::{PipelineError, Result};
use crate::stats::{DeltaComputer, RegionSummary, Smoother, SummaryCalculator};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Everything the renderer needs, plus the per-region summary.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub bundle: ChartBundle,
    pub colors: ColorAssignment,
    pub summaries: Vec<RegionSummary>,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Load the source and build the chart bundle.
    pub fn prepare(&self) -> Result<PipelineOutput> {
        if self.config.window == 0 {
            return Err(PipelineError::config("smoothing window must be positive"));
        }
        let raw = DataLoader::load(&self.config.source)?;
        self.prepare_table(&raw)
    }

    /// Build the chart bundle from a table already in memory.
    pub fn prepare_table(&self, raw: &RawTable) -> Result<PipelineOutput> {
        let cleaned = Cleaner::clean(raw, &self.config.clean)?;
        let deltas = DeltaComputer::compute(&cleaned)?;
        let smoothed = Smoother::smooth(&deltas, self.config.window)?;
        let bundle = Reshaper::reshape(&smoothed)?;

        let regions: Vec<&str> = bundle.regions().collect();
        let colors = ColorAssignment::new(&regions, &PALETTE)?;
        let summaries = SummaryCalculator::summarize(&deltas, &bundle)?;

        Ok(PipelineOutput {
            bundle,
            colors,
            summaries,
        })
    }

    /// Full run: prepare, render, write, and optionally open the page.
    pub fn run(&self) -> Result<PathBuf> {
        let start = Instant::now();
        let output = self.prepare()?;

        let path = HtmlRenderer::write(
            &output.bundle,
            &output.colors,
            &self.config.render,
            &self.config.output,
        )?;

        for summary in &output.summaries {
            info!(
                region = %summary.region,
                total = summary.total_new_cases,
                peak = summary.peak_value,
                peak_date = ?summary.peak_date,
                "region summary"
            );
        }

        if self.config.open_after_render {
            if let Err(e) = open::that(&path) {
                warn!(path = %path.display(), error = %e, "could not open chart");
            }
        }

        info!(elapsed = ?start.elapsed(), "pipeline finished");
        Ok(path)
    }
}
