//! casecurve - Daily Cases Chart
//!
//! Fetches the cumulative case table and writes the smoothed chart page.

use anyhow::{Context, Result};
use casecurve::{Pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = PipelineConfig::from_env().show_when_done();
    info!(source = %config.source, window = config.window, "startup");

    let path = Pipeline::new(config)
        .run()
        .context("building the daily cases chart")?;

    info!("chart written to {}", path.display());
    Ok(())
}
