//! Stats module - deltas, smoothing and per-region summaries

mod delta;
mod smoother;
mod summary;

pub use delta::DeltaComputer;
pub use smoother::{Smoother, DEFAULT_WINDOW};
pub use summary::{RegionSummary, SummaryCalculator};
