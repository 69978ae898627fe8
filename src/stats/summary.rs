//! Region Summary Module
//! Per-region totals and peaks, logged at the end of a run.

use crate::charts::ChartBundle;
use crate::data::DeltaTable;
use crate::error::Result;
use chrono::NaiveDate;
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Headline numbers for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub region: String,
    /// Sum of daily deltas over the whole table.
    pub total_new_cases: f64,
    /// Mean of the smoothed series.
    pub mean_smoothed: f64,
    /// Standard deviation of the smoothed series.
    pub std_smoothed: f64,
    pub peak_value: f64,
    pub peak_date: Option<NaiveDate>,
}

impl Default for RegionSummary {
    fn default() -> Self {
        Self {
            region: String::new(),
            total_new_cases: 0.0,
            mean_smoothed: f64::NAN,
            std_smoothed: f64::NAN,
            peak_value: f64::NAN,
            peak_date: None,
        }
    }
}

pub struct SummaryCalculator;

impl SummaryCalculator {
    /// One summary per region, in bundle order.
    pub fn summarize(deltas: &DeltaTable, bundle: &ChartBundle) -> Result<Vec<RegionSummary>> {
        let regions: Vec<&str> = bundle.regions().collect();
        regions
            .par_iter()
            .map(|region| {
                let total_new_cases = deltas.values(region)?.into_iter().flatten().sum();
                let smoothed = bundle.series(region).unwrap_or_default();
                Ok(Self::describe(
                    region,
                    total_new_cases,
                    smoothed,
                    bundle.dates(),
                ))
            })
            .collect()
    }

    /// Descriptive statistics of one smoothed series.
    pub fn describe(
        region: &str,
        total_new_cases: f64,
        smoothed: &[f64],
        dates: &[NaiveDate],
    ) -> RegionSummary {
        if smoothed.is_empty() {
            return RegionSummary {
                region: region.to_string(),
                total_new_cases,
                ..RegionSummary::default()
            };
        }

        // First occurrence wins on ties.
        let (peak_idx, peak_value) = smoothed
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, v)| {
                if v > best.1 {
                    (i, v)
                } else {
                    best
                }
            });

        RegionSummary {
            region: region.to_string(),
            total_new_cases,
            mean_smoothed: smoothed.iter().mean(),
            std_smoothed: if smoothed.len() > 1 {
                smoothed.iter().std_dev()
            } else {
                0.0
            },
            peak_value,
            peak_date: dates.get(peak_idx).copied(),
        }
    }
}
