//! Rolling Smoother Module
//! Trailing moving average over a fixed window.

use crate::data::{dense_values, DatedFrame, DeltaTable, SmoothedTable};
use crate::error::{PipelineError, Result};
use rayon::prelude::*;
use statrs::statistics::Statistics;
use tracing::info;

/// Default smoothing span in days.
pub const DEFAULT_WINDOW: usize = 3;

/// Smooths each region with a trailing mean of `window` rows.
pub struct Smoother;

impl Smoother {
    pub fn smooth(deltas: &DeltaTable, window: usize) -> Result<SmoothedTable> {
        if window == 0 {
            return Err(PipelineError::config("smoothing window must be positive"));
        }
        if window > deltas.height() {
            return Err(PipelineError::config(format!(
                "smoothing window {window} exceeds the {} available rows",
                deltas.height()
            )));
        }

        let smoothed = deltas
            .columns()?
            .into_par_iter()
            .map(|(region, values)| {
                let dense = dense_values(&region, &values, "daily deltas")?;
                let means = Self::rolling_mean(&dense, window);
                Ok((region, means))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(window, valid_from = window - 1, "smoothed daily deltas");
        let table = DatedFrame::from_columns(deltas.dates().to_vec(), smoothed)?;
        Ok(SmoothedTable::new(table, window))
    }

    /// Mean of rows `[i + 1 - window, i]` for each `i`; `None` while the
    /// window is still incomplete.
    pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
        (0..values.len())
            .map(|i| {
                if window == 0 || i + 1 < window {
                    None
                } else {
                    Some(values[i + 1 - window..=i].iter().mean())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn deltas(values: Vec<f64>) -> DeltaTable {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let table = DatedFrame::from_columns(
            dates,
            vec![("AG".to_string(), values.into_iter().map(Some).collect())],
        )
        .unwrap();
        DeltaTable::new(table)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn trailing_mean_with_absent_prefix() {
        let out = Smoother::rolling_mean(&[0.0, 2.0, 3.0, 0.0, 4.0], 3);

        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!(close(out[2].unwrap(), 5.0 / 3.0));
        assert!(close(out[3].unwrap(), 5.0 / 3.0));
        assert!(close(out[4].unwrap(), 7.0 / 3.0));
    }

    #[test]
    fn exactly_window_minus_one_leading_nulls() {
        let input = deltas(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        for window in 1..=6 {
            let smoothed = Smoother::smooth(&input, window).unwrap();
            let values = smoothed.values("AG").unwrap();

            assert_eq!(smoothed.valid_from(), window - 1);
            assert_eq!(smoothed.null_count("AG").unwrap(), window - 1);
            assert!(values[..window - 1].iter().all(Option::is_none));
            assert!(values[window - 1..].iter().all(Option::is_some));
        }
    }

    #[test]
    fn window_of_one_is_identity() {
        let input = deltas(vec![0.0, 2.0, 3.0, 0.0, 4.0]);
        let smoothed = Smoother::smooth(&input, 1).unwrap();

        assert_eq!(smoothed.columns().unwrap(), input.columns().unwrap());
        assert_eq!(smoothed.dates(), input.dates());
    }

    #[test]
    fn gap_in_deltas_is_a_data_format_error() {
        let dates = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2020, 3, d).unwrap())
            .collect();
        let table = DatedFrame::from_columns(
            dates,
            vec![("AG".to_string(), vec![Some(0.0), None, Some(3.0)])],
        )
        .unwrap();

        let err = Smoother::smooth(&DeltaTable::new(table), 2).unwrap_err();
        assert!(matches!(err, PipelineError::DataFormat(_)));
    }

    #[test]
    fn zero_window_is_a_config_error() {
        let err = Smoother::smooth(&deltas(vec![1.0, 2.0]), 0).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn window_longer_than_table_is_a_config_error() {
        let err = Smoother::smooth(&deltas(vec![1.0, 2.0]), 3).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
