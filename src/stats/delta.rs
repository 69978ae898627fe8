//! Delta Computation Module
//! Converts cumulative counts into day-over-day new cases.

use crate::data::{dense_values, CleanedTable, DatedFrame, DeltaTable};
use crate::error::Result;
use rayon::prelude::*;
use tracing::{info, warn};

/// Computes first differences per region.
pub struct DeltaComputer;

impl DeltaComputer {
    pub fn compute(cleaned: &CleanedTable) -> Result<DeltaTable> {
        let columns = cleaned.columns()?;

        // Independent per region; collect keeps column order.
        let deltas = columns
            .par_iter()
            .map(|(region, values)| {
                let dense = dense_values(region, values, "cleaned table")?;

                let diffs = Self::first_difference(&dense);
                let corrections = diffs.iter().filter(|d| **d < 0.0).count();
                if corrections > 0 {
                    warn!(region = %region, corrections, "cumulative series decreases");
                }
                Ok((region.clone(), diffs.into_iter().map(Some).collect()))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(regions = deltas.len(), "computed daily deltas");
        let table = DatedFrame::from_columns(cleaned.dates().to_vec(), deltas)?;
        Ok(DeltaTable::new(table))
    }

    /// `out[0] = 0`, `out[i] = values[i] - values[i - 1]`.
    pub fn first_difference(values: &[f64]) -> Vec<f64> {
        if values.is_empty() {
            return Vec::new();
        }
        std::iter::once(0.0)
            .chain(values.windows(2).map(|pair| pair[1] - pair[0]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cleaned(values: Vec<f64>) -> CleanedTable {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let table = DatedFrame::from_columns(
            dates,
            vec![("AG".to_string(), values.into_iter().map(Some).collect())],
        )
        .unwrap();
        CleanedTable::new(table)
    }

    #[test]
    fn first_row_is_zero() {
        assert_eq!(
            DeltaComputer::first_difference(&[0.0, 2.0, 5.0, 5.0, 9.0]),
            vec![0.0, 2.0, 3.0, 0.0, 4.0]
        );
        assert_eq!(DeltaComputer::first_difference(&[12.0]), vec![0.0]);
        assert!(DeltaComputer::first_difference(&[]).is_empty());
    }

    #[test]
    fn prefix_sums_reproduce_cumulative_values() {
        let cumulative = vec![0.0, 3.0, 3.0, 10.0, 18.0, 18.0, 25.0];
        let deltas = DeltaComputer::compute(&cleaned(cumulative.clone())).unwrap();
        let deltas: Vec<f64> = deltas
            .values("AG")
            .unwrap()
            .into_iter()
            .map(Option::unwrap)
            .collect();

        let mut running = 0.0;
        for (i, d) in deltas.iter().enumerate() {
            running += d;
            assert_eq!(running, cumulative[i] - cumulative[0]);
        }
    }

    #[test]
    fn keeps_dates_and_has_no_gaps() {
        let input = cleaned(vec![0.0, 1.0, 4.0]);
        let deltas = DeltaComputer::compute(&input).unwrap();

        assert_eq!(deltas.dates(), input.dates());
        assert_eq!(deltas.null_count("AG").unwrap(), 0);
    }
}
