//! Chart Bundle Module
//! Reshapes the smoothed table into date-aligned per-region series.

use crate::data::SmoothedTable;
use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::info;

/// Key under which the shared date axis is stored.
pub const DATE_KEY: &str = "date";

/// Shared date axis plus one equally long value series per region.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBundle {
    dates: Vec<NaiveDate>,
    series: IndexMap<String, Vec<f64>>,
}

impl ChartBundle {
    /// Build a bundle, checking that every series matches the date axis.
    pub fn new(dates: Vec<NaiveDate>, series: IndexMap<String, Vec<f64>>) -> Result<Self> {
        if let Some((region, values)) = series.iter().find(|(_, v)| v.len() != dates.len()) {
            return Err(PipelineError::Alignment {
                region: region.clone(),
                expected: dates.len(),
                actual: values.len(),
            });
        }
        Ok(Self { dates, series })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Region names in table order.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn series(&self, region: &str) -> Option<&[f64]> {
        self.series.get(region).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series
            .iter()
            .map(|(region, values)| (region.as_str(), values.as_slice()))
    }

    /// Number of points on the date axis.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Largest value across all regions, `0.0` for an empty bundle.
    pub fn max_value(&self) -> f64 {
        self.series
            .values()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }

    /// Smallest value across all regions, never above `0.0`.
    pub fn min_value(&self) -> f64 {
        self.series
            .values()
            .flatten()
            .copied()
            .fold(0.0, f64::min)
    }

    /// `{"date": [...], "<region>": [...], ...}`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for ChartBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        map.serialize_entry(DATE_KEY, &self.dates)?;
        for (region, values) in &self.series {
            map.serialize_entry(region, values)?;
        }
        map.end()
    }
}

/// Drops the incomplete-window rows and assembles a [`ChartBundle`].
pub struct Reshaper;

impl Reshaper {
    pub fn reshape(smoothed: &SmoothedTable) -> Result<ChartBundle> {
        let start = smoothed.valid_from().min(smoothed.height());
        let dates = smoothed.dates()[start..].to_vec();

        let mut series = IndexMap::new();
        for (region, values) in smoothed.columns()? {
            if region == DATE_KEY {
                return Err(PipelineError::data_format(format!(
                    "region name '{DATE_KEY}' collides with the date axis"
                )));
            }

            let tail: Vec<f64> = values.iter().skip(start).flatten().copied().collect();
            if tail.len() != dates.len() {
                return Err(PipelineError::Alignment {
                    region,
                    expected: dates.len(),
                    actual: tail.len(),
                });
            }
            series.insert(region, tail);
        }

        info!(points = dates.len(), regions = series.len(), "built chart bundle");
        ChartBundle::new(dates, series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DatedFrame, SmoothedTable};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
    }

    fn smoothed(columns: Vec<(&str, Vec<Option<f64>>)>, window: usize) -> SmoothedTable {
        let height = columns[0].1.len();
        let dates = (1..=height as u32).map(day).collect();
        let columns = columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), values))
            .collect();
        SmoothedTable::new(DatedFrame::from_columns(dates, columns).unwrap(), window)
    }

    #[test]
    fn truncates_dates_and_values_together() {
        let table = smoothed(
            vec![
                ("AG", vec![None, None, Some(1.5), Some(2.0), Some(2.5)]),
                ("ZH", vec![None, None, Some(0.0), Some(1.0), Some(0.5)]),
            ],
            3,
        );

        let bundle = Reshaper::reshape(&table).unwrap();

        assert_eq!(bundle.dates(), &[day(3), day(4), day(5)]);
        assert_eq!(bundle.series("AG").unwrap(), &[1.5, 2.0, 2.5]);
        assert_eq!(bundle.series("ZH").unwrap(), &[0.0, 1.0, 0.5]);
        assert_eq!(bundle.regions().collect::<Vec<_>>(), vec!["AG", "ZH"]);
        for (_, values) in bundle.iter() {
            assert_eq!(values.len(), bundle.len());
        }
    }

    #[test]
    fn absent_value_in_valid_range_is_an_alignment_error() {
        let table = smoothed(vec![("AG", vec![None, Some(1.0), None])], 2);

        let err = Reshaper::reshape(&table).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Alignment {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn new_rejects_mismatched_lengths() {
        let mut series = IndexMap::new();
        series.insert("AG".to_string(), vec![1.0]);

        let err = ChartBundle::new(vec![day(1), day(2)], series).unwrap_err();
        assert!(matches!(err, PipelineError::Alignment { .. }));
    }

    #[test]
    fn serializes_date_first_then_regions_in_order() {
        let mut series = IndexMap::new();
        series.insert("ZH".to_string(), vec![1.0, 2.5]);
        series.insert("AG".to_string(), vec![0.0, 3.0]);
        let bundle = ChartBundle::new(vec![day(1), day(2)], series).unwrap();

        assert_eq!(
            bundle.to_json().unwrap(),
            r#"{"date":["2020-03-01","2020-03-02"],"ZH":[1.0,2.5],"AG":[0.0,3.0]}"#
        );
        assert_eq!(bundle.max_value(), 3.0);
        assert_eq!(bundle.min_value(), 0.0);
    }

    #[test]
    fn region_named_date_is_rejected() {
        let table = smoothed(vec![("date", vec![Some(1.0)])], 1);
        let err = Reshaper::reshape(&table).unwrap_err();
        assert!(matches!(err, PipelineError::DataFormat(_)));
    }
}
