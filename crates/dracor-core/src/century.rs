use std::collections::BTreeMap;

use polars::prelude::*;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::schema;

pub fn round_down_to_century(year: i64) -> i64 {
    year.div_euclid(100) * 100
}

/// Adds the nullable `century` column derived from `yearNormalized`.
pub fn with_century(df: &DataFrame) -> Result<DataFrame> {
    let years = schema::i64_column(df, schema::YEAR_NORMALIZED)?;
    let centuries: Vec<Option<i64>> = (&years)
        .into_iter()
        .map(|year| year.map(round_down_to_century))
        .collect();

    let mut output = df.clone();
    output.with_column(Series::new(schema::CENTURY.into(), centuries))?;
    Ok(output)
}

/// Row count and per-metric sums for one century.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CenturyCounts {
    pub century: i64,
    pub all: i64,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, i64>,
}

impl CenturyCounts {
    fn new(century: i64, metrics: &[&str]) -> Self {
        Self {
            century,
            all: 0,
            metrics: metrics.iter().map(|name| ((*name).to_string(), 0)).collect(),
        }
    }

    pub fn get(&self, metric: &str) -> Option<i64> {
        self.metrics.get(metric).copied()
    }
}

/// Buckets plays by century and sums the classification flags in each.
/// Plays without a year belong to no century and are left out.
pub fn summarize_by_century(df: &DataFrame, metrics: &[&str]) -> Result<Vec<CenturyCounts>> {
    let mut wanted: Vec<&str> = Vec::with_capacity(metrics.len());
    for metric in metrics {
        if !wanted.contains(metric) {
            wanted.push(*metric);
        }
    }

    let years = schema::i64_column(df, schema::YEAR_NORMALIZED)?;
    let mut columns = Vec::with_capacity(wanted.len());
    for metric in &wanted {
        // Only integer flag/count columns can be summed per century.
        let is_countable = df
            .column(metric)
            .is_ok_and(|column| column.dtype().is_integer());
        if !is_countable {
            return Err(PipelineError::UnknownMetric((*metric).to_string()));
        }
        columns.push(schema::i64_column(df, metric)?);
    }

    let mut buckets: BTreeMap<i64, CenturyCounts> = BTreeMap::new();
    for (idx, year) in (&years).into_iter().enumerate() {
        let Some(year) = year else {
            continue;
        };

        let century = round_down_to_century(year);
        let bucket = buckets
            .entry(century)
            .or_insert_with(|| CenturyCounts::new(century, &wanted));
        bucket.all += 1;

        for (metric, values) in wanted.iter().zip(&columns) {
            if let (Some(value), Some(total)) = (values.get(idx), bucket.metrics.get_mut(*metric)) {
                *total += value;
            }
        }
    }

    Ok(buckets.into_values().collect())
}
