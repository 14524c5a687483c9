use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::century::with_century;
use crate::classifier::classify;
use crate::error::{PipelineError, Result};
use crate::lookup::corpus_names;
use crate::schema;

/// Closed integer interval `[start, end]`; empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusiveRange {
    pub start: i64,
    pub end: i64,
}

impl InclusiveRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.start <= value && value <= self.end
    }
}

impl fmt::Display for InclusiveRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl FromStr for InclusiveRange {
    type Err = PipelineError;

    /// Accepts `A..B`, `A..=B` and `A-B`.
    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let (start, end) = trimmed
            .split_once("..=")
            .or_else(|| trimmed.split_once(".."))
            .or_else(|| {
                // Skip a leading sign so `-5-10` is not split at index 0.
                let offset = usize::from(trimmed.starts_with('-'));
                trimmed[offset..]
                    .find('-')
                    .map(|idx| (&trimmed[..offset + idx], &trimmed[offset + idx + 1..]))
            })
            .ok_or_else(|| PipelineError::InvalidRange(trimmed.to_string()))?;

        let parse = |raw: &str| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| PipelineError::InvalidRange(trimmed.to_string()))
        };

        Ok(Self::new(parse(start)?, parse(end)?))
    }
}

/// Selection applied before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayFilter {
    pub corpora: BTreeSet<String>,
    pub segments: InclusiveRange,
    pub years: InclusiveRange,
}

impl PlayFilter {
    pub fn new<I, S>(corpora: I, segments: InclusiveRange, years: InclusiveRange) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            corpora: corpora.into_iter().map(Into::into).collect(),
            segments,
            years,
        }
    }

    pub fn matches(&self, corpus: Option<&str>, segments: Option<i64>, year: Option<i64>) -> bool {
        let corpus_ok = corpus.is_some_and(|name| self.corpora.contains(name));
        let segments_ok = segments.is_some_and(|value| self.segments.contains(value));
        let year_ok = year.is_some_and(|value| self.years.contains(value));
        corpus_ok && segments_ok && year_ok
    }
}

/// Widest filter a table supports: every corpus, segments from 1 to the
/// maximum, years from the earliest to the latest known year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterBounds {
    pub corpora: Vec<String>,
    pub segments: InclusiveRange,
    pub years: Option<InclusiveRange>,
}

impl FilterBounds {
    pub fn from_table(df: &DataFrame) -> Result<Self> {
        let segments = schema::i64_column(df, schema::NUM_OF_SEGMENTS)?;
        let years = schema::i64_column(df, schema::YEAR_NORMALIZED)?;

        let max_segments = segments.max().unwrap_or(1).max(1);
        let years = match (years.min(), years.max()) {
            (Some(min), Some(max)) => Some(InclusiveRange::new(min, max)),
            _ => None,
        };

        Ok(Self {
            corpora: corpus_names(df)?,
            segments: InclusiveRange::new(1, max_segments),
            years,
        })
    }

    /// `None` when no row has a known year, since any year filter would be empty.
    pub fn to_filter(&self) -> Option<PlayFilter> {
        self.years
            .map(|years| PlayFilter::new(self.corpora.iter().cloned(), self.segments, years))
    }
}

/// Rows matching the filter, without classification.
pub fn filter_rows(df: &DataFrame, filter: &PlayFilter) -> Result<DataFrame> {
    let corpus = schema::str_column(df, schema::CORPUS_NAME)?;
    let segments = schema::i64_column(df, schema::NUM_OF_SEGMENTS)?;
    let years = schema::i64_column(df, schema::YEAR_NORMALIZED)?;

    let mask: Vec<bool> = (0..df.height())
        .map(|idx| filter.matches(corpus.get(idx), segments.get(idx), years.get(idx)))
        .collect();
    let mask = Series::new("mask".into(), mask);

    Ok(df.filter(mask.bool()?)?)
}

/// Filters, then classifies against the filtered rows' own statistics and
/// attaches the `century` column.
pub fn classify_and_filter(df: &DataFrame, filter: &PlayFilter) -> Result<DataFrame> {
    let selected = filter_rows(df, filter)?;
    debug!(
        input_rows = df.height(),
        selected_rows = selected.height(),
        corpora = filter.corpora.len(),
        segments = %filter.segments,
        years = %filter.years,
        "filtered play table"
    );

    let classified = classify(&selected)?;
    with_century(&classified)
}
