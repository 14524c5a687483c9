use std::path::Path;

use polars::prelude::*;

use crate::century::{summarize_by_century, CenturyCounts};
use crate::config::DEFAULT_MAX_NETWORK_PLAYS;
use crate::corpus_summary::{summarize_by_corpus, CorpusSummary};
use crate::error::Result;
use crate::filter::{classify_and_filter, FilterBounds, PlayFilter};
use crate::highlight::{scatter_points, ScatterPoint};
use crate::loader::load_metrics_csv;
use crate::lookup;
use crate::network::{fetch_networks, resolve_play, NetworkError, NetworkSource, PlayLocator, PlayNetwork};
use crate::schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub max_network_plays: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_network_plays: DEFAULT_MAX_NETWORK_PLAYS,
        }
    }
}

/// Session-scoped view over one loaded metrics table.
///
/// Every query derives fresh output from the immutable table; in particular
/// the small-world thresholds are recomputed over each filtered selection, so
/// the same play can be classified differently under different filters.
#[derive(Debug, Clone)]
pub struct CorpusMetricsPipeline {
    table: DataFrame,
    config: PipelineConfig,
}

impl CorpusMetricsPipeline {
    pub fn new(table: DataFrame, config: PipelineConfig) -> Result<Self> {
        schema::require_columns(
            &table,
            &[
                schema::NAME,
                schema::CORPUS_NAME,
                schema::CORPUS_ACRONYM,
                schema::CORPUS_TITLE,
                schema::FIRST_AUTHOR,
                schema::TITLE,
                schema::NUM_OF_SEGMENTS,
                schema::NUM_OF_SPEAKERS,
                schema::YEAR_NORMALIZED,
                schema::CC_DEV,
                schema::APL_DEV,
                schema::S,
                schema::POLYNOMIAL,
                schema::LINEAR,
                schema::QUADRATIC,
                schema::EXPONENTIAL,
                schema::SWN,
            ],
        )?;
        Ok(Self { table, config })
    }

    pub fn from_csv(path: &Path, config: PipelineConfig) -> Result<Self> {
        Self::new(load_metrics_csv(path)?, config)
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    pub fn corpus_names(&self) -> Result<Vec<String>> {
        lookup::corpus_names(&self.table)
    }

    pub fn play_names(&self, corpus_name: Option<&str>) -> Result<Vec<String>> {
        lookup::play_names(&self.table, corpus_name)
    }

    pub fn subcorpus(&self, corpus_name: &str) -> Result<DataFrame> {
        lookup::subcorpus(&self.table, corpus_name)
    }

    pub fn bounds(&self) -> Result<FilterBounds> {
        FilterBounds::from_table(&self.table)
    }

    pub fn classify_and_filter(&self, filter: &PlayFilter) -> Result<DataFrame> {
        classify_and_filter(&self.table, filter)
    }

    pub fn summarize_by_corpus(&self, filter: &PlayFilter) -> Result<Vec<CorpusSummary>> {
        summarize_by_corpus(&self.classify_and_filter(filter)?)
    }

    pub fn summarize_by_century(
        &self,
        filter: &PlayFilter,
        metrics: &[&str],
    ) -> Result<Vec<CenturyCounts>> {
        summarize_by_century(&self.classify_and_filter(filter)?, metrics)
    }

    pub fn scatter_points(&self, filter: &PlayFilter) -> Result<Vec<ScatterPoint>> {
        scatter_points(&self.classify_and_filter(filter)?)
    }

    pub fn resolve_play(&self, play_name: &str) -> std::result::Result<PlayLocator, NetworkError> {
        resolve_play(&self.table, play_name)
    }

    pub async fn fetch_networks<S, P>(
        &self,
        source: &S,
        play_names: &[P],
    ) -> std::result::Result<Vec<PlayNetwork>, NetworkError>
    where
        S: NetworkSource + ?Sized,
        P: AsRef<str> + Sync,
    {
        fetch_networks(&self.table, source, play_names, self.config.max_network_plays).await
    }
}
