use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::schema;
use crate::stats::SampleMoments;

/// Aggregated metadata for the plays of one corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub corpus_name: String,
    pub corpus_acronym: Option<String>,
    pub corpus_title: Option<String>,
    #[serde(rename = "noOfPlays")]
    pub num_plays: usize,
    #[serde(rename = "differentAuthors")]
    pub distinct_authors: usize,
    #[serde(rename = "yearMin")]
    pub year_min: Option<i64>,
    #[serde(rename = "yearMax")]
    pub year_max: Option<i64>,
    #[serde(rename = "yearMean")]
    pub year_mean: Option<f64>,
    #[serde(rename = "yearSD")]
    pub year_std: Option<f64>,
    #[serde(rename = "noOfSpeakersMean")]
    pub speakers_mean: Option<f64>,
    #[serde(rename = "noOfSegmentsMean")]
    pub segments_mean: Option<f64>,
    #[serde(rename = "S_mean")]
    pub s_mean: Option<f64>,
    pub swn_abs: usize,
    pub swn_rel: f64,
    pub swt_abs: usize,
    pub swt_rel: f64,
    pub sft_abs: usize,
    pub sft_rel: f64,
}

/// `count / total * 100`; an empty group has no defined share.
pub fn relative_share(count: usize, total: usize, corpus: &str) -> Result<f64> {
    if total == 0 {
        return Err(PipelineError::EmptyGroup {
            corpus: corpus.to_string(),
        });
    }
    Ok(count as f64 / total as f64 * 100.0)
}

struct SummaryColumns {
    acronym: StringChunked,
    title: StringChunked,
    author: StringChunked,
    year: Int64Chunked,
    speakers: Float64Chunked,
    segments: Float64Chunked,
    s: Float64Chunked,
    swn: Int64Chunked,
    swt: Int64Chunked,
    sft: Int64Chunked,
}

impl SummaryColumns {
    fn from_frame(df: &DataFrame) -> Result<Self> {
        Ok(Self {
            acronym: schema::str_column(df, schema::CORPUS_ACRONYM)?,
            title: schema::str_column(df, schema::CORPUS_TITLE)?,
            author: schema::str_column(df, schema::FIRST_AUTHOR)?,
            year: schema::i64_column(df, schema::YEAR_NORMALIZED)?,
            speakers: schema::f64_column(df, schema::NUM_OF_SPEAKERS)?,
            segments: schema::f64_column(df, schema::NUM_OF_SEGMENTS)?,
            s: schema::f64_column(df, schema::S)?,
            swn: schema::i64_column(df, schema::SWN)?,
            swt: schema::i64_column(df, schema::SWT)?,
            sft: schema::i64_column(df, schema::SFT)?,
        })
    }

    fn flagged(column: &Int64Chunked, rows: &[usize]) -> usize {
        rows.iter()
            .filter(|&&idx| column.get(idx) == Some(1))
            .count()
    }

    fn moments(column: &Float64Chunked, rows: &[usize]) -> SampleMoments {
        SampleMoments::from_values(rows.iter().map(|&idx| column.get(idx)))
    }

    fn summarize(&self, corpus: &str, rows: &[usize]) -> Result<CorpusSummary> {
        let total = rows.len();
        let first = rows.first().copied();

        let authors: HashSet<&str> = rows.iter().filter_map(|&idx| self.author.get(idx)).collect();
        let years: Vec<i64> = rows.iter().filter_map(|&idx| self.year.get(idx)).collect();
        let year_moments = SampleMoments::from_values(years.iter().map(|&year| Some(year as f64)));

        let swn_abs = Self::flagged(&self.swn, rows);
        let swt_abs = Self::flagged(&self.swt, rows);
        let sft_abs = Self::flagged(&self.sft, rows);

        Ok(CorpusSummary {
            corpus_name: corpus.to_string(),
            corpus_acronym: first.and_then(|idx| self.acronym.get(idx)).map(str::to_string),
            corpus_title: first.and_then(|idx| self.title.get(idx)).map(str::to_string),
            num_plays: total,
            distinct_authors: authors.len(),
            year_min: years.iter().min().copied(),
            year_max: years.iter().max().copied(),
            year_mean: year_moments.mean_opt(),
            year_std: year_moments.std_opt(),
            speakers_mean: Self::moments(&self.speakers, rows).mean_opt(),
            segments_mean: Self::moments(&self.segments, rows).mean_opt(),
            s_mean: Self::moments(&self.s, rows).mean_opt(),
            swn_abs,
            swn_rel: relative_share(swn_abs, total, corpus)?,
            swt_abs,
            swt_rel: relative_share(swt_abs, total, corpus)?,
            sft_abs,
            sft_rel: relative_share(sft_abs, total, corpus)?,
        })
    }
}

/// One summary per corpus present in `df`, ordered by corpus name. The table
/// must already carry `swt` and `sft`.
pub fn summarize_by_corpus(df: &DataFrame) -> Result<Vec<CorpusSummary>> {
    let corpus = schema::str_column(df, schema::CORPUS_NAME)?;
    let columns = SummaryColumns::from_frame(df)?;

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, name) in (&corpus).into_iter().enumerate() {
        if let Some(name) = name {
            groups.entry(name).or_default().push(idx);
        }
    }

    groups
        .iter()
        .map(|(name, rows)| columns.summarize(name, rows))
        .collect()
}
