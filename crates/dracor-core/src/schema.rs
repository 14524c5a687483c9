//! Column names of the per-play metrics table and typed accessors over it.

use polars::prelude::*;

use crate::error::{PipelineError, Result};

pub const NAME: &str = "name";
pub const CORPUS_NAME: &str = "corpus_name";
pub const CORPUS_ACRONYM: &str = "corpus_acronym";
pub const CORPUS_TITLE: &str = "corpus_title";
pub const FIRST_AUTHOR: &str = "firstAuthor";
pub const TITLE: &str = "title";
pub const NUM_OF_SEGMENTS: &str = "numOfSegments";
pub const NUM_OF_SPEAKERS: &str = "numOfSpeakers";
pub const YEAR_NORMALIZED: &str = "yearNormalized";
pub const CC_DEV: &str = "CC_dev";
pub const APL_DEV: &str = "APL_dev";
pub const S: &str = "S";
pub const POLYNOMIAL: &str = "polynomial";
pub const LINEAR: &str = "linear";
pub const QUADRATIC: &str = "quadratic";
pub const EXPONENTIAL: &str = "exponential";
pub const SWN: &str = "swn";

// Derived per query, never part of the source file.
pub const SWT: &str = "swt";
pub const SFT: &str = "sft";
pub const CENTURY: &str = "century";
pub const SWT_IN_CORPUS: &str = "swt in corpus";

pub const DEFAULT_CENTURY_METRICS: [&str; 3] = [SWN, SWT, SFT];

pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        if df.column(name).is_err() {
            return Err(PipelineError::MissingColumn((*name).to_string()));
        }
    }
    Ok(())
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))
}

/// Float view of a column; integer columns are widened.
pub fn f64_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let casted = column(df, name)?.cast(&DataType::Float64)?;
    Ok(casted.f64()?.clone())
}

/// Integer view of a column; float columns are truncated toward zero.
pub fn i64_column(df: &DataFrame, name: &str) -> Result<Int64Chunked> {
    let casted = column(df, name)?.cast(&DataType::Int64)?;
    Ok(casted.i64()?.clone())
}

pub fn str_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let casted = column(df, name)?.cast(&DataType::String)?;
    Ok(casted.str()?.clone())
}
