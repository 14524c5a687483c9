use std::collections::BTreeSet;

use polars::prelude::*;

use crate::error::Result;
use crate::schema;

/// Distinct corpus names in ascending order.
pub fn corpus_names(df: &DataFrame) -> Result<Vec<String>> {
    let corpus = schema::str_column(df, schema::CORPUS_NAME)?;
    let names: BTreeSet<&str> = (&corpus).into_iter().flatten().collect();
    Ok(names.into_iter().map(str::to_string).collect())
}

/// All rows belonging to one corpus.
pub fn subcorpus(df: &DataFrame, corpus_name: &str) -> Result<DataFrame> {
    let corpus = schema::str_column(df, schema::CORPUS_NAME)?;
    let mask: Vec<bool> = (&corpus)
        .into_iter()
        .map(|name| name == Some(corpus_name))
        .collect();
    let mask = Series::new("mask".into(), mask);
    Ok(df.filter(mask.bool()?)?)
}

/// Sorted play names, optionally restricted to one corpus.
pub fn play_names(df: &DataFrame, corpus_name: Option<&str>) -> Result<Vec<String>> {
    let corpus = schema::str_column(df, schema::CORPUS_NAME)?;
    let names = schema::str_column(df, schema::NAME)?;

    let mut plays: Vec<String> = (&names)
        .into_iter()
        .zip(&corpus)
        .filter(|(_, corpus)| corpus_name.is_none() || *corpus == corpus_name)
        .filter_map(|(name, _)| name.map(str::to_string))
        .collect();
    plays.sort();
    Ok(plays)
}
