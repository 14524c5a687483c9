use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::lookup::corpus_names;
use crate::schema;

pub const BACKGROUND_LABEL: &str = "all";

pub fn swt_label(acronym: &str) -> String {
    format!("swt in {acronym}")
}

/// Adds the `swt in corpus` grouping column: `swt` plays of a highlighted
/// corpus are labelled by its acronym, everything else is background.
pub fn highlight_swt_in(df: &DataFrame, highlighted: &BTreeSet<String>) -> Result<DataFrame> {
    let swt = schema::i64_column(df, schema::SWT)?;
    let corpus = schema::str_column(df, schema::CORPUS_NAME)?;
    let acronym = schema::str_column(df, schema::CORPUS_ACRONYM)?;

    let labels: Vec<String> = (0..df.height())
        .map(|idx| {
            let in_corpus = corpus
                .get(idx)
                .is_some_and(|name| highlighted.contains(name));
            match (swt.get(idx), in_corpus, acronym.get(idx)) {
                (Some(1), true, Some(acronym)) => swt_label(acronym),
                _ => BACKGROUND_LABEL.to_string(),
            }
        })
        .collect();

    let mut output = df.clone();
    output.with_column(Series::new(schema::SWT_IN_CORPUS.into(), labels))?;
    Ok(output)
}

/// Highlights every corpus present in the table.
pub fn highlight_swt(df: &DataFrame) -> Result<DataFrame> {
    let highlighted: BTreeSet<String> = corpus_names(df)?.into_iter().collect();
    highlight_swt_in(df, &highlighted)
}

/// One point of the small-world coefficient over publication year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    #[serde(rename = "yearNormalized")]
    pub year: i64,
    #[serde(rename = "S")]
    pub s: f64,
    pub label: String,
    #[serde(rename = "firstAuthor")]
    pub first_author: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub corpus_name: Option<String>,
}

/// Points for the S-over-time view; rows lacking a year or S are skipped.
pub fn scatter_points(df: &DataFrame) -> Result<Vec<ScatterPoint>> {
    let labelled = highlight_swt(df)?;
    let years = schema::i64_column(&labelled, schema::YEAR_NORMALIZED)?;
    let s = schema::f64_column(&labelled, schema::S)?;
    let labels = schema::str_column(&labelled, schema::SWT_IN_CORPUS)?;
    let authors = schema::str_column(&labelled, schema::FIRST_AUTHOR)?;
    let titles = schema::str_column(&labelled, schema::TITLE)?;
    let names = schema::str_column(&labelled, schema::NAME)?;
    let corpus = schema::str_column(&labelled, schema::CORPUS_NAME)?;

    let owned = |value: Option<&str>| value.map(str::to_string);

    let mut points = Vec::with_capacity(labelled.height());
    for idx in 0..labelled.height() {
        let (Some(year), Some(s_value)) = (years.get(idx), s.get(idx)) else {
            continue;
        };
        if s_value.is_nan() {
            continue;
        }
        points.push(ScatterPoint {
            year,
            s: s_value,
            label: labels.get(idx).unwrap_or(BACKGROUND_LABEL).to_string(),
            first_author: owned(authors.get(idx)),
            title: owned(titles.get(idx)),
            name: owned(names.get(idx)),
            corpus_name: owned(corpus.get(idx)),
        });
    }

    Ok(points)
}
