use std::fs::File;
use std::io::Read;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::error::Result;
use crate::schema;

/// One row of the precomputed network-metrics file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub name: String,
    pub corpus_name: String,
    pub corpus_acronym: String,
    pub corpus_title: String,
    #[serde(rename = "firstAuthor", default)]
    pub first_author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "numOfSegments", deserialize_with = "integral")]
    pub num_of_segments: i64,
    #[serde(rename = "numOfSpeakers", deserialize_with = "integral")]
    pub num_of_speakers: i64,
    #[serde(rename = "yearNormalized", deserialize_with = "nullable_integral", default)]
    pub year_normalized: Option<i64>,
    #[serde(rename = "CC_dev", deserialize_with = "nullable_float")]
    pub cc_dev: Option<f64>,
    #[serde(rename = "APL_dev", deserialize_with = "nullable_float")]
    pub apl_dev: Option<f64>,
    #[serde(rename = "S", deserialize_with = "nullable_float")]
    pub s: Option<f64>,
    #[serde(deserialize_with = "nullable_float")]
    pub polynomial: Option<f64>,
    #[serde(deserialize_with = "nullable_float")]
    pub linear: Option<f64>,
    #[serde(deserialize_with = "nullable_float")]
    pub quadratic: Option<f64>,
    #[serde(deserialize_with = "nullable_float")]
    pub exponential: Option<f64>,
    #[serde(deserialize_with = "integral")]
    pub swn: i64,
}

/// Parses integer cells that may have been written as floats (`1743.0`).
/// Blank and `NA`-style cells are null.
pub fn parse_nullable_int(raw: &str) -> std::result::Result<Option<i64>, String> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return Ok(None);
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(Some(value));
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(Some(value as i64)),
        _ => Err(format!("'{trimmed}' is not an integer")),
    }
}

/// Float cells; blank and `NA`-style cells are null, anything else unparseable
/// is an error.
pub fn parse_nullable_float(raw: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(format!("'{trimmed}' is not a number")),
    }
}

fn is_missing(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("<na>")
}

fn nullable_float<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(raw) => parse_nullable_float(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn nullable_integral<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(raw) => parse_nullable_int(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn integral<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_nullable_int(&raw)
        .map_err(serde::de::Error::custom)?
        .ok_or_else(|| serde::de::Error::custom("missing integer value"))
}

pub fn load_metrics_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = read_metrics_csv(file)?;
    info!(path = %path.display(), rows = df.height(), "loaded play metrics");
    Ok(df)
}

pub fn read_metrics_csv<R: Read>(reader: R) -> Result<DataFrame> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<PlayRecord>() {
        records.push(row?);
    }

    records_to_frame(&records)
}

pub fn records_to_frame(records: &[PlayRecord]) -> Result<DataFrame> {
    fn strings<'a>(
        records: &'a [PlayRecord],
        get: impl Fn(&'a PlayRecord) -> Option<&'a str>,
    ) -> Vec<Option<&'a str>> {
        records.iter().map(get).collect()
    }

    fn floats(records: &[PlayRecord], get: impl Fn(&PlayRecord) -> Option<f64>) -> Vec<Option<f64>> {
        records.iter().map(get).collect()
    }

    let columns: Vec<Column> = vec![
        Series::new(
            schema::NAME.into(),
            strings(records, |r| Some(r.name.as_str())),
        )
        .into(),
        Series::new(
            schema::CORPUS_NAME.into(),
            strings(records, |r| Some(r.corpus_name.as_str())),
        )
        .into(),
        Series::new(
            schema::CORPUS_ACRONYM.into(),
            strings(records, |r| Some(r.corpus_acronym.as_str())),
        )
        .into(),
        Series::new(
            schema::CORPUS_TITLE.into(),
            strings(records, |r| Some(r.corpus_title.as_str())),
        )
        .into(),
        Series::new(
            schema::FIRST_AUTHOR.into(),
            strings(records, |r| r.first_author.as_deref()),
        )
        .into(),
        Series::new(schema::TITLE.into(), strings(records, |r| r.title.as_deref())).into(),
        Series::new(
            schema::NUM_OF_SEGMENTS.into(),
            records.iter().map(|r| r.num_of_segments).collect::<Vec<i64>>(),
        )
        .into(),
        Series::new(
            schema::NUM_OF_SPEAKERS.into(),
            records.iter().map(|r| r.num_of_speakers).collect::<Vec<i64>>(),
        )
        .into(),
        Series::new(
            schema::YEAR_NORMALIZED.into(),
            records
                .iter()
                .map(|r| r.year_normalized)
                .collect::<Vec<Option<i64>>>(),
        )
        .into(),
        Series::new(schema::CC_DEV.into(), floats(records, |r| r.cc_dev)).into(),
        Series::new(schema::APL_DEV.into(), floats(records, |r| r.apl_dev)).into(),
        Series::new(schema::S.into(), floats(records, |r| r.s)).into(),
        Series::new(schema::POLYNOMIAL.into(), floats(records, |r| r.polynomial)).into(),
        Series::new(schema::LINEAR.into(), floats(records, |r| r.linear)).into(),
        Series::new(schema::QUADRATIC.into(), floats(records, |r| r.quadratic)).into(),
        Series::new(schema::EXPONENTIAL.into(), floats(records, |r| r.exponential)).into(),
        Series::new(
            schema::SWN.into(),
            records.iter().map(|r| r.swn).collect::<Vec<i64>>(),
        )
        .into(),
    ];

    Ok(DataFrame::new(columns)?)
}
