// crates/dracor/src/render.rs

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use dracor_core::century::CenturyCounts;
use dracor_core::corpus_summary::CorpusSummary;
use dracor_core::export::frame_to_json;
use polars::prelude::{AnyValue, DataFrame};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Tabular output in every supported format. The JSON form is only built
/// when it is emitted.
pub struct Rendered<'a> {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    json: Box<dyn FnOnce() -> Result<Value> + 'a>,
}

impl Rendered<'_> {
    pub fn emit(self, format: OutputFormat) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match format {
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(self.headers.clone());
                for row in &self.rows {
                    table.add_row(row.clone());
                }
                writeln!(out, "{table}")?;
            }
            OutputFormat::Json => {
                let json = (self.json)()?;
                serde_json::to_writer_pretty(&mut out, &json)?;
                writeln!(out)?;
            }
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(out);
                writer.write_record(&self.headers)?;
                for row in &self.rows {
                    writer.write_record(row)?;
                }
                writer.flush()?;
            }
        }
        Ok(())
    }
}

fn cell_text(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(text) => text.to_string(),
        AnyValue::StringOwned(text) => text.to_string(),
        other => other.to_string(),
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn decimal(value: Option<f64>) -> String {
    value.map(|value| format!("{value:.2}")).unwrap_or_default()
}

pub fn frame(df: &DataFrame) -> Result<Rendered<'_>> {
    let headers: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut row = Vec::with_capacity(headers.len());
        for column in df.get_columns() {
            row.push(cell_text(column.get(idx)?));
        }
        rows.push(row);
    }

    Ok(Rendered {
        headers,
        rows,
        json: Box::new(move || Ok(frame_to_json(df)?)),
    })
}

pub fn corpus_summaries(summaries: &[CorpusSummary]) -> Result<Rendered<'_>> {
    let headers = [
        "corpus_name",
        "corpus_acronym",
        "corpus_title",
        "noOfPlays",
        "differentAuthors",
        "yearMin",
        "yearMax",
        "yearMean",
        "yearSD",
        "noOfSpeakersMean",
        "noOfSegmentsMean",
        "S_mean",
        "swn_abs",
        "swn_rel",
        "swt_abs",
        "swt_rel",
        "sft_abs",
        "sft_rel",
    ];

    let rows = summaries
        .iter()
        .map(|summary| {
            vec![
                summary.corpus_name.clone(),
                optional(summary.corpus_acronym.as_deref()),
                optional(summary.corpus_title.as_deref()),
                summary.num_plays.to_string(),
                summary.distinct_authors.to_string(),
                optional(summary.year_min),
                optional(summary.year_max),
                decimal(summary.year_mean),
                decimal(summary.year_std),
                decimal(summary.speakers_mean),
                decimal(summary.segments_mean),
                decimal(summary.s_mean),
                summary.swn_abs.to_string(),
                decimal(Some(summary.swn_rel)),
                summary.swt_abs.to_string(),
                decimal(Some(summary.swt_rel)),
                summary.sft_abs.to_string(),
                decimal(Some(summary.sft_rel)),
            ]
        })
        .collect();

    Ok(Rendered {
        headers: headers.iter().map(|header| header.to_string()).collect(),
        rows,
        json: Box::new(move || Ok(serde_json::to_value(summaries)?)),
    })
}

pub fn centuries<'a>(buckets: &'a [CenturyCounts], metrics: &[&str]) -> Result<Rendered<'a>> {
    let mut headers = vec!["century".to_string(), "all".to_string()];
    headers.extend(metrics.iter().map(|metric| metric.to_string()));

    let rows = buckets
        .iter()
        .map(|bucket| {
            let mut row = vec![bucket.century.to_string(), bucket.all.to_string()];
            row.extend(metrics.iter().map(|metric| optional(bucket.get(metric))));
            row
        })
        .collect();

    Ok(Rendered {
        headers,
        rows,
        json: Box::new(move || Ok(serde_json::to_value(buckets)?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_with_failing_json() -> Rendered<'static> {
        Rendered {
            headers: vec!["century".to_string()],
            rows: vec![vec!["1700".to_string()]],
            json: Box::new(|| -> Result<Value> { anyhow::bail!("json requested") }),
        }
    }

    #[test]
    fn json_is_only_built_for_json_output() {
        assert!(rendered_with_failing_json().emit(OutputFormat::Table).is_ok());
        assert!(rendered_with_failing_json().emit(OutputFormat::Csv).is_ok());
        assert!(rendered_with_failing_json().emit(OutputFormat::Json).is_err());
    }
}
