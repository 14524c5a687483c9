use std::path::PathBuf;

use dracor_core::century::summarize_by_century;
use dracor_core::corpus_summary::summarize_by_corpus;
use dracor_core::filter::{filter_rows, InclusiveRange, PlayFilter};
use dracor_core::highlight::{highlight_swt, scatter_points};
use dracor_core::{schema, CorpusMetricsPipeline, PipelineConfig, PipelineError};
use polars::prelude::*;

fn fixture_pipeline() -> CorpusMetricsPipeline {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/metrics_sample.csv");
    CorpusMetricsPipeline::from_csv(&path, PipelineConfig::default()).expect("load fixture")
}

fn names(df: &DataFrame) -> Vec<String> {
    df.column(schema::NAME)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect()
}

#[test]
fn lookup_helpers_list_corpora_and_plays() -> anyhow::Result<()> {
    let pipeline = fixture_pipeline();

    assert_eq!(pipeline.corpus_names()?, vec!["ger", "rus"]);
    assert_eq!(
        pipeline.play_names(Some("rus"))?,
        vec!["gogol-revizor", "ostrovsky-groza"]
    );
    assert_eq!(pipeline.play_names(None)?.len(), 6);
    assert!(pipeline.play_names(Some("fre"))?.is_empty());

    let ger = pipeline.subcorpus("ger")?;
    assert_eq!(ger.height(), 4);
    Ok(())
}

#[test]
fn default_bounds_cover_the_table() -> anyhow::Result<()> {
    let bounds = fixture_pipeline().bounds()?;

    assert_eq!(bounds.corpora, vec!["ger", "rus"]);
    assert_eq!(bounds.segments, InclusiveRange::new(1, 52));
    assert_eq!(bounds.years, Some(InclusiveRange::new(1772, 1836)));
    Ok(())
}

#[test]
fn filter_selects_exactly_matching_rows() -> anyhow::Result<()> {
    let pipeline = fixture_pipeline();
    let filter = PlayFilter::new(
        ["ger"],
        InclusiveRange::new(1, 40),
        InclusiveRange::new(1700, 1800),
    );

    let selected = pipeline.classify_and_filter(&filter)?;
    assert_eq!(
        names(&selected),
        vec!["lessing-nathan-der-weise", "schiller-die-raeuber"]
    );
    assert!(selected.column(schema::SWT).is_ok());
    assert!(selected.column(schema::SFT).is_ok());

    let centuries = selected.column(schema::CENTURY)?.i64()?;
    assert!(centuries.into_iter().all(|century| century == Some(1700)));
    Ok(())
}

#[test]
fn filtering_is_idempotent() -> anyhow::Result<()> {
    let pipeline = fixture_pipeline();
    let filter = pipeline.bounds()?.to_filter().expect("years present");

    let once = pipeline.classify_and_filter(&filter)?;
    let twice = dracor_core::filter::classify_and_filter(&once, &filter)?;

    assert_eq!(once.height(), 4);
    assert!(once.equals_missing(&twice));
    Ok(())
}

#[test]
fn rows_without_year_never_pass_a_year_filter() -> anyhow::Result<()> {
    let pipeline = fixture_pipeline();
    let filter = PlayFilter::new(
        ["ger", "rus"],
        InclusiveRange::new(1, 100),
        InclusiveRange::new(i64::MIN, i64::MAX),
    );

    let selected = filter_rows(pipeline.table(), &filter)?;
    let selected_names = names(&selected);
    assert_eq!(selected.height(), 4);
    assert!(!selected_names.contains(&"goethe-faust-eine-tragoedie".to_string()));
    assert!(!selected_names.contains(&"ostrovsky-groza".to_string()));
    Ok(())
}

#[test]
fn corpus_summary_counts_and_shares() -> anyhow::Result<()> {
    let pipeline = fixture_pipeline();
    let filter = pipeline.bounds()?.to_filter().expect("years present");
    let summaries = pipeline.summarize_by_corpus(&filter)?;

    assert_eq!(summaries.len(), 2);
    let ger = &summaries[0];
    assert_eq!(ger.corpus_name, "ger");
    assert_eq!(ger.corpus_acronym.as_deref(), Some("GerDraCor"));
    assert_eq!(ger.num_plays, 3);
    assert_eq!(ger.distinct_authors, 2);
    assert_eq!(ger.year_min, Some(1772));
    assert_eq!(ger.year_max, Some(1781));
    assert!((ger.year_mean.unwrap() - 1777.333_333).abs() < 1e-3);
    assert!((ger.segments_mean.unwrap() - 35.666_666).abs() < 1e-3);
    assert_eq!(ger.swn_abs, 2);
    assert!((ger.swn_rel - 200.0 / 3.0).abs() < 1e-9);

    let rus = &summaries[1];
    assert_eq!(rus.num_plays, 1);
    assert_eq!(rus.year_std, None, "a single year has no sample deviation");
    assert_eq!(rus.swn_abs, 1);
    assert!((rus.swn_rel - 100.0).abs() < 1e-9);

    for summary in &summaries {
        for (abs, rel) in [
            (summary.swn_abs, summary.swn_rel),
            (summary.swt_abs, summary.swt_rel),
            (summary.sft_abs, summary.sft_rel),
        ] {
            let recovered = (rel / 100.0 * summary.num_plays as f64).round() as usize;
            assert_eq!(recovered, abs);
        }
    }
    Ok(())
}

#[test]
fn corpus_summary_requires_classified_table() {
    let pipeline = fixture_pipeline();
    let err = summarize_by_corpus(pipeline.table()).unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn(column) if column == schema::SWT));
}

#[test]
fn empty_selection_summarizes_to_nothing() -> anyhow::Result<()> {
    let pipeline = fixture_pipeline();
    let filter = PlayFilter::new(
        ["fre"],
        InclusiveRange::new(1, 100),
        InclusiveRange::new(1600, 1900),
    );

    assert!(pipeline.summarize_by_corpus(&filter)?.is_empty());
    assert!(pipeline
        .summarize_by_century(&filter, &schema::DEFAULT_CENTURY_METRICS)?
        .is_empty());
    Ok(())
}

#[test]
fn century_buckets_are_ordered_and_summed() -> anyhow::Result<()> {
    let pipeline = fixture_pipeline();
    let filter = pipeline.bounds()?.to_filter().expect("years present");
    let buckets = pipeline.summarize_by_century(&filter, &schema::DEFAULT_CENTURY_METRICS)?;

    let centuries: Vec<i64> = buckets.iter().map(|bucket| bucket.century).collect();
    assert_eq!(centuries, vec![1700, 1800]);

    assert_eq!(buckets[0].all, 3);
    assert_eq!(buckets[0].get(schema::SWN), Some(2));
    assert_eq!(buckets[1].all, 1);
    assert_eq!(buckets[1].get(schema::SWN), Some(1));
    assert_eq!(buckets[1].get(schema::SWT), Some(0));
    Ok(())
}

#[test]
fn century_summary_skips_unknown_years_and_rejects_unknown_metrics() -> anyhow::Result<()> {
    let pipeline = fixture_pipeline();
    let buckets = summarize_by_century(pipeline.table(), &[schema::SWN])?;

    let total: i64 = buckets.iter().map(|bucket| bucket.all).sum();
    assert_eq!(total, 4);
    assert_eq!(buckets[0].metrics.len(), 1);

    let err = summarize_by_century(pipeline.table(), &["nonsense"]).unwrap_err();
    assert!(matches!(err, PipelineError::UnknownMetric(metric) if metric == "nonsense"));
    Ok(())
}

#[test]
fn century_summary_rejects_non_integer_columns() {
    let pipeline = fixture_pipeline();

    for column in [schema::CORPUS_NAME, schema::CC_DEV] {
        let err = summarize_by_century(pipeline.table(), &[column]).unwrap_err();
        assert!(
            matches!(&err, PipelineError::UnknownMetric(metric) if metric == column),
            "unexpected error for {column}: {err}"
        );
    }
}

#[test]
fn filter_bounds_are_inclusive() -> anyhow::Result<()> {
    let table = fixture_pipeline().table().clone();
    let select = |segments: InclusiveRange, years: InclusiveRange| {
        filter_rows(&table, &PlayFilter::new(["ger"], segments, years)).map(|df| names(&df))
    };

    // nathan has 39 segments in 1779, raeuber 25 segments in 1781.
    assert_eq!(
        select(InclusiveRange::new(25, 39), InclusiveRange::new(1779, 1781))?,
        vec!["lessing-nathan-der-weise", "schiller-die-raeuber"]
    );

    assert!(select(InclusiveRange::new(26, 38), InclusiveRange::new(1779, 1781))?.is_empty());
    assert_eq!(
        select(InclusiveRange::new(25, 39), InclusiveRange::new(1780, 1781))?,
        vec!["schiller-die-raeuber"]
    );
    assert_eq!(
        select(InclusiveRange::new(25, 39), InclusiveRange::new(1779, 1780))?,
        vec!["lessing-nathan-der-weise"]
    );
    Ok(())
}

#[test]
fn swt_plays_are_labelled_by_corpus() -> anyhow::Result<()> {
    let len = 10;
    let cc = vec![0.1f64, 0.2, 0.1, 0.2, 0.1, 0.2, 0.1, 0.2, 0.1, 5.0];
    let df = df!(
        schema::NAME => (0..len).map(|idx| format!("play-{idx}")).collect::<Vec<_>>(),
        schema::CORPUS_NAME => vec!["test"; len],
        schema::CORPUS_ACRONYM => vec!["TST"; len],
        schema::FIRST_AUTHOR => vec!["Anon"; len],
        schema::TITLE => vec!["Untitled"; len],
        schema::YEAR_NORMALIZED => (0..len as i64).map(|idx| if idx == 0 { None } else { Some(1800 + idx) }).collect::<Vec<_>>(),
        schema::S => vec![1.5f64; len],
        schema::CC_DEV => cc,
        schema::APL_DEV => vec![0.1f64, -0.1, 0.1, -0.1, 0.1, -0.1, 0.1, -0.1, 0.1, 0.0],
        schema::POLYNOMIAL => vec![1.0f64; len],
        schema::LINEAR => vec![0.0f64; len],
        schema::QUADRATIC => vec![0.0f64; len],
        schema::EXPONENTIAL => vec![0.0f64; len],
    )?;
    let classified = dracor_core::classifier::classify(&df)?;

    let labelled = highlight_swt(&classified)?;
    let labels = labelled.column(schema::SWT_IN_CORPUS)?.str()?;
    assert_eq!(labels.get(9), Some("swt in TST"));
    assert_eq!(labels.get(0), Some("all"));

    let points = scatter_points(&classified)?;
    assert_eq!(points.len(), len - 1, "the play without a year is skipped");
    assert_eq!(points.last().map(|point| point.label.as_str()), Some("swt in TST"));
    Ok(())
}
