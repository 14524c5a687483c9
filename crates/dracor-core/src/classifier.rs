use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::schema;
use crate::thresholds::SmallWorldThresholds;

/// Goodness-of-fit scores of the growth-curve models for one play.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthFits {
    pub polynomial: f64,
    pub linear: f64,
    pub quadratic: f64,
    pub exponential: f64,
}

impl GrowthFits {
    /// Ties do not count as dominance.
    pub fn polynomial_dominates(&self) -> bool {
        self.polynomial > self.linear
            && self.polynomial > self.quadratic
            && self.polynomial > self.exponential
    }
}

pub fn is_swt(thresholds: &SmallWorldThresholds, cc_dev: Option<f64>, apl_dev: Option<f64>) -> bool {
    match (cc_dev, apl_dev) {
        (Some(cc), Some(apl)) => thresholds.meets_clustering(cc) && thresholds.meets_path_length(apl),
        _ => false,
    }
}

pub fn is_sft(swt: bool, fits: Option<GrowthFits>) -> bool {
    swt && fits.is_some_and(|fits| fits.polynomial_dominates())
}

pub fn swt_flags(df: &DataFrame, thresholds: &SmallWorldThresholds) -> Result<Vec<i64>> {
    let cc_dev = schema::f64_column(df, schema::CC_DEV)?;
    let apl_dev = schema::f64_column(df, schema::APL_DEV)?;

    Ok((&cc_dev)
        .into_iter()
        .zip(&apl_dev)
        .map(|(cc, apl)| i64::from(is_swt(thresholds, cc, apl)))
        .collect())
}

pub fn sft_flags(df: &DataFrame, swt: &[i64]) -> Result<Vec<i64>> {
    let polynomial = schema::f64_column(df, schema::POLYNOMIAL)?;
    let linear = schema::f64_column(df, schema::LINEAR)?;
    let quadratic = schema::f64_column(df, schema::QUADRATIC)?;
    let exponential = schema::f64_column(df, schema::EXPONENTIAL)?;

    let mut flags = Vec::with_capacity(swt.len());
    for (idx, &swt_flag) in swt.iter().enumerate() {
        let fits = match (
            polynomial.get(idx),
            linear.get(idx),
            quadratic.get(idx),
            exponential.get(idx),
        ) {
            (Some(polynomial), Some(linear), Some(quadratic), Some(exponential)) => {
                Some(GrowthFits {
                    polynomial,
                    linear,
                    quadratic,
                    exponential,
                })
            }
            _ => None,
        };
        flags.push(i64::from(is_sft(swt_flag == 1, fits)));
    }

    Ok(flags)
}

/// Adds `swt` and `sft` columns, with thresholds computed over `df` itself.
/// Existing columns of the same name are replaced.
pub fn classify(df: &DataFrame) -> Result<DataFrame> {
    let thresholds = SmallWorldThresholds::from_frame(df)?;
    classify_with(df, &thresholds)
}

pub fn classify_with(df: &DataFrame, thresholds: &SmallWorldThresholds) -> Result<DataFrame> {
    let swt = swt_flags(df, thresholds)?;
    let sft = sft_flags(df, &swt)?;

    let mut output = df.clone();
    output.with_column(Series::new(schema::SWT.into(), swt))?;
    output.with_column(Series::new(schema::SFT.into(), sft))?;
    Ok(output)
}
