use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::schema;
use crate::stats::SampleMoments;

/// Number of standard deviations that separate a small-world play from the rest.
pub const SIGMA_FACTOR: f64 = 2.0;

/// Cut-offs for the two small-world criteria, computed over one input set.
///
/// With fewer than two observations the deviation is NaN and both criteria
/// are unsatisfiable, since every comparison against NaN is false.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmallWorldThresholds {
    pub cc_threshold: f64,
    pub apl_low: f64,
    pub apl_high: f64,
}

impl SmallWorldThresholds {
    pub fn from_moments(cc: SampleMoments, apl: SampleMoments) -> Self {
        Self {
            cc_threshold: cc.mean + SIGMA_FACTOR * cc.std,
            apl_low: apl.mean - SIGMA_FACTOR * apl.std,
            apl_high: apl.mean + SIGMA_FACTOR * apl.std,
        }
    }

    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let cc = SampleMoments::from_values(&schema::f64_column(df, schema::CC_DEV)?);
        let apl = SampleMoments::from_values(&schema::f64_column(df, schema::APL_DEV)?);
        let thresholds = Self::from_moments(cc, apl);

        debug!(
            rows = df.height(),
            cc_threshold = thresholds.cc_threshold,
            apl_low = thresholds.apl_low,
            apl_high = thresholds.apl_high,
            "computed small-world thresholds"
        );

        Ok(thresholds)
    }

    /// Criterion I: clustering clearly above the random baseline.
    pub fn meets_clustering(&self, cc_dev: f64) -> bool {
        cc_dev > self.cc_threshold
    }

    /// Criterion II: path length strictly inside the band.
    pub fn meets_path_length(&self, apl_dev: f64) -> bool {
        self.apl_low < apl_dev && apl_dev < self.apl_high
    }

    pub fn is_degenerate(&self) -> bool {
        self.cc_threshold.is_nan() || self.apl_low.is_nan() || self.apl_high.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_follow_two_sigma_rule() -> Result<()> {
        let df = df!(
            schema::CC_DEV => &[1.0f64, 2.0, 3.0],
            schema::APL_DEV => &[0.0f64, 1.0, 2.0],
        )?;

        let thresholds = SmallWorldThresholds::from_frame(&df)?;
        assert!((thresholds.cc_threshold - 4.0).abs() < 1e-12);
        assert!((thresholds.apl_low + 1.0).abs() < 1e-12);
        assert!((thresholds.apl_high - 3.0).abs() < 1e-12);
        assert!(!thresholds.is_degenerate());
        Ok(())
    }

    #[test]
    fn band_is_strict_on_both_sides() {
        let thresholds = SmallWorldThresholds {
            cc_threshold: 1.0,
            apl_low: -1.0,
            apl_high: 1.0,
        };
        assert!(!thresholds.meets_path_length(-1.0));
        assert!(!thresholds.meets_path_length(1.0));
        assert!(thresholds.meets_path_length(0.0));
        assert!(!thresholds.meets_clustering(1.0));
        assert!(thresholds.meets_clustering(1.0001));
    }

    #[test]
    fn singleton_input_never_qualifies() -> Result<()> {
        let df = df!(
            schema::CC_DEV => &[10.0f64],
            schema::APL_DEV => &[0.0f64],
        )?;

        let thresholds = SmallWorldThresholds::from_frame(&df)?;
        assert!(thresholds.is_degenerate());
        assert!(!thresholds.meets_clustering(1_000.0));
        assert!(!thresholds.meets_path_length(0.0));
        Ok(())
    }
}
