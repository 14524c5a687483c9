use serde::Serialize;

/// Count, mean and sample standard deviation (n-1) of a column, skipping
/// missing and NaN values. Undefined moments are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleMoments {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

impl SampleMoments {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let observed: Vec<f64> = values
            .into_iter()
            .flatten()
            .filter(|value| !value.is_nan())
            .collect();

        let count = observed.len();
        if count == 0 {
            return Self {
                count,
                mean: f64::NAN,
                std: f64::NAN,
            };
        }

        let mean = observed.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            let squared: f64 = observed.iter().map(|value| (value - mean).powi(2)).sum();
            (squared / (count - 1) as f64).sqrt()
        };

        Self { count, mean, std }
    }

    /// Optional view for reporting: `None` where the moment is undefined.
    pub fn mean_opt(&self) -> Option<f64> {
        (!self.mean.is_nan()).then_some(self.mean)
    }

    pub fn std_opt(&self) -> Option<f64> {
        (!self.std.is_nan()).then_some(self.std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_uses_n_minus_one() {
        let moments = SampleMoments::from_values([Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(moments.count, 4);
        assert!((moments.mean - 2.5).abs() < 1e-12);
        assert!((moments.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn missing_values_are_skipped() {
        let moments = SampleMoments::from_values([Some(2.0), None, Some(f64::NAN), Some(4.0)]);
        assert_eq!(moments.count, 2);
        assert!((moments.mean - 3.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_are_nan() {
        let empty = SampleMoments::from_values(std::iter::empty());
        assert!(empty.mean.is_nan());
        assert!(empty.std.is_nan());
        assert_eq!(empty.mean_opt(), None);

        let single = SampleMoments::from_values([Some(7.0)]);
        assert_eq!(single.mean_opt(), Some(7.0));
        assert!(single.std.is_nan());
        assert_eq!(single.std_opt(), None);
    }
}
