//! Numeric standardization.
//!
//! Each numeric column is transformed to zero mean and unit variance using
//! statistics computed from that column alone. The population convention is
//! used for the standard deviation (divide by n, not n-1).

/// Per-column standardization statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingStats {
    /// Column mean.
    pub mean: f32,

    /// Population standard deviation.
    pub std_dev: f32,
}

impl ScalingStats {
    /// Compute mean and population standard deviation of a column.
    ///
    /// An empty column yields zeros for both.
    pub fn fit(values: &[f32]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let mean = values.iter().sum::<f32>() / n as f32;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n as f32;

        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// Standardize one value.
    ///
    /// A constant column has zero deviation; its values scale to exactly 0
    /// rather than dividing by zero.
    #[inline]
    pub fn scale(&self, value: f32) -> f32 {
        if self.std_dev == 0.0 {
            0.0
        } else {
            (value - self.mean) / self.std_dev
        }
    }

    /// Standardize a whole column.
    pub fn transform(&self, values: &[f32]) -> Vec<f32> {
        values.iter().map(|&v| self.scale(v)).collect()
    }

    /// Fit and standardize in one step.
    pub fn fit_transform(values: &[f32]) -> (Vec<f32>, Self) {
        let stats = Self::fit(values);
        (stats.transform(values), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fit_computes_population_std() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = ScalingStats::fit(&values);

        assert_abs_diff_eq!(stats.mean, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(stats.std_dev, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn transform_centers_and_scales() {
        let (scaled, stats) = ScalingStats::fit_transform(&[2.0, 4.0, 6.0]);

        assert_abs_diff_eq!(stats.mean, 4.0, epsilon = 1e-6);
        let mean: f32 = scaled.iter().sum::<f32>() / scaled.len() as f32;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-6);

        let variance: f32 =
            scaled.iter().map(|v| v * v).sum::<f32>() / scaled.len() as f32;
        assert_abs_diff_eq!(variance, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn constant_column_scales_to_zero() {
        let (scaled, stats) = ScalingStats::fit_transform(&[7.0, 7.0, 7.0, 7.0]);

        assert_eq!(stats.std_dev, 0.0);
        assert!(scaled.iter().all(|&v| v == 0.0));
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn single_value_column_scales_to_zero() {
        let (scaled, _) = ScalingStats::fit_transform(&[3.25]);
        assert_eq!(scaled, vec![0.0]);
    }

    #[test]
    fn empty_column_fit_is_defined() {
        let stats = ScalingStats::fit(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert!(stats.transform(&[]).is_empty());
    }
}
