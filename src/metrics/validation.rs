use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Regression metrics
pub struct RegressionMetrics;

impl RegressionMetrics {
    /// Mean Squared Error
    pub fn mse(predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        let diff = &predictions - &targets;
        (&diff * &diff).mean().unwrap_or(f32::NAN)
    }

    /// Root Mean Squared Error
    pub fn rmse(predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        Self::mse(predictions, targets).sqrt()
    }

    /// Mean Absolute Error
    pub fn mae(predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        (&predictions - &targets).mapv(f32::abs).mean().unwrap_or(f32::NAN)
    }

    /// R-squared (coefficient of determination)
    pub fn r_squared(predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        let mean_target = match targets.mean() {
            Some(mean) => mean,
            None => return f32::NAN,
        };
        let ss_tot = targets.mapv(|t| (t - mean_target).powi(2)).sum();
        let ss_res = (&predictions - &targets).mapv(|e| e.powi(2)).sum();

        1.0 - (ss_res / ss_tot)
    }

    /// Per-output-column metrics for a batch of predictions, e.g. one entry per joint.
    pub fn per_column(predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Vec<RegressionReport> {
        predictions
            .axis_iter(Axis(1))
            .zip(targets.axis_iter(Axis(1)))
            .map(|(p, t)| RegressionReport {
                mse: Self::mse(p, t),
                rmse: Self::rmse(p, t),
                mae: Self::mae(p, t),
                r_squared: Self::r_squared(p, t),
            })
            .collect()
    }
}

/// Summary of how well one output column is predicted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionReport {
    pub mse: f32,
    pub rmse: f32,
    pub mae: f32,
    pub r_squared: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_scalar_metrics() {
        let predictions = arr1(&[1.0, 2.0, 3.0]);
        let targets = arr1(&[1.0, 2.0, 5.0]);
        assert!((RegressionMetrics::mse(predictions.view(), targets.view()) - 4.0 / 3.0).abs() < 1e-6);
        assert!((RegressionMetrics::mae(predictions.view(), targets.view()) - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_perfect_fit_has_unit_r_squared() {
        let values = arr1(&[0.5, 1.5, -2.0]);
        assert_eq!(RegressionMetrics::r_squared(values.view(), values.view()), 1.0);
    }

    #[test]
    fn test_per_column() {
        let predictions = arr2(&[[0.0, 1.0], [0.0, 1.0]]);
        let targets = arr2(&[[0.0, 0.0], [0.0, 2.0]]);
        let reports = RegressionMetrics::per_column(predictions.view(), targets.view());
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].mse, 0.0);
        assert_eq!(reports[1].mse, 1.0);
    }
}
