pub mod tracker;
pub mod validation;

pub use tracker::{EpochMetrics, MetricsTracker, TrainingMetrics};
pub use validation::{RegressionMetrics, RegressionReport};
