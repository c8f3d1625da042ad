use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::dataset::Dataset;
use crate::error::{IkError, Result};

/// Disjoint training and validation subsets of one dataset.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Dataset,
    pub validation: Dataset,
    /// Source row of each training sample.
    pub train_indices: Vec<usize>,
    /// Source row of each validation sample.
    pub validation_indices: Vec<usize>,
}

impl DatasetSplit {
    /// Use explicit subsets, e.g. when the caller wants to validate on the training data.
    pub fn from_parts(train: Dataset, validation: Dataset) -> Self {
        let train_indices = (0..train.len()).collect();
        let validation_indices = (0..validation.len()).collect();
        DatasetSplit {
            train,
            validation,
            train_indices,
            validation_indices,
        }
    }
}

/// Shuffle row indices with a seeded RNG and carve off `ceil(n * validation_fraction)`
/// rows for validation. The same dataset, fraction and seed always give the same split.
pub fn split_train_validation(dataset: &Dataset, validation_fraction: f64, seed: u64) -> Result<DatasetSplit> {
    if !(validation_fraction > 0.0 && validation_fraction < 1.0) {
        return Err(IkError::invalid_parameter(
            "validation_fraction".to_string(),
            format!("must be in (0, 1), got {}", validation_fraction),
        ));
    }

    let total = dataset.len();
    let validation_len = (total as f64 * validation_fraction).ceil() as usize;
    if total < 2 || validation_len >= total {
        return Err(IkError::invalid_parameter(
            "dataset".to_string(),
            format!(
                "{} samples cannot be split into non-empty training and validation sets",
                total
            ),
        ));
    }

    let mut indices: Vec<usize> = (0..total).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(validation_len);
    let validation_indices = indices;

    tracing::debug!(
        train = train_indices.len(),
        validation = validation_indices.len(),
        seed,
        "dataset split"
    );

    Ok(DatasetSplit {
        train: dataset.select(&train_indices),
        validation: dataset.select(&validation_indices),
        train_indices,
        validation_indices,
    })
}
