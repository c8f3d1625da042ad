use ndarray::{Array2, Axis};

use crate::error::{IkError, Result};

/// Row-aligned pairs of target positions and the joint angles that reach them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub positions: Array2<f32>,
    pub angles: Array2<f32>,
}

impl Dataset {
    /// Pair two tables, refusing tables whose rows would not line up.
    pub fn new(positions: Array2<f32>, angles: Array2<f32>) -> Result<Self> {
        if positions.nrows() != angles.nrows() {
            return Err(IkError::dimension_mismatch(
                format!("{} angle rows (one per position)", positions.nrows()),
                format!("{} angle rows", angles.nrows()),
            ));
        }
        Ok(Dataset { positions, angles })
    }

    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            positions: self.positions.select(Axis(0), indices),
            angles: self.angles.select(Axis(0), indices),
        }
    }
}
