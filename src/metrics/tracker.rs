use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Losses recorded for one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f32,
    pub val_loss: f32,
}

/// Stores training metrics over time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Per-epoch losses, oldest first
    pub epochs: VecDeque<EpochMetrics>,

    /// Lowest validation loss seen so far, with its epoch
    pub best_val: Option<(usize, f32)>,
}

/// Tracks metrics during training
pub struct MetricsTracker {
    metrics: TrainingMetrics,
    history_size: usize,
}

impl MetricsTracker {
    /// Keep at most `history_size` epochs of history. The best validation loss
    /// is tracked across the whole run regardless.
    pub fn new(history_size: usize) -> Self {
        MetricsTracker {
            metrics: TrainingMetrics {
                epochs: VecDeque::with_capacity(history_size.min(1024)),
                best_val: None,
            },
            history_size: history_size.max(1),
        }
    }

    pub fn record(&mut self, entry: EpochMetrics) {
        if self.metrics.epochs.len() >= self.history_size {
            self.metrics.epochs.pop_front();
        }
        self.metrics.epochs.push_back(entry);

        let improved = match self.metrics.best_val {
            Some((_, best)) => entry.val_loss < best,
            None => entry.val_loss.is_finite(),
        };
        if improved {
            self.metrics.best_val = Some((entry.epoch, entry.val_loss));
        }
    }

    pub fn best_validation(&self) -> Option<(usize, f32)> {
        self.metrics.best_val
    }

    /// Mean training loss over the last `window` recorded epochs
    pub fn recent_train_loss(&self, window: usize) -> Option<f32> {
        let count = window.min(self.metrics.epochs.len());
        if count == 0 {
            return None;
        }
        let sum: f32 = self.metrics.epochs.iter().rev().take(count).map(|m| m.train_loss).sum();
        Some(sum / count as f32)
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> TrainingMetrics {
        self.metrics
    }
}
