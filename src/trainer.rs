//! Full-batch supervised training with optional early stopping.
//!
//! A [`Trainer`] is a two-state machine. It starts in
//! [`TrainerState::Training`] and moves to [`TrainerState::Done`] once the
//! epoch budget is spent or the validation loss drops below the configured
//! threshold, whichever comes first.

use crate::config::TrainConfig;
use crate::data::DatasetSplit;
use crate::error::{IkError, Result};
use crate::loss::{Loss, MeanSquaredError};
use crate::metrics::{EpochMetrics, MetricsTracker, TrainingMetrics};
use crate::network::NeuralNetwork;
use crate::optimizer::OptimizerWrapper;

/// Why training ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopReason {
    /// Every configured epoch ran.
    EpochBudget,
    /// Validation loss fell below the threshold after `epoch` (0-based).
    EarlyStopped { epoch: usize, val_loss: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainerState {
    /// `epoch` is the 0-based index of the next epoch to run.
    Training { epoch: usize },
    Done(StopReason),
}

/// Outcome of [`Trainer::fit`].
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub epochs_run: usize,
    pub final_train_loss: f32,
    pub final_val_loss: f32,
    pub stop_reason: StopReason,
    pub history: TrainingMetrics,
}

pub struct Trainer {
    config: TrainConfig,
    optimizer: OptimizerWrapper,
    loss: MeanSquaredError,
    metrics: MetricsTracker,
    state: TrainerState,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        let optimizer = OptimizerWrapper::from_kind(config.optimizer);
        let metrics = MetricsTracker::new(config.epochs);
        Ok(Trainer {
            config,
            optimizer,
            loss: MeanSquaredError,
            metrics,
            state: TrainerState::Training { epoch: 0 },
        })
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    /// Run one epoch: a gradient step on the whole training set, then a
    /// validation pass with parameters frozen.
    pub fn step_epoch(&mut self, network: &mut NeuralNetwork, split: &DatasetSplit) -> Result<EpochMetrics> {
        let epoch = match self.state {
            TrainerState::Training { epoch } => epoch,
            TrainerState::Done(reason) => {
                return Err(IkError::Training(format!("training already finished ({:?})", reason)));
            }
        };
        if split.train.is_empty() || split.validation.is_empty() {
            return Err(IkError::Training(
                "training and validation sets must both be non-empty".to_string(),
            ));
        }

        network.train();
        let train_loss = network.train_batch(
            split.train.positions.view(),
            split.train.angles.view(),
            &self.loss,
            &mut self.optimizer,
            self.config.learning_rate,
        )?;

        network.eval();
        let predictions = network.predict(split.validation.positions.view())?;
        let val_loss = self.loss.compute_batch(predictions.view(), split.validation.angles.view());

        let entry = EpochMetrics { epoch, train_loss, val_loss };
        self.metrics.record(entry);

        let last_epoch = epoch + 1 >= self.config.epochs;
        let early_stop = self.config.early_stop_threshold.is_some_and(|threshold| val_loss < threshold);

        if epoch % self.config.log_every == 0 || last_epoch || early_stop {
            let smoothed_train_loss = self.metrics.recent_train_loss(self.config.log_every).unwrap_or(train_loss);
            tracing::info!(epoch, train_loss, smoothed_train_loss, val_loss, "epoch finished");
        }

        self.state = if early_stop {
            tracing::info!(epoch, val_loss, "validation loss below threshold, stopping early");
            TrainerState::Done(StopReason::EarlyStopped { epoch, val_loss })
        } else if last_epoch {
            TrainerState::Done(StopReason::EpochBudget)
        } else {
            TrainerState::Training { epoch: epoch + 1 }
        };

        Ok(entry)
    }

    /// Train until the state machine reaches [`TrainerState::Done`].
    pub fn fit(mut self, network: &mut NeuralNetwork, split: &DatasetSplit) -> Result<TrainingReport> {
        tracing::info!(
            epochs = self.config.epochs,
            learning_rate = self.config.learning_rate,
            optimizer = ?self.config.optimizer,
            train_samples = split.train.len(),
            validation_samples = split.validation.len(),
            parameters = network.parameter_count(),
            "training started"
        );
        if self.config.early_stop_threshold.is_none() {
            tracing::warn!("early stopping disabled, running the full epoch budget");
        }

        let mut epochs_run = 0;
        let mut last = None;
        let stop_reason = loop {
            match self.state {
                TrainerState::Training { .. } => {
                    last = Some(self.step_epoch(network, split)?);
                    epochs_run += 1;
                }
                TrainerState::Done(reason) => break reason,
            }
        };
        network.eval();

        let last = last.ok_or_else(|| IkError::Training("no epoch was run".to_string()))?;
        if let Some((epoch, val_loss)) = self.metrics.best_validation() {
            tracing::info!(epochs_run, best_epoch = epoch, best_val_loss = val_loss, "training finished");
        }

        Ok(TrainingReport {
            epochs_run,
            final_train_loss: last.train_loss,
            final_val_loss: last.val_loss,
            stop_reason,
            history: self.metrics.into_metrics(),
        })
    }
}
