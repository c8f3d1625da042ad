use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IkError, Result};
use crate::optimizer::OptimizerKind;

/// Log filter the binaries fall back to when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Where the two training tables live.
///
/// Tables resolve to `root/[model_name/]file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub root: PathBuf,
    pub model_name: Option<String>,
    pub positions_file: String,
    pub angles_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            root: PathBuf::from("training"),
            model_name: None,
            positions_file: "positions.csv".to_string(),
            angles_file: "angles.csv".to_string(),
        }
    }
}

impl DataConfig {
    /// Tables generated for one manipulator, kept in their own subdirectory.
    pub fn for_model(name: &str) -> Self {
        DataConfig {
            model_name: Some(name.to_string()),
            angles_file: "values.csv".to_string(),
            ..DataConfig::default()
        }
    }

    pub fn directory(&self) -> PathBuf {
        match &self.model_name {
            Some(name) => self.root.join(name),
            None => self.root.clone(),
        }
    }

    pub fn positions_path(&self) -> PathBuf {
        self.directory().join(&self.positions_file)
    }

    pub fn angles_path(&self) -> PathBuf {
        self.directory().join(&self.angles_file)
    }
}

/// Hyperparameters and artifact locations for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data: DataConfig,
    pub epochs: usize,
    pub learning_rate: f32,
    pub optimizer: OptimizerKind,
    pub validation_fraction: f64,
    /// Seeds both the train/validation split and the weight initialization.
    pub seed: u64,
    /// Log losses every this many epochs.
    pub log_every: usize,
    /// Stop once validation loss falls below this value.
    pub early_stop_threshold: Option<f32>,
    pub checkpoint_path: PathBuf,
    pub onnx_path: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            data: DataConfig::default(),
            epochs: 10_000,
            learning_rate: 0.001,
            optimizer: OptimizerKind::Adam,
            validation_fraction: 0.2,
            seed: 42,
            log_every: 100,
            early_stop_threshold: None,
            checkpoint_path: PathBuf::from("crane3r_model.bin"),
            onnx_path: None,
        }
    }
}

impl TrainConfig {
    /// The Crane3R run: model-scoped tables, early stopping at 0.1 and an ONNX export.
    pub fn crane3r() -> Self {
        TrainConfig {
            data: DataConfig::for_model("crane3r"),
            early_stop_threshold: Some(0.1),
            checkpoint_path: PathBuf::from("crane3r_model.bin"),
            onnx_path: Some(PathBuf::from("crane3r.onnx")),
            ..TrainConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(IkError::invalid_parameter("epochs", "must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(IkError::invalid_parameter(
                "learning_rate".to_string(),
                format!("must be positive, got {}", self.learning_rate),
            ));
        }
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(IkError::invalid_parameter(
                "validation_fraction".to_string(),
                format!("must be in (0, 1), got {}", self.validation_fraction),
            ));
        }
        if self.log_every == 0 {
            return Err(IkError::invalid_parameter("log_every", "must be at least 1"));
        }
        if let Some(threshold) = self.early_stop_threshold {
            if threshold.is_nan() {
                return Err(IkError::invalid_parameter("early_stop_threshold", "must not be NaN"));
            }
        }
        Ok(())
    }

    /// Where the config used for a run is recorded, next to its checkpoint.
    pub fn sidecar_path(&self) -> PathBuf {
        self.checkpoint_path.with_file_name("train_config.json")
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: TrainConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}
