// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration
//   Step 2: Load MNIST training images    (Layer 4 - data)
//   Step 3: Normalise pixels              (Layer 4 - data)
//   Step 4: Split train/validation        (Layer 4 - data)
//   Step 5: Build datasets                (Layer 4 - data)
//   Step 6: Save config                   (Layer 6 - infra)
//   Step 7: Run training loop             (Layer 5 - ml)

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::data::{
    dataset::ImageDataset,
    loader::MnistSource,
    normalizer::Normalizer,
    splitter::split_train_val,
};
use crate::domain::{
    image::{NUM_CLASSES, NUM_PIXELS},
    traits::{ImageSource, Split},
};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{
    loss::LossKind,
    model::{Activation, ClassifierConfig},
    trainer::{run_training, OptimizerKind, TrainingSummary},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved next to the checkpoints so inference can rebuild the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub checkpoint_dir: String,
    /// Read at most this many training images (None = all 60 000)
    pub sample_limit:   Option<usize>,
    pub hidden_sizes:   Vec<usize>,
    pub activation:     Activation,
    pub loss:           LossKind,
    pub optimizer:      OptimizerKind,
    pub learning_rate:  f64,
    /// SGD momentum, 0 disables it
    pub momentum:       f64,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub train_fraction: f64,
    pub seed:           u64,
    pub num_workers:    usize,
    pub norm_mean:      f32,
    pub norm_std:       f32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            sample_limit:   None,
            hidden_sizes:   vec![128, 64],
            activation:     Activation::Relu,
            loss:           LossKind::NegativeLogLikelihood,
            optimizer:      OptimizerKind::Sgd,
            learning_rate:  0.003,
            momentum:       0.0,
            batch_size:     64,
            epochs:         5,
            train_fraction: 0.9,
            seed:           42,
            num_workers:    2,
            norm_mean:      0.5,
            norm_std:       0.5,
        }
    }
}

impl TrainConfig {
    /// Read a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Reject values the training loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be positive");
        ensure!(self.epochs > 0, "epochs must be positive");
        ensure!(
            self.learning_rate > 0.0 && self.learning_rate.is_finite(),
            "learning_rate must be a positive number, got {}",
            self.learning_rate
        );
        ensure!(
            (0.0..1.0).contains(&self.momentum),
            "momentum must be in [0, 1), got {}",
            self.momentum
        );
        ensure!(
            self.train_fraction > 0.0 && self.train_fraction <= 1.0,
            "train_fraction must be in (0, 1], got {}",
            self.train_fraction
        );
        ensure!(self.norm_std > 0.0, "norm_std must be positive");
        ensure!(
            self.hidden_sizes.iter().all(|&h| h > 0),
            "hidden layer sizes must be positive: {:?}",
            self.hidden_sizes
        );
        ensure!(self.num_workers > 0, "num_workers must be positive");
        Ok(())
    }

    pub fn model_config(&self) -> ClassifierConfig {
        ClassifierConfig::new(NUM_PIXELS, NUM_CLASSES)
            .with_hidden_sizes(self.hidden_sizes.clone())
            .with_activation(self.activation)
    }

    pub fn normalizer(&self) -> Result<Normalizer> {
        Normalizer::new(self.norm_mean, self.norm_std)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingSummary> {
        let source = MnistSource::new(self.config.sample_limit);
        self.execute_with(&source)
    }

    /// Same pipeline with any image source.
    pub fn execute_with(&self, source: &dyn ImageSource) -> Result<TrainingSummary> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load training images ──────────────────────────────────────
        let raw = source.load(Split::Train)?;
        tracing::info!("Loaded {} training images", raw.len());

        // ── Step 3: Normalise ─────────────────────────────────────────────────
        let samples = cfg.normalizer()?.apply_all(&raw);

        // ── Step 4: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) = split_train_val(samples, cfg.train_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 5: Build Burn datasets ───────────────────────────────────────
        let train_dataset = ImageDataset::new(train_samples);
        let val_dataset   = ImageDataset::new(val_samples);
        tracing::debug!("Training class counts: {:?}", train_dataset.class_counts());

        // ── Step 6: Save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
        tracing::info!("Writing epoch metrics to '{}'", metrics.csv_path().display());

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        let summary = run_training(cfg, train_dataset, val_dataset, &ckpt_manager, &metrics)?;

        if let Some(best) = summary.best_epoch {
            tracing::info!("Lowest validation loss at epoch {}", best);
        }
        Ok(summary)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::domain::image::RawImage;

    /// Fixed in-memory images: bright digits are 1, dark digits are 0.
    struct FixedSource(usize);

    impl ImageSource for FixedSource {
        fn load(&self, _split: Split) -> Result<Vec<RawImage>> {
            Ok((0..self.0)
                .map(|i| {
                    let label = (i % 2) as u8;
                    let value = if label == 1 { 200.0 } else { 20.0 };
                    RawImage::new(vec![value; NUM_PIXELS], label)
                })
                .collect())
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let cfg = TrainConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.model_config().layer_sizes(), vec![784, 128, 64, 10]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad = [
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { epochs: 0, ..TrainConfig::default() },
            TrainConfig { learning_rate: -0.1, ..TrainConfig::default() },
            TrainConfig { momentum: 1.0, ..TrainConfig::default() },
            TrainConfig { train_fraction: 0.0, ..TrainConfig::default() },
            TrainConfig { norm_std: 0.0, ..TrainConfig::default() },
            TrainConfig { hidden_sizes: vec![64, 0], ..TrainConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{ "epochs": 2, "loss": "cross-entropy", "hidden_sizes": [32] }"#).unwrap();

        let cfg = TrainConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.epochs, 2);
        assert_eq!(cfg.loss, LossKind::CrossEntropy);
        assert_eq!(cfg.hidden_sizes, vec![32]);
        assert_eq!(cfg.batch_size, 64);
    }

    #[test]
    fn test_pipeline_trains_and_writes_checkpoint() {
        let dir = TempDir::new().unwrap();
        let cfg = TrainConfig {
            checkpoint_dir: dir.path().to_string_lossy().into_owned(),
            hidden_sizes:   vec![8],
            batch_size:     4,
            epochs:         1,
            learning_rate:  0.01,
            num_workers:    1,
            ..TrainConfig::default()
        };

        let summary = TrainUseCase::new(cfg).execute_with(&FixedSource(20)).unwrap();

        assert_eq!(summary.epochs.len(), 1);
        assert!(dir.path().join("train_config.json").exists());
        assert!(dir.path().join("latest_epoch.json").exists());
        assert!(dir.path().join("metrics.csv").exists());
    }
}
