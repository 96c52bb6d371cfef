// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader.
//
// Per batch:
//   1. forward pass           logits = model(images)
//   2. loss                   CE(logits, y) or NLL(log_softmax(logits), y)
//   3. backward pass          grads = loss.backward()
//   4. optimiser step         model = optim.step(lr, model, grads)
//
// Notes on Burn's two backends:
//   - Training uses TrainBackend (Autodiff<..>) for gradients
//   - model.valid() returns the model on the inner backend,
//     so the validation batcher uses B::InnerBackend too

use std::{fmt, str::FromStr};

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    data::dataset::Dataset,
    module::AutodiffModule,
    optim::{momentum::MomentumConfig, AdamConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ImageBatcher, dataset::ImageDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::backend::{default_device, TrainBackend};
use crate::ml::inferencer::evaluate_batches;
use crate::ml::model::Classifier;

/// Which Burn optimizer updates the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerKind {
    Sgd,
    Adam,
}

impl FromStr for OptimizerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sgd" => Ok(OptimizerKind::Sgd),
            "adam" => Ok(OptimizerKind::Adam),
            other => anyhow::bail!("unknown optimizer '{other}' (expected sgd or adam)"),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Sgd => f.write_str("sgd"),
            OptimizerKind::Adam => f.write_str("adam"),
        }
    }
}

/// Outcome of a full training run.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub epochs:     Vec<EpochMetrics>,
    /// Epoch with the lowest validation loss, if any was measured
    pub best_epoch: Option<usize>,
}

impl TrainingSummary {
    pub fn final_metrics(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainingSummary> {
    let device = default_device();
    train_loop::<TrainBackend>(cfg, train_dataset, val_dataset, ckpt_manager, metrics, device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<TrainingSummary> {
    ensure!(!train_dataset.is_empty(), "training set is empty");

    B::seed(cfg.seed);

    if cfg.optimizer == OptimizerKind::Adam && cfg.momentum > 0.0 {
        tracing::warn!("momentum={} is ignored by the adam optimizer", cfg.momentum);
    }

    // ── Build model ───────────────────────────────────────────────────────────
    let model: Classifier<B> = cfg.model_config().init(&device);
    tracing::info!(
        "Model ready: layers {:?}, activation={}, {} parameters",
        cfg.model_config().layer_sizes(),
        cfg.activation,
        model.num_params(),
    );

    // ── Optimiser ─────────────────────────────────────────────────────────────
    match cfg.optimizer {
        OptimizerKind::Sgd => {
            let momentum = (cfg.momentum > 0.0)
                .then(|| MomentumConfig::new().with_momentum(cfg.momentum).with_dampening(0.0));
            let optim = SgdConfig::new()
                .with_momentum(momentum)
                .init::<B, Classifier<B>>();
            fit(cfg, model, optim, train_dataset, val_dataset, ckpt_manager, metrics, device)
        }
        OptimizerKind::Adam => {
            let optim = AdamConfig::new()
                .with_epsilon(1e-8)
                .init::<B, Classifier<B>>();
            fit(cfg, model, optim, train_dataset, val_dataset, ckpt_manager, metrics, device)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn fit<B, O>(
    cfg:           &TrainConfig,
    mut model:     Classifier<B>,
    mut optim:     O,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<TrainingSummary>
where
    B: AutodiffBackend,
    O: Optimizer<Classifier<B>, B>,
{
    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = ImageBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend, no autodiff overhead) ───────────
    let val_batcher = ImageBatcher::<B::InnerBackend>::new(device);
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(cfg.num_workers)
        .build(val_dataset);

    let mut history: Vec<EpochMetrics> = Vec::with_capacity(cfg.epochs);
    let mut best: Option<(usize, f64)> = None;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut running_loss = 0.0f64;
        let mut batches      = 0usize;

        for batch in train_loader.iter() {
            let logits = model.forward(batch.images);
            let loss   = cfg.loss.forward(logits, batch.targets);

            running_loss += loss.clone().into_scalar().elem::<f64>();
            batches      += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let train_loss = if batches > 0 { running_loss / batches as f64 } else { f64::NAN };

        // Inner-backend copy of the weights, no graph recorded
        let model_valid = model.valid();
        let report      = evaluate_batches(&model_valid, val_loader.iter(), cfg.loss)?;

        let m = EpochMetrics::new(epoch, train_loss, report.loss, report.accuracy());
        println!(
            "Epoch {:>3}/{} | Training loss: {:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, m.train_loss, m.val_loss, m.val_accuracy * 100.0,
        );

        if m.is_improvement(best.map_or(f64::INFINITY, |(_, l)| l)) {
            best = Some((epoch, m.val_loss));
        }

        metrics.log(&m)?;
        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
        history.push(m);
    }

    tracing::info!("Training complete!");
    Ok(TrainingSummary { epochs: history, best_epoch: best.map(|(e, _)| e) })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};

    use crate::domain::image::{ImageSample, NUM_PIXELS};
    use crate::ml::loss::LossKind;

    type TestBackend = Autodiff<NdArray>;

    /// Two separable classes: bright images are 1, dark images are 0.
    fn toy_dataset(n: usize) -> ImageDataset {
        let samples = (0..n)
            .map(|i| {
                let label = (i % 2) as u8;
                let value = if label == 1 { 0.8 } else { -0.8 };
                ImageSample::new(vec![value; NUM_PIXELS], label)
            })
            .collect();
        ImageDataset::new(samples)
    }

    fn toy_config(optimizer: OptimizerKind, loss: LossKind) -> TrainConfig {
        TrainConfig {
            hidden_sizes:  vec![16],
            batch_size:    8,
            epochs:        3,
            learning_rate: 0.01,
            optimizer,
            loss,
            num_workers:   1,
            ..TrainConfig::default()
        }
    }

    fn run(cfg: &TrainConfig) -> (TrainingSummary, tempfile::TempDir) {
        let dir     = tempfile::TempDir::new().unwrap();
        let ckpt    = CheckpointManager::new(dir.path()).unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();
        let summary = train_loop::<TestBackend>(
            cfg, toy_dataset(32), toy_dataset(8), &ckpt, &metrics, Default::default(),
        )
        .unwrap();
        (summary, dir)
    }

    #[test]
    fn test_sgd_learns_separable_classes() {
        let (summary, dir) = run(&toy_config(OptimizerKind::Sgd, LossKind::NegativeLogLikelihood));

        assert_eq!(summary.epochs.len(), 3);
        let first = summary.epochs.first().unwrap();
        let last  = summary.final_metrics().unwrap();
        assert!(last.train_loss < first.train_loss, "{} !< {}", last.train_loss, first.train_loss);
        assert!((0.0..=1.0).contains(&last.val_accuracy));
        assert!(summary.best_epoch.is_some());

        // One checkpoint per epoch plus a metrics row per epoch
        assert!(dir.path().join("model_epoch_3.mpk.gz").exists());
        let csv = std::fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_sgd_with_momentum_learns() {
        let cfg = TrainConfig { momentum: 0.9, ..toy_config(OptimizerKind::Sgd, LossKind::CrossEntropy) };
        let (summary, _dir) = run(&cfg);

        let first = summary.epochs.first().unwrap();
        let last  = summary.final_metrics().unwrap();
        assert!(last.train_loss.is_finite());
        assert!(last.train_loss < first.train_loss, "{} !< {}", last.train_loss, first.train_loss);
    }

    #[test]
    fn test_adam_ignores_momentum() {
        let mut cfg = toy_config(OptimizerKind::Adam, LossKind::CrossEntropy);
        cfg.learning_rate = 1e-3;
        cfg.momentum = 0.9;
        cfg.epochs = 1;
        let (summary, _dir) = run(&cfg);
        assert!(summary.epochs[0].train_loss.is_finite());
    }

    #[test]
    fn test_adam_with_cross_entropy_runs() {
        let mut cfg = toy_config(OptimizerKind::Adam, LossKind::CrossEntropy);
        cfg.learning_rate = 1e-3;
        cfg.epochs = 1;
        let (summary, _dir) = run(&cfg);
        assert!(summary.epochs[0].train_loss.is_finite());
    }

    #[test]
    fn test_empty_training_set_is_an_error() {
        let dir     = tempfile::TempDir::new().unwrap();
        let ckpt    = CheckpointManager::new(dir.path()).unwrap();
        let metrics = MetricsLogger::new(dir.path()).unwrap();
        let cfg     = toy_config(OptimizerKind::Sgd, LossKind::CrossEntropy);
        let result  = train_loop::<TestBackend>(
            &cfg, ImageDataset::new(Vec::new()), toy_dataset(4), &ckpt, &metrics, Default::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_optimizer_parsing() {
        assert_eq!("SGD".parse::<OptimizerKind>().unwrap(), OptimizerKind::Sgd);
        assert_eq!("adam".parse::<OptimizerKind>().unwrap(), OptimizerKind::Adam);
        assert!("rmsprop".parse::<OptimizerKind>().is_err());
    }
}
