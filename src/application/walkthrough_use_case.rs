// ============================================================
// Layer 2 — WalkthroughUseCase
// ============================================================
// Small guided experiments that show what the training loop
// does under the hood:
//
//   autograd — z = mean(x²) on a random x, then backward()
//   step     — one batch, one backward pass, one SGD update

use anyhow::{ensure, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::Distribution,
};

use crate::data::{batcher::ImageBatcher, loader::MnistSource, normalizer::Normalizer};
use crate::domain::image::{NUM_CLASSES, NUM_PIXELS};
use crate::domain::traits::{ImageSource, Split};
use crate::ml::{
    autograd::{single_step, square_mean_gradient, GradientCheck, StepReport},
    backend::{default_device, TrainBackend},
    loss::LossKind,
    model::{Activation, Classifier, ClassifierConfig},
};

/// Settings for the single-step walkthrough.
#[derive(Debug, Clone)]
pub struct StepConfig {
    pub hidden_sizes:  Vec<usize>,
    pub activation:    Activation,
    pub loss:          LossKind,
    pub learning_rate: f64,
    pub batch_size:    usize,
    pub seed:          u64,
}

pub struct WalkthroughUseCase;

impl WalkthroughUseCase {
    /// Random `rows × cols` input through `z = mean(x²)`.
    pub fn autograd(rows: usize, cols: usize, seed: u64) -> Result<GradientCheck> {
        ensure!(rows > 0 && cols > 0, "tensor shape must be non-empty");
        TrainBackend::seed(seed);
        let device = default_device();
        let x = Tensor::<TrainBackend, 2>::random([rows, cols], Distribution::Normal(0.0, 1.0), &device);
        square_mean_gradient(x)
    }

    pub fn step(cfg: &StepConfig) -> Result<StepReport> {
        Self::step_with(cfg, &MnistSource::new(Some(cfg.batch_size)))
    }

    pub fn step_with(cfg: &StepConfig, source: &dyn ImageSource) -> Result<StepReport> {
        ensure!(cfg.batch_size > 0, "batch_size must be positive");
        ensure!(
            cfg.hidden_sizes.iter().all(|&h| h > 0),
            "hidden layer sizes must be positive: {:?}",
            cfg.hidden_sizes
        );
        ensure!(
            cfg.learning_rate > 0.0 && cfg.learning_rate.is_finite(),
            "learning_rate must be a positive number, got {}",
            cfg.learning_rate
        );

        let raw = source.load(Split::Train)?;
        let samples: Vec<_> = Normalizer::default()
            .apply_all(&raw)
            .into_iter()
            .filter(|s| s.is_valid())
            .take(cfg.batch_size)
            .collect();
        ensure!(!samples.is_empty(), "no usable training images");

        TrainBackend::seed(cfg.seed);
        let device = default_device();
        let model: Classifier<TrainBackend> =
            ClassifierConfig::new(NUM_PIXELS, NUM_CLASSES)
                .with_hidden_sizes(cfg.hidden_sizes.clone())
                .with_activation(cfg.activation)
                .init(&device);
        let batch = ImageBatcher::<TrainBackend>::new(device).batch(samples);

        let (_model, report) = single_step(model, batch, cfg.loss, cfg.learning_rate)?;
        Ok(report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::RawImage;

    struct Digits;

    impl ImageSource for Digits {
        fn load(&self, _split: Split) -> Result<Vec<RawImage>> {
            Ok((0..6u8).map(|d| RawImage::new(vec![d as f32 * 40.0; NUM_PIXELS], d)).collect())
        }
    }

    #[test]
    fn test_autograd_walkthrough() {
        let check = WalkthroughUseCase::autograd(2, 3, 7).unwrap();
        assert_eq!(check.input.len(), 6);
        assert!(check.max_error() < 1e-5);
        assert!(WalkthroughUseCase::autograd(0, 3, 7).is_err());
    }

    fn step_config() -> StepConfig {
        StepConfig {
            hidden_sizes:  vec![4],
            activation:    Activation::Tanh,
            loss:          LossKind::CrossEntropy,
            learning_rate: 0.01,
            batch_size:    3,
            seed:          1,
        }
    }

    #[test]
    fn test_step_walkthrough_uses_batch_size() {
        let report = WalkthroughUseCase::step_with(&step_config(), &Digits).unwrap();
        assert_eq!(report.weight_shape, [NUM_PIXELS, 4]);
        assert!(report.mean_update() > 0.0);
    }

    #[test]
    fn test_step_rejects_zero_width_layer() {
        let cfg = StepConfig { hidden_sizes: vec![0], ..step_config() };
        assert!(WalkthroughUseCase::step_with(&cfg, &Digits).is_err());
    }

    #[test]
    fn test_step_rejects_bad_learning_rate() {
        for lr in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let cfg = StepConfig { learning_rate: lr, ..step_config() };
            assert!(WalkthroughUseCase::step_with(&cfg, &Digits).is_err(), "lr {lr}");
        }
    }
}
