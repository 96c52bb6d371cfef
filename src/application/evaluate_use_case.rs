// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Measures a trained checkpoint on the held-out test split:
//   1. Restore config + weights           (Layer 6 / Layer 5)
//   2. Load and normalise test images     (Layer 4)
//   3. Loss, accuracy, per-class accuracy (Layer 5)

use anyhow::Result;

use crate::data::{dataset::ImageDataset, loader::MnistSource, normalizer::Normalizer};
use crate::domain::traits::{ImageSource, Split};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{EvaluationReport, Inferencer};

pub struct EvaluateUseCase {
    inferencer: Inferencer,
    normalizer: Normalizer,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let ckpt       = CheckpointManager::open(checkpoint_dir)?;
        let normalizer = ckpt.load_config()?.normalizer()?;
        let inferencer = Inferencer::from_checkpoint(&ckpt)?;
        Ok(Self { inferencer, normalizer })
    }

    pub fn execute(&self, limit: Option<usize>) -> Result<EvaluationReport> {
        self.execute_with(&MnistSource::new(limit))
    }

    pub fn execute_with(&self, source: &dyn ImageSource) -> Result<EvaluationReport> {
        let raw     = source.load(Split::Test)?;
        let dataset = ImageDataset::new(self.normalizer.apply_all(&raw));
        tracing::info!("Evaluating on {} test images", dataset.sample_count());
        self.inferencer.evaluate(dataset)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::application::train_use_case::{TrainConfig, TrainUseCase};
    use crate::domain::image::{RawImage, NUM_PIXELS};

    struct FixedSource(usize);

    impl ImageSource for FixedSource {
        fn load(&self, _split: Split) -> Result<Vec<RawImage>> {
            Ok((0..self.0)
                .map(|i| RawImage::new(vec![(i % 3) as f32 * 100.0; NUM_PIXELS], (i % 3) as u8))
                .collect())
        }
    }

    #[test]
    fn test_evaluates_trained_checkpoint() {
        let dir = TempDir::new().unwrap();
        let cfg = TrainConfig {
            checkpoint_dir: dir.path().to_string_lossy().into_owned(),
            hidden_sizes:   vec![8],
            batch_size:     4,
            epochs:         1,
            num_workers:    1,
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg).execute_with(&FixedSource(12)).unwrap();

        let use_case = EvaluateUseCase::new(&dir.path().to_string_lossy()).unwrap();
        let report   = use_case.execute_with(&FixedSource(9)).unwrap();

        assert_eq!(report.total, 9);
        assert!(report.loss.is_finite());
        assert!((0.0..=1.0).contains(&report.accuracy()));
    }

    #[test]
    fn test_missing_checkpoint_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(EvaluateUseCase::new(&dir.path().join("none").to_string_lossy()).is_err());
    }
}
