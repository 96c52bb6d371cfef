// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Classifies one test image by index and returns the class
// probabilities alongside the true label.

use anyhow::{Context, Result};

use crate::data::{loader::MnistSource, normalizer::Normalizer};
use crate::domain::traits::{ImageSource, Split};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{Inferencer, Prediction};

pub struct PredictUseCase {
    inferencer: Inferencer,
    normalizer: Normalizer,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let ckpt       = CheckpointManager::open(checkpoint_dir)?;
        let normalizer = ckpt.load_config()?.normalizer()?;
        let inferencer = Inferencer::from_checkpoint(&ckpt)?;
        Ok(Self { inferencer, normalizer })
    }

    /// Predict the test image at `index`; returns (true label, prediction).
    pub fn execute(&self, index: usize) -> Result<(u8, Prediction)> {
        let limit = index
            .checked_add(1)
            .with_context(|| format!("Test image index {index} is out of range"))?;
        self.execute_with(&MnistSource::new(Some(limit)), index)
    }

    pub fn execute_with(&self, source: &dyn ImageSource, index: usize) -> Result<(u8, Prediction)> {
        let images = source.load(Split::Test)?;
        let raw = images
            .get(index)
            .with_context(|| format!("No test image at index {index} ({} available)", images.len()))?;

        let sample     = self.normalizer.apply(raw);
        let prediction = self.inferencer.predict(&sample)?;
        tracing::debug!(
            "Image {} labelled {} predicted {} ({:.3})",
            index, raw.label, prediction.class, prediction.confidence
        );
        Ok((raw.label, prediction))
    }
}
