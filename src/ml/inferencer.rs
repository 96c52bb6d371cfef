// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    prelude::*,
};

use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::ImageDataset,
};
use crate::domain::image::{ImageSample, NUM_CLASSES, NUM_PIXELS};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{default_device, InferBackend, InferDevice};
use crate::ml::loss::LossKind;
use crate::ml::model::Classifier;
use crate::ml::tensor_to_vec;

/// Class probabilities for one image.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
    pub class:         usize,
    pub confidence:    f32,
}

impl Prediction {
    pub fn from_probabilities(probabilities: Vec<f32>) -> Self {
        let (class, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, p)| if p > best.1 { (i, p) } else { best });
        Self { probabilities, class, confidence }
    }

    /// The `k` most likely classes, most likely first.
    pub fn top_k(&self, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self.probabilities.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }
}

/// Aggregate loss and accuracy over a set of batches.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub loss:          f64,
    pub correct:       usize,
    pub total:         usize,
    pub class_correct: [usize; NUM_CLASSES],
    pub class_total:   [usize; NUM_CLASSES],
}

impl EvaluationReport {
    pub fn accuracy(&self) -> f64 {
        if self.total > 0 { self.correct as f64 / self.total as f64 } else { 0.0 }
    }

    /// Accuracy for one class, None when the class never appeared.
    pub fn class_accuracy(&self, class: usize) -> Option<f64> {
        match self.class_total.get(class) {
            Some(&n) if n > 0 => Some(self.class_correct[class] as f64 / n as f64),
            _ => None,
        }
    }
}

/// Run the model over every batch without tracking gradients.
///
/// The loss is the mean of per-batch losses; NaN when there are no batches.
pub fn evaluate_batches<B: Backend>(
    model:   &Classifier<B>,
    batches: impl Iterator<Item = ImageBatch<B>>,
    loss:    LossKind,
) -> Result<EvaluationReport> {
    let mut loss_sum      = 0.0f64;
    let mut batch_count   = 0usize;
    let mut correct       = 0usize;
    let mut total         = 0usize;
    let mut class_correct = [0usize; NUM_CLASSES];
    let mut class_total   = [0usize; NUM_CLASSES];

    for batch in batches {
        let logits = model.forward(batch.images);

        let batch_loss: f64 = loss
            .forward(logits.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();
        loss_sum    += batch_loss;
        batch_count += 1;

        // argmax(1) returns shape [batch, 1] — flatten to [batch]
        let predicted = logits.argmax(1).flatten::<1>(0, 1);
        let predicted = int_tensor_to_vec(predicted)?;
        let expected  = int_tensor_to_vec(batch.targets)?;

        for (p, t) in predicted.iter().zip(&expected) {
            let t = *t as usize;
            total += 1;
            if t < NUM_CLASSES {
                class_total[t] += 1;
            }
            if *p as usize == t {
                correct += 1;
                if t < NUM_CLASSES {
                    class_correct[t] += 1;
                }
            }
        }
    }

    let loss = if batch_count > 0 { loss_sum / batch_count as f64 } else { f64::NAN };
    Ok(EvaluationReport { loss, correct, total, class_correct, class_total })
}

fn int_tensor_to_vec<B: Backend>(tensor: Tensor<B, 1, Int>) -> Result<Vec<i64>> {
    tensor
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow::anyhow!("cannot read class indices: {e:?}"))
}

/// A trained classifier restored from disk.
pub struct Inferencer {
    model:      Classifier<InferBackend>,
    loss:       LossKind,
    batch_size: usize,
    device:     InferDevice,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = default_device();
        let cfg    = ckpt_manager.load_config()?;
        let model: Classifier<InferBackend> = cfg.model_config().init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint ({} parameters)", model.num_params());
        Ok(Self { model, loss: cfg.loss, batch_size: cfg.batch_size, device })
    }

    /// Class probabilities for a single normalised image.
    pub fn predict(&self, sample: &ImageSample) -> Result<Prediction> {
        anyhow::ensure!(
            sample.pixels.len() == NUM_PIXELS,
            "expected {} pixels, got {}",
            NUM_PIXELS,
            sample.pixels.len()
        );
        let image = Tensor::<InferBackend, 2>::from_data(
            TensorData::new(sample.pixels.clone(), [1, NUM_PIXELS])
                .convert::<<InferBackend as Backend>::FloatElem>(),
            &self.device,
        );
        let probabilities = tensor_to_vec(self.model.probabilities(image))?;
        Ok(Prediction::from_probabilities(probabilities))
    }

    /// Loss, accuracy and per-class accuracy over a whole dataset.
    pub fn evaluate(&self, dataset: ImageDataset) -> Result<EvaluationReport> {
        let batcher = ImageBatcher::<InferBackend>::new(self.device.clone());
        let loader  = DataLoaderBuilder::new(batcher)
            .batch_size(self.batch_size)
            .build(dataset);
        evaluate_batches(&self.model, loader.iter(), self.loss)
    }
}
