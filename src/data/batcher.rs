// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<ImageSample>
// into one batch of tensors.
//
// How batching works here:
//   Input:  N samples, each a flat Vec of 784 pixels
//   Output: images  [N, 784]  (float)
//           targets [N]       (int class labels)
//
//   All pixels are concatenated into one long Vec and then
//   given the 2D shape:
//   [s1_p1, ..., s1_p784, s2_p1, ..., sN_p784] → [N, 784]

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::image::{ImageSample, NUM_PIXELS};

// ─── ImageBatch ───────────────────────────────────────────────────────────────
/// A batch of images ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Flattened images — shape: [batch_size, 784]
    pub images: Tensor<B, 2>,

    /// Class labels — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the right CPU/GPU.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ImageSample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageSample>) -> ImageBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|s| s.pixels.iter().copied())
            .collect();

        let labels: Vec<i64> = items
            .iter()
            .map(|s| s.label as i64)
            .collect();

        let images = Tensor::<B, 2>::from_data(
            TensorData::new(pixels, [batch_size, NUM_PIXELS]).convert::<B::FloatElem>(),
            &self.device,
        );

        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]).convert::<B::IntElem>(),
            &self.device,
        );

        ImageBatch { images, targets }
    }
}
