// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model, loss and optimizer code lives here.
//
//   backend.rs    — which Burn backend runs the tensors
//                   (NdArray on CPU, or Wgpu with the `wgpu` feature)
//
//   model.rs      — the feed-forward classifier
//                   784 → hidden... → 10, activation between layers
//
//   loss.rs       — cross entropy on logits, or negative
//                   log likelihood on log-softmax output
//
//   trainer.rs    — the training loop: forward pass, loss,
//                   backward pass, optimiser step, validation
//                   and a checkpoint per epoch
//
//   inferencer.rs — loads a checkpoint, predicts class
//                   probabilities, evaluates a dataset
//
//   autograd.rs   — small walkthroughs of what backward()
//                   and one optimiser step actually do

use anyhow::Result;
use burn::prelude::*;

/// Backend type aliases and device selection
pub mod backend;

/// Feed-forward classifier architecture
pub mod model;

/// Loss criteria
pub mod loss;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference and evaluation from a saved checkpoint
pub mod inferencer;

/// Gradient and single-step walkthroughs
pub mod autograd;

/// Copy a tensor's values out as f32, whatever the backend's float type.
pub fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("cannot read tensor data: {e:?}"))
}
