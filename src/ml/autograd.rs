// ============================================================
// Layer 5 — Autograd Walkthroughs
// ============================================================
// Two small, inspectable experiments with Burn's autodiff:
//
//   square_mean_gradient
//     z = mean(x²)  →  dz/dx = 2x / n
//     Shows that backward() fills in gradients for every tensor
//     marked with require_grad().
//
//   single_step
//     One batch through the classifier, one backward pass and
//     one plain SGD step, with the first layer's weights
//     captured before and after:
//       after = before - lr * grad

use anyhow::{Context, Result};
use burn::{
    optim::{GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::ImageBatch;
use crate::ml::loss::LossKind;
use crate::ml::model::Classifier;
use crate::ml::tensor_to_vec;

/// Values from the `z = mean(x²)` experiment.
#[derive(Debug, Clone)]
pub struct GradientCheck {
    pub input:    Vec<f32>,
    pub output:   f32,
    pub gradient: Vec<f32>,
}

impl GradientCheck {
    /// The closed-form gradient 2x / n.
    pub fn analytic_gradient(&self) -> Vec<f32> {
        let n = self.input.len() as f32;
        self.input.iter().map(|x| 2.0 * x / n).collect()
    }

    /// Largest absolute difference between autograd and the closed form.
    pub fn max_error(&self) -> f32 {
        self.gradient
            .iter()
            .zip(self.analytic_gradient())
            .map(|(g, a)| (g - a).abs())
            .fold(0.0, f32::max)
    }
}

pub fn square_mean_gradient<B: AutodiffBackend, const D: usize>(x: Tensor<B, D>) -> Result<GradientCheck> {
    let x = x.require_grad();
    let y = x.clone().powf_scalar(2.0);
    let z = y.mean();

    let output: f32 = z.clone().into_scalar().elem::<f32>();
    let grads = z.backward();
    let gradient = x
        .grad(&grads)
        .context("input tensor received no gradient")?;

    Ok(GradientCheck {
        input:    tensor_to_vec(x.inner())?,
        output,
        gradient: tensor_to_vec(gradient)?,
    })
}

/// First-layer weights around a single optimiser step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub loss:          f64,
    pub learning_rate: f64,
    /// Shape of the first layer's weight matrix, [inputs, outputs]
    pub weight_shape:  [usize; 2],
    pub weight_before: Vec<f32>,
    pub gradient:      Vec<f32>,
    pub weight_after:  Vec<f32>,
}

impl StepReport {
    /// Mean absolute change applied to the weights by the step.
    pub fn mean_update(&self) -> f32 {
        if self.weight_before.is_empty() {
            return 0.0;
        }
        let total: f32 = self
            .weight_before
            .iter()
            .zip(&self.weight_after)
            .map(|(b, a)| (a - b).abs())
            .sum();
        total / self.weight_before.len() as f32
    }
}

pub fn single_step<B: AutodiffBackend>(
    model:         Classifier<B>,
    batch:         ImageBatch<B>,
    loss:          LossKind,
    learning_rate: f64,
) -> Result<(Classifier<B>, StepReport)> {
    let first = model.layers.first().context("model has no layers")?;
    let weight_shape  = first.weight.val().dims();
    let weight_before = tensor_to_vec(first.weight.val().inner())?;

    let logits = model.forward(batch.images);
    let loss   = loss.forward(logits, batch.targets);
    let loss_value: f64 = loss.clone().into_scalar().elem::<f64>();

    let grads = loss.backward();
    let gradient = model.layers[0]
        .weight
        .val()
        .grad(&grads)
        .context("first layer weights received no gradient")?;
    let gradient = tensor_to_vec(gradient)?;

    let grads = GradientsParams::from_grads(grads, &model);
    let mut optim = SgdConfig::new().init::<B, Classifier<B>>();
    let model = optim.step(learning_rate, model, grads);

    let weight_after = tensor_to_vec(model.layers[0].weight.val().inner())?;

    let report = StepReport {
        loss: loss_value,
        learning_rate,
        weight_shape,
        weight_before,
        gradient,
        weight_after,
    };
    Ok((model, report))
}
