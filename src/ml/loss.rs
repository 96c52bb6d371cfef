// ============================================================
// Layer 5 — Loss Criteria
// ============================================================
// Two equivalent ways of scoring a batch of logits against
// the true classes:
//
//   CrossEntropy            — takes raw logits directly
//   NegativeLogLikelihood   — takes log-softmax output and
//                             averages -log p[target]
//
//   CE(logits, y) = NLL(log_softmax(logits), y)
//
// so both criteria produce the same number for the same model;
// the choice only changes where the softmax lives.

use std::{fmt, str::FromStr};

use burn::{
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
    tensor::activation::log_softmax,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LossKind {
    CrossEntropy,
    NegativeLogLikelihood,
}

impl LossKind {
    /// logits: [batch, classes], targets: [batch] → scalar loss [1]
    pub fn forward<B: Backend>(&self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        match self {
            LossKind::CrossEntropy => CrossEntropyLossConfig::new()
                .init(&logits.device())
                .forward(logits, targets),
            LossKind::NegativeLogLikelihood => nll_loss(log_softmax(logits, 1), targets),
        }
    }
}

/// Mean of `-log_probs[i, targets[i]]` over the batch.
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    log_probs
        .gather(1, targets.unsqueeze_dim::<2>(1))
        .neg()
        .mean()
}

impl FromStr for LossKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cross-entropy" | "ce" => Ok(LossKind::CrossEntropy),
            "nll" | "negative-log-likelihood" => Ok(LossKind::NegativeLogLikelihood),
            other => anyhow::bail!("unknown loss '{other}' (expected cross-entropy or nll)"),
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossKind::CrossEntropy => f.write_str("cross-entropy"),
            LossKind::NegativeLogLikelihood => f.write_str("nll"),
        }
    }
}
