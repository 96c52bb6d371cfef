// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only talks to an ImageSource, so the
// MNIST loader can be replaced by any other provider of
// labelled 28×28 images without touching the use cases.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::image::RawImage;

/// Which partition of a dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    /// Images the model is fitted on (and validated against)
    Train,
    /// Held-out images used only for final evaluation
    Test,
}

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can provide labelled raw images.
///
/// Implementations:
///   - MnistSource → burn's bundled MNIST dataset
pub trait ImageSource {
    /// Load every image of the requested split.
    fn load(&self, split: Split) -> Result<Vec<RawImage>>;
}
