// ============================================================
// Layer 4 — MNIST Loader
// ============================================================
// Reads MNIST through burn's vision dataset. Downloading,
// caching and IDX parsing all happen inside burn; this loader
// only flattens each 28×28 item into a RawImage.
//
// burn caches the files under ~/.cache/burn-dataset/mnist,
// so only the first run needs network access.

use anyhow::Result;
use burn::data::dataset::{
    vision::{MnistDataset, MnistItem},
    Dataset,
};

use crate::domain::image::RawImage;
use crate::domain::traits::{ImageSource, Split};

/// Loads MNIST digits via burn.
/// Implements the ImageSource trait from Layer 3.
pub struct MnistSource {
    /// Read at most this many images per split (None = all)
    limit: Option<usize>,
}

impl MnistSource {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }
}

impl ImageSource for MnistSource {
    fn load(&self, split: Split) -> Result<Vec<RawImage>> {
        tracing::info!("Loading MNIST {:?} split", split);

        let dataset = match split {
            Split::Train => MnistDataset::train(),
            Split::Test => MnistDataset::test(),
        };

        let take = self.limit.unwrap_or(usize::MAX);
        let images: Vec<RawImage> = dataset.iter().take(take).map(|item| flatten(&item)).collect();

        if images.is_empty() {
            anyhow::bail!("MNIST {:?} split is empty", split);
        }

        tracing::info!("Loaded {} images ({} available)", images.len(), dataset.len());
        Ok(images)
    }
}

/// Flatten a 28×28 MNIST item row by row.
fn flatten(item: &MnistItem) -> RawImage {
    let pixels: Vec<f32> = item.image.iter().flat_map(|row| row.iter().copied()).collect();
    RawImage::new(pixels, item.label)
}
