use burn::data::dataset::Dataset;

use crate::domain::image::{ImageSample, NUM_CLASSES};

/// In-memory collection of normalised samples.
pub struct ImageDataset {
    samples: Vec<ImageSample>,
}

impl ImageDataset {
    /// Build a dataset, dropping samples with the wrong shape or label.
    pub fn new(samples: Vec<ImageSample>) -> Self {
        let total = samples.len();
        let samples: Vec<ImageSample> = samples.into_iter().filter(|s| s.is_valid()).collect();
        if samples.len() != total {
            tracing::warn!("Dropped {} malformed samples", total - samples.len());
        }
        Self { samples }
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Number of samples per class label.
    pub fn class_counts(&self) -> [usize; NUM_CLASSES] {
        let mut counts = [0usize; NUM_CLASSES];
        for s in &self.samples {
            counts[s.label as usize] += 1;
        }
        counts
    }
}

impl Dataset<ImageSample> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::NUM_PIXELS;

    #[test]
    fn test_malformed_samples_are_dropped() {
        let ds = ImageDataset::new(vec![
            ImageSample::new(vec![0.0; NUM_PIXELS], 1),
            ImageSample::new(vec![0.0; 3], 1),
            ImageSample::new(vec![0.0; NUM_PIXELS], 12),
        ]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0).map(|s| s.label), Some(1));
        assert!(ds.get(1).is_none());
    }

    #[test]
    fn test_class_counts() {
        let ds = ImageDataset::new(vec![
            ImageSample::new(vec![0.0; NUM_PIXELS], 3),
            ImageSample::new(vec![0.0; NUM_PIXELS], 3),
            ImageSample::new(vec![0.0; NUM_PIXELS], 0),
        ]);
        let counts = ds.class_counts();
        assert_eq!(counts[3], 2);
        assert_eq!(counts[0], 1);
        assert_eq!(counts.iter().sum::<usize>(), 3);
    }
}
