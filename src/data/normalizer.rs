// ============================================================
// Layer 4 — Pixel Normalizer
// ============================================================
// Turns raw intensities into the values the network sees.
//
// Two steps applied per pixel:
//   1. Scale 0..=255 down to 0.0..=1.0
//   2. Centre and scale:  x' = (x - mean) / std
//
// With the defaults mean = 0.5 and std = 0.5 every pixel ends
// up in [-1, 1]:
//   0   → (0.0 - 0.5) / 0.5 = -1.0
//   255 → (1.0 - 0.5) / 0.5 =  1.0

use anyhow::{ensure, Result};

use crate::domain::image::{ImageSample, RawImage};

const MAX_INTENSITY: f32 = 255.0;

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    mean: f32,
    std:  f32,
}

impl Normalizer {
    /// Create a normalizer. `std` must be strictly positive.
    pub fn new(mean: f32, std: f32) -> Result<Self> {
        ensure!(std > 0.0, "normalisation std must be positive, got {std}");
        Ok(Self { mean, std })
    }

    /// Normalise a single raw intensity.
    pub fn normalize_pixel(&self, value: f32) -> f32 {
        (value / MAX_INTENSITY - self.mean) / self.std
    }

    /// Normalise every pixel of a raw image, keeping its label.
    pub fn apply(&self, image: &RawImage) -> ImageSample {
        let pixels = image
            .pixels
            .iter()
            .map(|&p| self.normalize_pixel(p))
            .collect();
        ImageSample::new(pixels, image.label)
    }

    /// Normalise a whole collection.
    pub fn apply_all(&self, images: &[RawImage]) -> Vec<ImageSample> {
        images.iter().map(|img| self.apply(img)).collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self { mean: 0.5, std: 0.5 }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_maps_to_unit_range() {
        let n = Normalizer::default();
        assert_eq!(n.normalize_pixel(0.0), -1.0);
        assert_eq!(n.normalize_pixel(255.0), 1.0);
        assert!(n.normalize_pixel(127.5).abs() < 1e-6);
    }

    #[test]
    fn test_custom_mean_std() {
        // MNIST statistics
        let n = Normalizer::new(0.1307, 0.3081).unwrap();
        let v = n.normalize_pixel(0.0);
        assert!((v - (-0.1307 / 0.3081)).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_non_positive_std() {
        assert!(Normalizer::new(0.5, 0.0).is_err());
        assert!(Normalizer::new(0.5, -1.0).is_err());
    }

    #[test]
    fn test_apply_keeps_label_and_length() {
        let raw    = RawImage::new(vec![0.0, 255.0, 51.0], 7);
        let sample = Normalizer::default().apply(&raw);
        assert_eq!(sample.label, 7);
        assert_eq!(sample.pixels.len(), 3);
        assert_eq!(sample.pixels[1], 1.0);
    }
}
