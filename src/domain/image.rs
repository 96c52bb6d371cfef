// ============================================================
// Layer 3 — Image Domain Types
// ============================================================
// Two views of the same labelled picture:
//
//   RawImage     — pixel intensities exactly as the source gives
//                  them (0..=255), flattened row-major
//   ImageSample  — the same pixels after normalisation, ready
//                  to be stacked into a batch tensor
//
// A 28×28 image flattens into 784 values:
//   row 0 → pixels[0..28], row 1 → pixels[28..56], ...

use serde::{Deserialize, Serialize};

/// Width and height of every image in pixels
pub const IMAGE_SIDE: usize = 28;

/// Number of values in one flattened image (28 × 28)
pub const NUM_PIXELS: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Number of digit classes (0 through 9)
pub const NUM_CLASSES: usize = 10;

/// An image as loaded from a source, before any normalisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawImage {
    /// Raw intensities in 0..=255, row-major
    pub pixels: Vec<f32>,

    /// The digit shown in the picture
    pub label: u8,
}

impl RawImage {
    pub fn new(pixels: Vec<f32>, label: u8) -> Self {
        Self { pixels, label }
    }
}

/// A normalised image with its class label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSample {
    /// Normalised pixel values, row-major, length NUM_PIXELS
    pub pixels: Vec<f32>,

    /// Target class in 0..NUM_CLASSES
    pub label: u8,
}

impl ImageSample {
    pub fn new(pixels: Vec<f32>, label: u8) -> Self {
        Self { pixels, label }
    }

    /// True when the sample has the expected shape and a known class.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == NUM_PIXELS && (self.label as usize) < NUM_CLASSES
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sample() {
        let s = ImageSample::new(vec![0.0; NUM_PIXELS], 9);
        assert!(s.is_valid());
    }

    #[test]
    fn test_wrong_length_is_invalid() {
        let s = ImageSample::new(vec![0.0; NUM_PIXELS - 1], 3);
        assert!(!s.is_valid());
    }

    #[test]
    fn test_label_out_of_range_is_invalid() {
        let s = ImageSample::new(vec![0.0; NUM_PIXELS], 10);
        assert!(!s.is_valid());
    }
}
