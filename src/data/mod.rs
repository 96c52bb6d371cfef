// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw dataset and batch tensors:
//
//   MnistSource       → burn's MNIST download, flattened to RawImage
//       │
//       ▼
//   Normalizer        → x' = (x / 255 - mean) / std
//       │
//       ▼
//   split_train_val   → seeded shuffle, train / validation
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks samples into [N, 784] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop

/// Reads labelled images through burn's vision datasets
pub mod loader;

/// Scales and centres raw pixel intensities
pub mod normalizer;

/// Implements Burn's Dataset trait for image samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
