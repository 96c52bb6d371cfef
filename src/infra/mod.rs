// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by the training and
// inference workflows:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's CompactRecorder to serialise
//                   parameters to disk. Also saves/loads
//                   TrainConfig as JSON so inference can
//                   rebuild the same architecture.
//
//   metrics.rs    — Training metrics logging
//                   Appends epoch-level loss and accuracy
//                   to a CSV file for later analysis.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
