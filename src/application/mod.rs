// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each.
//
// Rules for this layer:
//   - No model or tensor code here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

// Training from scratch and saving checkpoints
pub mod train_use_case;

// Test-set loss and accuracy of a checkpoint
pub mod evaluate_use_case;

// Class probabilities for a single test image
pub mod predict_use_case;

// Autograd and single-step demonstrations
pub mod walkthrough_use_case;
