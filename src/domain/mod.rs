// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with: images and their labels, and where they come from.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits

// A single labelled image, raw or normalised
pub mod image;

// Core abstractions (traits) that other layers implement
pub mod traits;
