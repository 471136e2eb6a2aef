// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what the system is
// about: labelled questions and something that classifies them.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// A labelled training example and its label enum
pub mod example;

// Core abstractions (traits) that other layers implement
pub mod traits;
