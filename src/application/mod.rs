// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// user-facing goal (train, evaluate, translate).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Corpus loading and encoding shared by train and evaluate
pub mod corpus;

// The training workflow
pub mod train_use_case;

// Held-out scoring of a saved checkpoint
pub mod evaluate_use_case;

// Single-question translation
pub mod translate_use_case;
