// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw corpus file to tensor batches.
//
// The pipeline flows in this order:
//
//   corpus file
//       │
//       ▼
//   JobQueryLoader    → parses parse([...],form). lines
//       │
//       ▼
//   Preprocessor      → tokenises forms, reverses questions
//       │
//       ▼
//   split_holdout     → seeded train / test split
//       │
//       ▼
//   Vocabulary        → tokens → ids            (Layer 6)
//       │
//       ▼
//   ParseDataset      → padded id rows, Burn's Dataset trait
//       │
//       ▼
//   ParseBatcher      → [batch, len] tensors + padding mask
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the Jobs corpus file
pub mod loader;

/// Query tokenisation and question ordering
pub mod preprocessor;

/// Padded samples and Burn's Dataset trait
pub mod dataset;

/// Burn's Batcher trait: samples → tensors + mask
pub mod batcher;

/// Seeded train/test split
pub mod splitter;
