// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   checkpoint.rs  — Saving and loading model weights with
//                    Burn's CompactRecorder, plus the run
//                    manifest (config, reserved ids, widths)
//                    so evaluation and inference can rebuild
//                    the model.
//
//   vocab_store.rs — Source and target vocabularies, stored
//                    as WordLevel tokenizer JSON so training,
//                    evaluation and inference share ids.
//
//   metrics.rs     — Per-epoch loss and accuracy written to
//                    a CSV file.
//
//   progress.rs    — Batch progress bars (indicatif).
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint and run manifest persistence
pub mod checkpoint;

/// Vocabulary building, saving, and loading
pub mod vocab_store;

/// Training metrics CSV logger
pub mod metrics;

/// Batch progress bars
pub mod progress;
