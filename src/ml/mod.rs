// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// The attention seq2seq model and everything that drives it.
//
//   encoder.rs    — embedding + LSTM over the (reversed,
//                   padded) question; per-position context and
//                   the final (h, c) summary
//
//   decoder.rs    — one decode step: LSTM cell, masked dot
//                   product attention over the context, tanh
//                   combination, projection to target logits
//
//   model.rs      — encoder + decoder as one Burn Module
//
//   generator.rs  — the step loop: teacher forcing or greedy
//                   choice, padding-aware loss, batch-wide
//                   early stop on </s>
//
//   accuracy.rs   — truncation after </s> and pooled token
//                   accuracy
//
//   evaluator.rs  — greedy pass over a held-out loader
//
//   trainer.rs    — epoch loop with AdamW, evaluation,
//                   metrics and checkpoints
//
//   inferencer.rs — single-question translation from a
//                   checkpoint
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Sutskever et al. (2014) Sequence to Sequence Learning
//            Luong et al. (2015) Effective Approaches to
//            Attention-based Neural Machine Translation

/// Question encoder
pub mod encoder;

/// Single-step attention decoder
pub mod decoder;

/// Encoder + decoder module
pub mod model;

/// Step-by-step decode loop
pub mod generator;

/// Token accuracy bookkeeping
pub mod accuracy;

/// Held-out evaluation
pub mod evaluator;

/// Full training loop with evaluation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and translates questions
pub mod inferencer;
