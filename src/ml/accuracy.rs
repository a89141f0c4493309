// ============================================================
// Layer 5 — Token Accuracy
// ============================================================
// Scoring rules for greedy output, applied per batch on the host:
//
//   1. Truncate each prediction after its first </s>
//      (everything after it becomes <PAD>).
//   2. total   += label positions holding a content token
//                 (not <PAD>, <s> or </s>)
//   3. correct += positions where prediction == label and the
//                 label is not <PAD>
//      (labels are cut to the prediction length first)
//
// Batches are combined by summing counts, not by averaging
// per-batch ratios, so small final batches are not over-weighted.
//
// Example:
//   predicted [4, 4, 9, 4, 4], </s> = 9, <PAD> = 0
//   truncated [4, 4, 9, 0, 0]

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::domain::special_tokens::SpecialTokens;

/// Running correct / total counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccuracy {
    pub correct: usize,
    pub total:   usize,
}

impl TokenAccuracy {
    pub fn new(correct: usize, total: usize) -> Self {
        Self { correct, total }
    }

    /// correct / total, or 0.0 when nothing was scored.
    pub fn value(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

impl AddAssign for TokenAccuracy {
    fn add_assign(&mut self, rhs: Self) {
        self.correct += rhs.correct;
        self.total   += rhs.total;
    }
}

/// Overwrite everything after the first `eos` with `pad`.
/// Sequences without `eos` are left untouched.
pub fn truncate_after_eos(row: &mut [u32], eos: u32, pad: u32) {
    if let Some(pos) = row.iter().position(|&id| id == eos) {
        row[pos + 1..].fill(pad);
    }
}

/// Score one batch. `predictions` must already be truncated.
pub fn score_batch(
    predictions: &[Vec<u32>],
    labels:      &[Vec<u32>],
    tokens:      &SpecialTokens,
) -> TokenAccuracy {
    predictions
        .iter()
        .zip(labels)
        .fold(TokenAccuracy::default(), |mut acc, (pred, label)| {
            acc += score_sequence(pred, label, tokens);
            acc
        })
}

fn score_sequence(pred: &[u32], label: &[u32], tokens: &SpecialTokens) -> TokenAccuracy {
    let total = label.iter().filter(|&&id| tokens.is_content(id)).count();

    // zip stops at the shorter side, which cuts the label to the
    // prediction length
    let correct = pred
        .iter()
        .zip(label)
        .filter(|&(p, l)| p == l && *l != tokens.target_pad)
        .count();

    TokenAccuracy::new(correct, total)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> SpecialTokens {
        SpecialTokens {
            source_pad: 20, source_unk: 19,
            target_sos: 1, target_eos: 9, target_pad: 0, target_unk: 2,
        }
    }

    #[test]
    fn test_truncate_after_first_eos() {
        let mut row = vec![4, 4, 9, 4, 4];
        truncate_after_eos(&mut row, 9, 0);
        assert_eq!(row, vec![4, 4, 9, 0, 0]);

        // Only the first occurrence matters
        let mut row = vec![9, 3, 9, 3];
        truncate_after_eos(&mut row, 9, 0);
        assert_eq!(row, vec![9, 0, 0, 0]);
    }

    #[test]
    fn test_no_eos_means_no_truncation() {
        let mut row = vec![4, 5, 6];
        truncate_after_eos(&mut row, 9, 0);
        assert_eq!(row, vec![4, 5, 6]);
    }

    #[test]
    fn test_eos_in_last_position() {
        let mut row = vec![4, 5, 9];
        truncate_after_eos(&mut row, 9, 0);
        assert_eq!(row, vec![4, 5, 9]);
    }

    #[test]
    fn test_total_counts_only_content_tokens() {
        let label = vec![vec![4, 5, 6, 9, 0, 0]];
        let pred  = vec![vec![4, 7, 6, 9, 0, 0]];
        let acc = score_batch(&pred, &label, &tokens());
        assert_eq!(acc.total, 3);
        // 4 and 6 match; the matching </s> also counts, padding never does
        assert_eq!(acc.correct, 3);
    }

    #[test]
    fn test_label_cut_to_prediction_length() {
        let label = vec![vec![4, 5, 6, 7, 9, 0]];
        let pred  = vec![vec![4, 5]];
        let acc = score_batch(&pred, &label, &tokens());
        assert_eq!(acc, TokenAccuracy::new(2, 4));
    }

    #[test]
    fn test_aggregate_is_pooled_not_averaged() {
        let mut acc = TokenAccuracy::new(3, 5);
        acc += TokenAccuracy::new(2, 3);
        assert_eq!(acc, TokenAccuracy::new(5, 8));
        assert!((acc.value() - 5.0 / 8.0).abs() < 1e-12);

        let mean_of_ratios = (3.0 / 5.0 + 2.0 / 3.0) / 2.0;
        assert!((acc.value() - mean_of_ratios).abs() > 1e-3);
    }

    #[test]
    fn test_empty_accuracy_is_zero() {
        assert_eq!(TokenAccuracy::default().value(), 0.0);
    }
}
