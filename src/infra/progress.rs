// ============================================================
// Layer 6 — Progress Bars
// ============================================================
// Per-epoch batch progress for training and evaluation.
// Bars draw to stderr so the one-line epoch summaries on
// stdout stay clean; indicatif hides them when stderr is
// not a terminal.

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{prefix:>12} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}";

/// Bar over `total` batches labelled with `prefix`.
pub fn batch_bar(total: usize, prefix: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new(total.max(1) as u64);
    pb.set_style(
        ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_prefix(prefix.into());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_length_never_zero() {
        assert_eq!(batch_bar(0, "train").length(), Some(1));
        assert_eq!(batch_bar(7, "eval").length(), Some(7));
    }
}
