// ============================================================
// Layer 4 — Parse Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<ParseSample>
// into tensors for the generator.
//
// How batching works here:
//   Input:  Vec of N ParseSamples, sources of width S, targets of width T
//   Output: ParseBatch with
//             source [N, S]
//             labels [N, T-1]   — target without the <s> column
//             mask   [N, S]     — true where source is padding
//
// The mask is built here, and only here, so training,
// evaluation and inference all share one convention:
// true = padding = excluded from attention.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ParseSample;

/// A batch ready for `Generator::generate`.
#[derive(Debug, Clone)]
pub struct ParseBatch<B: Backend> {
    /// Question ids — shape: [batch_size, source_len]
    pub source: Tensor<B, 2, Int>,

    /// Expected outputs, one per decode step — shape: [batch_size, target_len - 1]
    pub labels: Tensor<B, 2, Int>,

    /// Padding positions of `source` — shape: [batch_size, source_len]
    pub mask: Tensor<B, 2, Bool>,
}

// ─── ParseBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device and the source padding id used to
/// build the attention mask.
#[derive(Clone, Debug)]
pub struct ParseBatcher<B: Backend> {
    pub device:     B::Device,
    pub source_pad: u32,
}

impl<B: Backend> ParseBatcher<B> {
    pub fn new(device: B::Device, source_pad: u32) -> Self {
        Self { device, source_pad }
    }

    /// Build a batch from already-padded id rows.
    ///
    /// # Panics
    /// If rows are ragged or the target is narrower than 2.
    pub fn from_rows(&self, sources: &[Vec<u32>], targets: &[Vec<u32>]) -> ParseBatch<B> {
        let batch_size = sources.len();
        assert_eq!(targets.len(), batch_size, "source and target row counts differ");
        let source_len = sources.first().map_or(0, Vec::len);
        let target_len = targets.first().map_or(0, Vec::len);
        assert!(target_len >= 2, "target rows need <s> plus at least one label");

        let source_flat = flatten(sources, source_len);
        let target_flat = flatten(targets, target_len);

        let source = Tensor::<B, 1, Int>::from_ints(source_flat.as_slice(), &self.device)
            .reshape([batch_size, source_len]);
        let target = Tensor::<B, 1, Int>::from_ints(target_flat.as_slice(), &self.device)
            .reshape([batch_size, target_len]);

        // Drop the <s> column: label t is what step t should emit
        let labels = target.slice([0..batch_size, 1..target_len]);
        let mask   = source.clone().equal_elem(self.source_pad as i64);

        ParseBatch { source, labels, mask }
    }
}

fn flatten(rows: &[Vec<u32>], width: usize) -> Vec<i32> {
    rows.iter()
        .flat_map(|row| {
            assert_eq!(row.len(), width, "all rows in a batch must be padded to the same width");
            row.iter().map(|&id| id as i32)
        })
        .collect()
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
impl<B: Backend> Batcher<ParseSample, ParseBatch<B>> for ParseBatcher<B> {
    fn batch(&self, items: Vec<ParseSample>) -> ParseBatch<B> {
        let (sources, targets): (Vec<Vec<u32>>, Vec<Vec<u32>>) = items
            .into_iter()
            .map(|s| (s.source_ids, s.target_ids))
            .unzip();
        self.from_rows(&sources, &targets)
    }
}
