use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::job_query::JobQuery;

/// One encoded and padded example.
/// Both sides are fixed width: `source_len` and `target_len`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSample {
    /// Question ids in encoder order, padded with the source pad id
    pub source_ids: Vec<u32>,
    /// `<s> … </s>` query ids, padded with the target pad id
    pub target_ids: Vec<u32>,
}

/// Fixed sequence widths for one training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceLengths {
    pub source_len: usize,
    pub target_len: usize,
}

impl SequenceLengths {
    /// Source width is the longest training question. Target width
    /// leaves `target_factor` × the longest training query so greedy
    /// decoding has room to run past the reference length.
    pub fn from_examples(train: &[JobQuery], target_factor: f64) -> Self {
        let source_len = train.iter().map(|q| q.words.len()).max().unwrap_or(1).max(1);
        let longest_query = train.iter().map(|q| q.query.len()).max().unwrap_or(2);
        let target_len = ((longest_query as f64 * target_factor) as usize).max(2);
        Self { source_len, target_len }
    }

    /// Decode steps per batch: the target width minus the `<s>`
    /// column, which is input only and never predicted.
    pub fn horizon(&self) -> usize {
        self.target_len - 1
    }
}

/// Truncate to `max_len`, then right-pad with `pad_id`.
pub fn pad(seq: &[u32], max_len: usize, pad_id: u32) -> Vec<u32> {
    let mut out: Vec<u32> = seq.iter().copied().take(max_len).collect();
    out.resize(max_len, pad_id);
    out
}

pub struct ParseDataset {
    samples: Vec<ParseSample>,
}

impl ParseDataset {
    pub fn new(samples: Vec<ParseSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<ParseSample> for ParseDataset {
    fn get(&self, index: usize) -> Option<ParseSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
