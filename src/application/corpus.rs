// ============================================================
// Layer 2 — Corpus Preparation
// ============================================================
// Shared by `train` and `evaluate`, which must see exactly the
// same split:
//
//   load corpus → seeded split → (after vocab build) encode + pad
//
// `evaluate` and `translate` also check that the vocabulary files
// on disk still belong to the run that wrote the manifest.

use anyhow::Result;

use crate::application::train_use_case::RunManifest;
use crate::data::{
    dataset::{pad, ParseSample, SequenceLengths},
    loader::JobQueryLoader,
    splitter::split_holdout,
};
use crate::domain::{job_query::JobQuery, traits::CorpusSource};
use crate::infra::vocab_store::Vocabularies;

/// Load the corpus file and hold out `test_size` examples.
pub fn load_and_split(corpus_path: &str, test_size: usize, seed: u64) -> Result<(Vec<JobQuery>, Vec<JobQuery>)> {
    let examples = JobQueryLoader::new(corpus_path).load_all()?;
    if examples.is_empty() {
        anyhow::bail!("Corpus '{}' contains no usable examples", corpus_path);
    }

    let (train, test) = split_holdout(examples, test_size, seed);
    tracing::info!("Split: {} train, {} test", train.len(), test.len());
    Ok((train, test))
}

/// Reject vocabularies whose reserved ids or sizes differ from the
/// ones the checkpoint was trained with.
pub fn ensure_vocab_matches(vocabs: &Vocabularies, manifest: &RunManifest) -> Result<()> {
    let same = vocabs.special_tokens()? == manifest.tokens
        && vocabs.source.len() == manifest.source_vocab_size
        && vocabs.target.len() == manifest.target_vocab_size;
    if !same {
        anyhow::bail!("Vocabulary files do not match the run manifest. Retrain or restore the checkpoint directory.");
    }
    Ok(())
}

/// Map tokens to ids and pad both sides to the run's widths.
pub fn encode_examples(
    examples: &[JobQuery],
    vocabs:   &Vocabularies,
    lengths:  &SequenceLengths,
) -> Vec<ParseSample> {
    examples
        .iter()
        .map(|q| ParseSample {
            source_ids: pad(&vocabs.source.encode(&q.words), lengths.source_len, vocabs.source.pad_id()),
            target_ids: pad(&vocabs.target.encode(&q.query), lengths.target_len, vocabs.target.pad_id()),
        })
        .collect()
}
