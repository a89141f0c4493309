// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Greedy translation of a single question.
//
//   words (encoder order) → source ids → pad to source_len
//   labels = one all-<PAD> row (no reference exists, so the
//            loss is meaningless and ignored)
//   greedy generate → truncate after </s> → query tokens
//
// The batch is built with the same ParseBatcher as training,
// so the padding mask follows the same convention.

use anyhow::Result;
use burn::prelude::*;

use crate::application::corpus::ensure_vocab_matches;
use crate::data::{batcher::ParseBatcher, dataset::{pad, SequenceLengths}};
use crate::infra::{checkpoint::CheckpointManager, vocab_store::Vocabularies};
use crate::ml::accuracy::truncate_after_eos;
use crate::ml::evaluator::to_rows;
use crate::ml::generator::{DecodeMode, Generator};
use crate::ml::model::Seq2Seq;

pub type InferBackend = burn::backend::Wgpu;

pub struct Inferencer<B: Backend> {
    model:     Seq2Seq<B>,
    vocabs:    Vocabularies,
    generator: Generator,
    lengths:   SequenceLengths,
    batcher:   ParseBatcher<B>,
}

impl Inferencer<InferBackend> {
    /// Rebuild the trained model from the checkpoint directory.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, vocabs: Vocabularies) -> Result<Self> {
        let device   = burn::backend::wgpu::WgpuDevice::default();
        let manifest = ckpt_manager.load_manifest()?;

        ensure_vocab_matches(&vocabs, &manifest)?;

        let model: Seq2Seq<InferBackend> = manifest.model_config().init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Self::new(model, vocabs, manifest.lengths, device)
    }
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: Seq2Seq<B>, vocabs: Vocabularies, lengths: SequenceLengths, device: B::Device) -> Result<Self> {
        let tokens = vocabs.special_tokens()?;
        Ok(Self {
            model,
            generator: Generator::new(tokens, lengths.horizon(), DecodeMode::Greedy),
            batcher:   ParseBatcher::new(device, tokens.source_pad),
            vocabs,
            lengths,
        })
    }

    /// Predicted query ids for one encoded question, cut after </s>.
    pub fn predict_ids(&self, source_ids: &[u32]) -> Vec<u32> {
        let tokens = self.generator.tokens();
        let source = pad(source_ids, self.lengths.source_len, tokens.source_pad);
        let target = vec![tokens.target_pad; self.lengths.target_len];

        let batch = self.batcher.from_rows(&[source], &[target]);
        let out   = self.generator.generate(&self.model, batch.source, batch.labels, batch.mask);

        let mut row = out.predictions
            .map(to_rows)
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or_default();
        truncate_after_eos(&mut row, tokens.target_eos, tokens.target_pad);

        tracing::debug!("Decoded {} steps: {:?}", out.steps, row);
        row
    }

    /// Question words in encoder order → query tokens.
    pub fn translate_words(&self, words: &[String]) -> Vec<String> {
        let source_ids = self.vocabs.source.encode(words);
        let unknown = source_ids.iter().filter(|&&id| id == self.vocabs.source.unk_id()).count();
        if unknown > 0 {
            tracing::debug!("{} of {} question words are out of vocabulary", unknown, words.len());
        }
        self.vocabs.target.decode(&self.predict_ids(&source_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job_query::{JobQuery, EOS_TOKEN, PAD_TOKEN};
    use crate::ml::model::Seq2SeqConfig;
    use burn::backend::NdArray;

    type B = NdArray;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn inferencer() -> Inferencer<B> {
        let train = vec![
            JobQuery::new(toks("java use jobs what"), toks("<s> answer ( a , job ( a ) ) </s>")),
            JobQuery::new(toks("austin in jobs"), toks("<s> answer ( a , loc ( a , austin ) ) </s>")),
        ];
        let vocabs  = Vocabularies::build(&train, 1).unwrap();
        let lengths = SequenceLengths::from_examples(&train, 1.5);
        let device  = Default::default();
        let model   = Seq2SeqConfig::new(vocabs.source.len(), vocabs.target.len(), 6, 8, 0.0)
            .init::<B>(&device);
        Inferencer::new(model, vocabs, lengths, device).unwrap()
    }

    #[test]
    fn test_prediction_fits_horizon_and_ends_cleanly() {
        let inf = inferencer();
        let ids = inf.predict_ids(&[0, 1, 2]);
        let tokens = inf.vocabs.special_tokens().unwrap();

        assert!(!ids.is_empty());
        assert!(ids.len() <= inf.lengths.horizon());
        // After the first </s> only padding may follow
        if let Some(pos) = ids.iter().position(|&id| id == tokens.target_eos) {
            assert!(ids[pos + 1..].iter().all(|&id| id == tokens.target_pad));
        }
    }

    #[test]
    fn test_unknown_and_overlong_questions_still_decode() {
        let inf   = inferencer();
        let words = toks("zzz qqq xxx yyy www vvv uuu ttt");
        let out   = inf.translate_words(&words);
        assert!(!out.is_empty());
        let eos = out.iter().position(|t| t == EOS_TOKEN);
        if let Some(pos) = eos {
            assert!(out[pos + 1..].iter().all(|t| t == PAD_TOKEN));
        }
    }

    #[test]
    fn test_same_question_same_answer() {
        let inf = inferencer();
        assert_eq!(inf.predict_ids(&[3, 1]), inf.predict_ids(&[3, 1]));
    }
}
