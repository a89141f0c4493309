// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Runs greedy generation over a whole held-out loader and
// scores it with the rules in `ml::accuracy`.
//
// Expects a model on the inner (non-autodiff) backend, i.e. the
// result of `model.valid()`, so dropout is already off for the
// entire pass.
//
// Per batch:
//   1. greedy generate → (loss, predictions [B, steps])
//   2. pull predictions and labels back to the host
//   3. truncate predictions after the first </s>
//   4. add (correct, total) to the running count
//
// The first few (source, prediction) pairs are kept so the
// caller can log what the model actually produces.

use burn::{data::dataloader::DataLoader, prelude::*};
use indicatif::ProgressBar;

use crate::data::batcher::ParseBatch;
use crate::domain::job_query::render_query;
use crate::infra::vocab_store::Vocabularies;
use crate::ml::accuracy::{score_batch, truncate_after_eos, TokenAccuracy};
use crate::ml::generator::{DecodeMode, Generator};
use crate::ml::model::Seq2Seq;

/// How many decoded examples an evaluation keeps for logging.
pub const LOGGED_EXAMPLES: usize = 5;

/// One held-out question with the model's answer, as ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedExample {
    /// Padded source row in encoder order
    pub source:     Vec<u32>,
    /// Prediction truncated after </s>
    pub prediction: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct EvalReport {
    /// Mean greedy loss per batch
    pub loss:     f64,
    pub accuracy: TokenAccuracy,
    pub batches:  usize,
    pub examples: Vec<DecodedExample>,
}

/// Evaluate `model` on every batch of `loader`.
///
/// # Panics
/// If `generator` is not in greedy mode.
pub fn evaluate<B: Backend>(
    model:     &Seq2Seq<B>,
    loader:    &dyn DataLoader<ParseBatch<B>>,
    generator: &Generator,
    progress:  &ProgressBar,
) -> EvalReport {
    assert_eq!(generator.mode(), DecodeMode::Greedy, "evaluation decodes greedily");
    let tokens = *generator.tokens();

    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    let mut accuracy = TokenAccuracy::default();
    let mut examples = Vec::new();

    for batch in loader.iter() {
        let labels  = to_rows(batch.labels.clone());
        let sources = to_rows(batch.source.clone());

        let out = generator.generate(model, batch.source, batch.labels, batch.mask);
        loss_sum += out.loss.into_scalar().elem::<f64>();
        batches  += 1;

        let mut predictions = out.predictions.map(to_rows).unwrap_or_default();
        for row in predictions.iter_mut() {
            truncate_after_eos(row, tokens.target_eos, tokens.target_pad);
        }

        accuracy += score_batch(&predictions, &labels, &tokens);

        let room = LOGGED_EXAMPLES.saturating_sub(examples.len());
        examples.extend(
            sources.into_iter()
                .zip(predictions)
                .take(room)
                .map(|(source, prediction)| DecodedExample { source, prediction }),
        );

        progress.inc(1);
        tracing::debug!("Eval batch {}: {} steps, running accuracy {:.4}", batches, out.steps, accuracy.value());
    }

    let loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
    EvalReport { loss, accuracy, batches, examples }
}

/// Log the kept examples in reading order next to their predicted query.
pub fn log_examples(report: &EvalReport, vocabs: &Vocabularies, source_pad: u32) {
    for ex in &report.examples {
        let mut words: Vec<String> = vocabs.source.decode(
            &ex.source.iter().copied().filter(|&id| id != source_pad).collect::<Vec<_>>(),
        );
        // Sources are stored back to front
        words.reverse();
        let query = render_query(&vocabs.target.decode(&ex.prediction));
        tracing::info!("  {} => {}", words.join(" "), query);
    }
}

/// Host copy of an id matrix, one Vec per row.
pub fn to_rows<B: Backend>(ids: Tensor<B, 2, Int>) -> Vec<Vec<u32>> {
    let [_, width] = ids.dims();
    if width == 0 {
        return Vec::new();
    }
    let flat: Vec<u32> = ids.into_data().iter::<i64>().map(|v| v as u32).collect();
    flat.chunks(width).map(<[u32]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{batcher::ParseBatcher, dataset::{ParseDataset, ParseSample}};
    use crate::domain::special_tokens::SpecialTokens;
    use crate::ml::model::Seq2SeqConfig;
    use burn::{backend::NdArray, data::dataloader::DataLoaderBuilder};

    type B = NdArray;

    const SRC_PAD: u32 = 9;

    fn tokens() -> SpecialTokens {
        SpecialTokens {
            source_pad: SRC_PAD, source_unk: 8,
            target_sos: 0, target_eos: 1, target_pad: 2, target_unk: 3,
        }
    }

    fn dataset() -> ParseDataset {
        ParseDataset::new(vec![
            ParseSample { source_ids: vec![4, 5, 9], target_ids: vec![0, 4, 5, 1, 2, 2] },
            ParseSample { source_ids: vec![6, 9, 9], target_ids: vec![0, 6, 1, 2, 2, 2] },
            ParseSample { source_ids: vec![7, 4, 5], target_ids: vec![0, 5, 4, 6, 1, 2] },
        ])
    }

    #[test]
    fn test_to_rows() {
        let device = Default::default();
        let ids = Tensor::<B, 2, Int>::from_ints([[1, 2, 3], [4, 5, 6]], &device);
        assert_eq!(to_rows(ids), vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn test_evaluate_counts_every_content_label() {
        let device = Default::default();
        let model  = Seq2SeqConfig::new(10, 7, 6, 8, 0.0).init::<B>(&device);
        let loader = DataLoaderBuilder::new(ParseBatcher::<B>::new(device, SRC_PAD))
            .batch_size(2)
            .build(dataset());
        let generator = Generator::new(tokens(), 5, DecodeMode::Greedy);

        let report = evaluate(&model, loader.as_ref(), &generator, &ProgressBar::hidden());

        assert_eq!(report.batches, 2);
        // 2 + 1 + 3 content labels, whatever the untrained model says
        assert_eq!(report.accuracy.total, 6);
        assert!(report.accuracy.correct <= report.accuracy.total);
        assert!(report.loss.is_finite());
        assert_eq!(report.examples.len(), 3);
        assert_eq!(report.examples[1].source, vec![6, 9, 9]);
    }

    #[test]
    #[should_panic]
    fn test_teacher_forced_generator_rejected() {
        let device = Default::default();
        let model  = Seq2SeqConfig::new(10, 7, 6, 8, 0.0).init::<B>(&device);
        let loader = DataLoaderBuilder::new(ParseBatcher::<B>::new(device, SRC_PAD))
            .batch_size(2)
            .build(dataset());
        let generator = Generator::new(tokens(), 5, DecodeMode::TeacherForced);
        let _ = evaluate(&model, loader.as_ref(), &generator, &ProgressBar::hidden());
    }
}
