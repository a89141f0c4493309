// ============================================================
// Layer 5 — Generator (decode loop)
// ============================================================
// Drives the decoder one step at a time over a whole batch:
//
//   prev  = <s> for every sequence
//   (h,c) = encoder summary
//   for t in 0..max_length:
//       step     = decoder(prev, h, c, context, mask)
//       loss    += CE(step.logits, labels[:, t])   (padding ignored)
//       prev     = forced label   (TeacherForced)
//                | argmax(logits) (Greedy)
//       ended   |= prev == </s>
//       stop if every sequence has ended
//
// The early stop is batch-wide. A sequence that ended early keeps
// being decoded with the others; its later labels are padding, so
// those steps add nothing to the loss.
//
// The decode mode is fixed when the Generator is built (once per
// train / eval phase), not passed per call.
//
// Shapes:
//   source: [batch, source_len]  Int
//   labels: [batch, label_len]   Int   (no leading <s>)
//   mask:   [batch, source_len]  Bool  (true = padding)
//   predictions: [batch, steps]  Int   (greedy only)

use burn::{prelude::*, tensor::activation::log_softmax};

use crate::domain::special_tokens::SpecialTokens;
use crate::ml::decoder::DecoderState;
use crate::ml::model::Seq2Seq;

/// How the next decoder input is chosen after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Feed the ground-truth label back in (training).
    TeacherForced,
    /// Feed the model's own argmax back in (evaluation / inference).
    Greedy,
}

/// Output of one `generate` call.
#[derive(Debug)]
pub struct Generation<B: Backend> {
    /// Sum over executed steps of the per-step mean token loss — [1]
    pub loss:        Tensor<B, 1>,
    /// Greedy output, `[batch, steps]`. `None` under teacher forcing.
    pub predictions: Option<Tensor<B, 2, Int>>,
    /// Number of decode steps actually executed
    pub steps:       usize,
}

#[derive(Debug, Clone)]
pub struct Generator {
    tokens:     SpecialTokens,
    max_length: usize,
    mode:       DecodeMode,
}

type ChooseFn<B> = fn(Tensor<B, 2>, Tensor<B, 1, Int>) -> Tensor<B, 1, Int>;

impl Generator {
    /// # Panics
    /// If `max_length` is zero.
    pub fn new(tokens: SpecialTokens, max_length: usize, mode: DecodeMode) -> Self {
        assert!(max_length > 0, "decode horizon must be at least one step");
        Self { tokens, max_length, mode }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    pub fn tokens(&self) -> &SpecialTokens {
        &self.tokens
    }

    pub fn generate<B: Backend>(
        &self,
        model:  &Seq2Seq<B>,
        source: Tensor<B, 2, Int>,
        labels: Tensor<B, 2, Int>,
        mask:   Tensor<B, 2, Bool>,
    ) -> Generation<B> {
        let [batch, source_len] = source.dims();
        let [label_batch, label_len] = labels.dims();
        assert_eq!(label_batch, batch, "source and label batch sizes differ");
        assert_eq!(mask.dims(), [batch, source_len], "mask must match source shape");
        assert!(
            label_len >= self.max_length,
            "labels ({label_len} wide) shorter than decode horizon ({})",
            self.max_length
        );

        let device = source.device();
        let choose: ChooseFn<B> = match self.mode {
            DecodeMode::TeacherForced => teacher_forced_step::<B>,
            DecodeMode::Greedy        => greedy_step::<B>,
        };
        let keep_predictions = self.mode == DecodeMode::Greedy;

        let encoded = model.encoder.forward(source);
        let context = encoded.context;
        let mut state = DecoderState { hidden: encoded.hidden, cell: encoded.cell };

        let mut prev  = Tensor::<B, 1, Int>::full([batch], self.tokens.target_sos as i64, &device);
        let mut ended = Tensor::<B, 1, Int>::zeros([batch], &device);
        let mut loss  = Tensor::<B, 1>::zeros([1], &device);
        let mut chosen: Vec<Tensor<B, 2, Int>> = Vec::new();
        let mut steps = 0usize;

        for t in 0..self.max_length {
            let step = model.decoder.step(prev, state, context.clone(), mask.clone());
            state = step.state;

            let label = labels.clone().slice([0..batch, t..t + 1]).reshape([batch]);
            loss = loss + masked_cross_entropy(step.logits.clone(), label.clone(), self.tokens.target_pad);

            prev = choose(step.logits, label);
            if keep_predictions {
                chosen.push(prev.clone().reshape([batch, 1]));
            }

            ended = ended.mask_fill(prev.clone().equal_elem(self.tokens.target_eos as i64), 1);
            steps = t + 1;

            if all_set(&ended) {
                tracing::trace!("All {} sequences ended after {} steps", batch, steps);
                break;
            }
        }

        let predictions = keep_predictions.then(|| Tensor::cat(chosen, 1));
        Generation { loss, predictions, steps }
    }
}

/// Next input under teacher forcing: the label, whatever the model said.
pub fn teacher_forced_step<B: Backend>(
    _logits: Tensor<B, 2>,
    labels:  Tensor<B, 1, Int>,
) -> Tensor<B, 1, Int> {
    labels
}

/// Next input under greedy decoding: the highest-scoring token.
pub fn greedy_step<B: Backend>(
    logits:  Tensor<B, 2>,
    _labels: Tensor<B, 1, Int>,
) -> Tensor<B, 1, Int> {
    let [batch, _] = logits.dims();
    logits.detach().argmax(1).reshape([batch])
}

/// Cross-entropy averaged over the sequences whose target is not
/// padding. Padding targets contribute neither to the sum nor to
/// the denominator; a step where every target is padding yields 0.
///
/// logits: [batch, vocab], targets: [batch] → [1]
pub fn masked_cross_entropy<B: Backend>(
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 1, Int>,
    pad_id:  u32,
) -> Tensor<B, 1> {
    let [batch, _] = logits.dims();

    let keep = targets.clone()
        .equal_elem(pad_id as i64)
        .float()
        .neg()
        .add_scalar(1.0);
    let picked = log_softmax(logits, 1)
        .gather(1, targets.reshape([batch, 1]))
        .reshape([batch]);

    let count = keep.clone().sum().clamp_min(1.0);
    (picked * keep).sum().neg() / count
}

fn all_set<B: Backend>(flags: &Tensor<B, 1, Int>) -> bool {
    flags.clone().min().into_scalar().elem::<i64>() == 1
}
