// ============================================================
// Layer 5 — Attention Decoder (single step)
// ============================================================
// One call = one decode step for the whole batch:
//
//   1. embed the previous output token          [batch, 1, emb]
//   2. advance the LSTM by one step             h', c'  [batch, hidden]
//   3. dot-product attention of h' over context
//        scores   = context · h'                [batch, source_len]
//        scores[padding] = -inf
//        weights  = softmax(scores)
//        attended = Σ weights · context         [batch, hidden]
//   4. combined = dropout(tanh(W_h h' + W_c attended))
//   5. logits   = W_o combined                  [batch, target_vocab]
//
// Setting padding scores to -inf BEFORE the softmax gives those
// positions exactly zero weight (exp(-inf) = 0), not just a
// small one.
//
// Reference: Luong et al. (2015) Effective Approaches to
//            Attention-based Neural Machine Translation

use burn::{
    nn::{
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
    tensor::activation::softmax,
};

#[derive(Config, Debug)]
pub struct AttnDecoderConfig {
    pub vocab_size:     usize,
    pub embedding_size: usize,
    pub hidden_size:    usize,
    #[config(default = 0.25)]
    pub dropout:        f64,
}

impl AttnDecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AttnDecoder<B> {
        AttnDecoder {
            embedding:    EmbeddingConfig::new(self.vocab_size, self.embedding_size).init(device),
            lstm:         LstmConfig::new(self.embedding_size, self.hidden_size, true).init(device),
            hidden_proj:  LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            context_proj: LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            output:       LinearConfig::new(self.hidden_size, self.vocab_size).init(device),
            dropout:      DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct AttnDecoder<B: Backend> {
    pub embedding:    Embedding<B>,
    pub lstm:         Lstm<B>,
    pub hidden_proj:  Linear<B>,
    pub context_proj: Linear<B>,
    pub output:       Linear<B>,
    pub dropout:      Dropout,
}

/// The recurrent (h, c) pair carried between decode steps.
#[derive(Debug, Clone)]
pub struct DecoderState<B: Backend> {
    pub hidden: Tensor<B, 2>,
    pub cell:   Tensor<B, 2>,
}

/// Result of one decode step.
#[derive(Debug, Clone)]
pub struct DecoderStep<B: Backend> {
    pub state:     DecoderState<B>,
    /// Unnormalised scores over the target vocabulary — [batch, vocab]
    pub logits:    Tensor<B, 2>,
    /// Attention distribution over source positions — [batch, source_len]
    #[allow(dead_code)]
    pub attention: Tensor<B, 2>,
}

impl<B: Backend> AttnDecoder<B> {
    /// Advance every sequence in the batch by one token.
    ///
    /// `mask` is true at source positions that are padding.
    pub fn step(
        &self,
        prev_tokens: Tensor<B, 1, Int>,
        state:       DecoderState<B>,
        context:     Tensor<B, 3>,
        mask:        Tensor<B, 2, Bool>,
    ) -> DecoderStep<B> {
        let [batch] = prev_tokens.dims();

        let embedded = self.embedding.forward(prev_tokens.reshape([batch, 1]));
        let (_, next) = self.lstm.forward(
            embedded,
            Some(LstmState::new(state.cell, state.hidden)),
        );

        let (attended, attention) = attend(next.hidden.clone(), context, mask);

        let combined = (self.hidden_proj.forward(next.hidden.clone())
            + self.context_proj.forward(attended))
            .tanh();
        let logits = self.output.forward(self.dropout.forward(combined));

        DecoderStep {
            state: DecoderState { hidden: next.hidden, cell: next.cell },
            logits,
            attention,
        }
    }
}

/// Masked dot-product attention.
///
/// hidden: [batch, dim], context: [batch, source_len, dim],
/// mask: [batch, source_len] (true = padding).
/// Returns (attended context [batch, dim], weights [batch, source_len]).
///
/// # Panics
/// If the mask does not line up with the context.
pub fn attend<B: Backend>(
    hidden:  Tensor<B, 2>,
    context: Tensor<B, 3>,
    mask:    Tensor<B, 2, Bool>,
) -> (Tensor<B, 2>, Tensor<B, 2>) {
    let [batch, source_len, dim] = context.dims();
    assert_eq!(
        mask.dims(),
        [batch, source_len],
        "attention mask shape must match context [batch, source_len]"
    );
    assert_eq!(hidden.dims(), [batch, dim], "decoder hidden size must match context width");

    let scores = context.clone()
        .matmul(hidden.reshape([batch, dim, 1]))
        .reshape([batch, source_len]);
    let weights = softmax(scores.mask_fill(mask, f32::NEG_INFINITY), 1);

    let attended = weights.clone()
        .reshape([batch, 1, source_len])
        .matmul(context)
        .reshape([batch, dim]);

    (attended, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::encoder::EncoderConfig;
    use burn::{backend::NdArray, tensor::{Distribution, TensorData}};

    type B = NdArray;

    fn to_vec(t: Tensor<B, 2>) -> Vec<f32> {
        t.into_data().iter::<f32>().collect()
    }

    #[test]
    fn test_padding_gets_exactly_zero_weight() {
        let device  = Default::default();
        let hidden  = Tensor::<B, 2>::random([2, 6], Distribution::Default, &device);
        let context = Tensor::<B, 3>::random([2, 4, 6], Distribution::Default, &device);
        let mask = Tensor::<B, 2, Bool>::from_bool(
            TensorData::from([[false, false, true, true], [false, true, false, true]]),
            &device,
        );

        let (_, weights) = attend(hidden, context, mask);
        let w = to_vec(weights);

        // Row 0: positions 2, 3 masked. Row 1: positions 1, 3 masked.
        assert_eq!(w[2], 0.0);
        assert_eq!(w[3], 0.0);
        assert_eq!(w[4 + 1], 0.0);
        assert_eq!(w[4 + 3], 0.0);

        // Remaining weight still sums to one per row
        assert!((w[0] + w[1] - 1.0).abs() < 1e-5);
        assert!((w[4] + w[6] - 1.0).abs() < 1e-5);
    }

    #[test]
    #[should_panic]
    fn test_mask_width_mismatch_panics() {
        let device  = Default::default();
        let hidden  = Tensor::<B, 2>::zeros([1, 3], &device);
        let context = Tensor::<B, 3>::zeros([1, 4, 3], &device);
        let mask    = Tensor::<B, 2, Bool>::from_bool(TensorData::from([[false, true, true]]), &device);
        let _ = attend(hidden, context, mask);
    }

    #[test]
    fn test_step_shapes_and_determinism() {
        let device  = Default::default();
        let decoder = AttnDecoderConfig::new(9, 4, 5).init::<B>(&device);

        let prev    = Tensor::<B, 1, Int>::from_ints([0, 3], &device);
        let state   = DecoderState {
            hidden: Tensor::<B, 2>::random([2, 5], Distribution::Default, &device),
            cell:   Tensor::<B, 2>::random([2, 5], Distribution::Default, &device),
        };
        let context = Tensor::<B, 3>::random([2, 3, 5], Distribution::Default, &device);
        let mask    = Tensor::<B, 2, Bool>::from_bool(
            TensorData::from([[false, false, true], [false, false, false]]),
            &device,
        );

        let a = decoder.step(prev.clone(), state.clone(), context.clone(), mask.clone());
        let b = decoder.step(prev, state, context, mask);

        assert_eq!(a.logits.dims(), [2, 9]);
        assert_eq!(a.state.hidden.dims(), [2, 5]);
        assert_eq!(a.attention.dims(), [2, 3]);
        // Dropout is inactive without autodiff, so the step is pure
        assert_eq!(to_vec(a.logits), to_vec(b.logits));
    }

    #[test]
    fn test_single_real_token_takes_all_attention() {
        // Encoder → one decoder step on a source that is all padding
        // except its first position.
        let device  = Default::default();
        let pad     = 7;
        let encoder = EncoderConfig::new(8, 4, 6).init::<B>(&device);
        let decoder = AttnDecoderConfig::new(5, 4, 6).init::<B>(&device);

        let source  = Tensor::<B, 1, Int>::from_ints([3, pad, pad, pad, 2, pad, pad, pad], &device)
            .reshape([2, 4]);
        let mask    = source.clone().equal_elem(pad);
        let encoded = encoder.forward(source);

        let step = decoder.step(
            Tensor::<B, 1, Int>::from_ints([0, 0], &device),
            DecoderState { hidden: encoded.hidden, cell: encoded.cell },
            encoded.context,
            mask,
        );
        let w = to_vec(step.attention);

        assert!((w[0] - 1.0).abs() < 1e-6);
        assert!((w[4] - 1.0).abs() < 1e-6);
        assert_eq!(&w[1..4], &[0.0, 0.0, 0.0]);
        assert_eq!(&w[5..8], &[0.0, 0.0, 0.0]);
    }
}
