// ============================================================
// Layer 5 — Encoder
// ============================================================
// Reads the (reversed, padded) question once per batch and
// produces:
//   context      — one hidden vector per source position,
//                  consulted by attention at every decode step
//   hidden, cell — the final LSTM state, used as the decoder's
//                  initial state
//
// Shapes:
//   source:  [batch, source_len]            (Int)
//   context: [batch, source_len, hidden]
//   hidden:  [batch, hidden]
//   cell:    [batch, hidden]
//
// Dropout is applied to the summary hidden vector only. Burn's
// Dropout is a no-op unless the backend tracks gradients, so
// running the model through `.valid()` switches it off.

use burn::{
    nn::{Dropout, DropoutConfig, Embedding, EmbeddingConfig, Lstm, LstmConfig},
    prelude::*,
};

#[derive(Config, Debug)]
pub struct EncoderConfig {
    pub vocab_size:     usize,
    pub embedding_size: usize,
    pub hidden_size:    usize,
    #[config(default = 0.25)]
    pub dropout:        f64,
}

impl EncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Encoder<B> {
        Encoder {
            embedding: EmbeddingConfig::new(self.vocab_size, self.embedding_size).init(device),
            lstm:      LstmConfig::new(self.embedding_size, self.hidden_size, true).init(device),
            dropout:   DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
    pub dropout:   Dropout,
}

/// Everything the decoder needs from one encoder pass.
#[derive(Debug, Clone)]
pub struct EncoderOutput<B: Backend> {
    pub context: Tensor<B, 3>,
    pub hidden:  Tensor<B, 2>,
    pub cell:    Tensor<B, 2>,
}

impl<B: Backend> Encoder<B> {
    pub fn forward(&self, source: Tensor<B, 2, Int>) -> EncoderOutput<B> {
        let embedded = self.embedding.forward(source);
        let (context, state) = self.lstm.forward(embedded, None);

        EncoderOutput {
            context,
            hidden: self.dropout.forward(state.hidden),
            cell:   state.cell,
        }
    }
}
