use burn::prelude::*;

use crate::ml::decoder::{AttnDecoder, AttnDecoderConfig};
use crate::ml::encoder::{Encoder, EncoderConfig};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
    pub source_vocab_size: usize,
    pub target_vocab_size: usize,
    pub embedding_size:    usize,
    pub hidden_size:       usize,
    pub dropout:           f64,
}

impl Seq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Seq2Seq<B> {
        let encoder = EncoderConfig::new(self.source_vocab_size, self.embedding_size, self.hidden_size)
            .with_dropout(self.dropout)
            .init(device);
        let decoder = AttnDecoderConfig::new(self.target_vocab_size, self.embedding_size, self.hidden_size)
            .with_dropout(self.dropout)
            .init(device);
        Seq2Seq { encoder, decoder }
    }
}

/// Encoder and decoder saved and loaded as one record.
/// The step-by-step decode loop lives in `ml::generator`.
#[derive(Module, Debug)]
pub struct Seq2Seq<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: AttnDecoder<B>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_model_initializes() {
        let device = Default::default();
        let model  = Seq2SeqConfig::new(20, 15, 8, 8, 0.25).init::<NdArray>(&device);
        assert_eq!(model.decoder.output.weight.val().dims(), [8, 15]);
        assert!(model.num_params() > 0);
    }
}
