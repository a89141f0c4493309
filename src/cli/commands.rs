// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `evaluate` and
// `translate`, and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the seq2seq parser on a Jobs corpus file
    Train(TrainArgs),

    /// Score the latest checkpoint on the held-out split
    Evaluate(EvaluateArgs),

    /// Translate one question into a logical form
    Translate(TranslateArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Corpus file, one parse([words],form). fact per line
    #[arg(long, default_value = "data/jobs640.pl")]
    pub corpus: String,

    /// Directory for checkpoints, vocabularies and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of examples held out for evaluation
    #[arg(long, default_value_t = 140)]
    pub test_size: usize,

    /// Seed for the split, shuffling and weight initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 60)]
    pub train_batch_size: usize,

    #[arg(long, default_value_t = 20)]
    pub eval_batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// AdamW learning rate
    #[arg(long, default_value_t = 5e-4)]
    pub lr: f64,

    /// Width of the word embeddings
    #[arg(long, default_value_t = 350)]
    pub embedding_size: usize,

    /// Width of the LSTM state
    #[arg(long, default_value_t = 350)]
    pub hidden_size: usize,

    /// Dropout probability, active during training only
    #[arg(long, default_value_t = 0.25)]
    pub dropout: f64,

    /// Question words seen fewer times than this map to <UNK>
    #[arg(long, default_value_t = 2)]
    pub min_source_freq: usize,

    /// Target width = longest training query × this factor
    #[arg(long, default_value_t = 1.5)]
    pub target_len_factor: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_path:       a.corpus,
            checkpoint_dir:    a.checkpoint_dir,
            test_size:         a.test_size,
            seed:              a.seed,
            train_batch_size:  a.train_batch_size,
            eval_batch_size:   a.eval_batch_size,
            epochs:            a.epochs,
            lr:                a.lr,
            embedding_size:    a.embedding_size,
            hidden_size:       a.hidden_size,
            dropout:           a.dropout,
            min_source_freq:   a.min_source_freq,
            target_len_factor: a.target_len_factor,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Corpus file; defaults to the one used for training
    #[arg(long)]
    pub corpus: Option<String>,
}

#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// The natural language question, e.g. "what jobs use java?"
    #[arg(long)]
    pub question: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
