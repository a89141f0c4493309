// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load and split the corpus     (Layer 4 - data)
//   Step 2: Build vocabularies            (Layer 6 - infra)
//   Step 3: Fix sequence widths           (Layer 4 - data)
//   Step 4: Encode and pad examples       (Layer 4 - data)
//   Step 5: Save the run manifest         (Layer 6 - infra)
//   Step 6: Run training loop             (Layer 5 - ml)
//
// Vocabularies and widths come from the training split only;
// held-out questions may contain unknown words.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::application::corpus::{encode_examples, load_and_split};
use crate::data::dataset::{ParseDataset, SequenceLengths};
use crate::domain::special_tokens::SpecialTokens;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    vocab_store::VocabStore,
};
use crate::ml::model::Seq2SeqConfig;
use crate::ml::trainer::{run_training, TrainingSinks};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded by
// `evaluate` and `translate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_path:       String,
    pub checkpoint_dir:    String,
    pub test_size:         usize,
    pub seed:              u64,
    pub train_batch_size:  usize,
    pub eval_batch_size:   usize,
    pub epochs:            usize,
    pub lr:                f64,
    pub embedding_size:    usize,
    pub hidden_size:       usize,
    pub dropout:           f64,
    pub min_source_freq:   usize,
    pub target_len_factor: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_path:       "data/jobs640.pl".to_string(),
            checkpoint_dir:    "checkpoints".to_string(),
            test_size:         140,
            seed:              42,
            train_batch_size:  60,
            eval_batch_size:   20,
            epochs:            20,
            lr:                5e-4,
            embedding_size:    350,
            hidden_size:       350,
            dropout:           0.25,
            min_source_freq:   2,
            target_len_factor: 1.5,
        }
    }
}

impl TrainConfig {
    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.train_batch_size == 0 || self.eval_batch_size == 0 {
            anyhow::bail!("Batch sizes must be at least 1");
        }
        if self.epochs == 0 {
            anyhow::bail!("Need at least one epoch");
        }
        if !(0.0..1.0).contains(&self.dropout) {
            anyhow::bail!("Dropout must be in [0, 1), got {}", self.dropout);
        }
        if self.target_len_factor < 1.0 {
            anyhow::bail!("Target length factor must be >= 1.0, got {}", self.target_len_factor);
        }
        if self.min_source_freq == 0 {
            anyhow::bail!("Minimum source frequency must be at least 1");
        }
        Ok(())
    }
}

// ─── Run Manifest ─────────────────────────────────────────────────────────────
/// Everything later commands need to rebuild this run's model
/// and data pipeline, saved next to the checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub config:            TrainConfig,
    pub tokens:            SpecialTokens,
    pub lengths:           SequenceLengths,
    pub source_vocab_size: usize,
    pub target_vocab_size: usize,
}

impl RunManifest {
    pub fn model_config(&self) -> Seq2SeqConfig {
        Seq2SeqConfig::new(
            self.source_vocab_size,
            self.target_vocab_size,
            self.config.embedding_size,
            self.config.hidden_size,
            self.config.dropout,
        )
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load and split ────────────────────────────────────────────
        tracing::info!("Loading corpus from '{}'", cfg.corpus_path);
        let (train, test) = load_and_split(&cfg.corpus_path, cfg.test_size, cfg.seed)?;
        if train.is_empty() {
            anyhow::bail!(
                "No training examples left after holding out {} for testing",
                cfg.test_size
            );
        }

        // ── Step 2: Vocabularies from the training split ──────────────────────
        let vocab_store = VocabStore::new(&cfg.checkpoint_dir);
        let vocabs      = vocab_store.build_and_save(&train, cfg.min_source_freq)?;
        let tokens      = vocabs.special_tokens()?;

        // ── Step 3: Sequence widths ───────────────────────────────────────────
        let lengths = SequenceLengths::from_examples(&train, cfg.target_len_factor);
        tracing::info!(
            "Sequence widths: source {}, target {} ({} decode steps)",
            lengths.source_len, lengths.target_len, lengths.horizon()
        );

        // ── Step 4: Encode + pad ──────────────────────────────────────────────
        let train_dataset = ParseDataset::new(encode_examples(&train, &vocabs, &lengths));
        let test_dataset  = ParseDataset::new(encode_examples(&test, &vocabs, &lengths));

        // ── Step 5: Save manifest for evaluate / translate ────────────────────
        let manifest = RunManifest {
            config:            cfg.clone(),
            tokens,
            lengths,
            source_vocab_size: vocabs.source.len(),
            target_vocab_size: vocabs.target.len(),
        };
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_manifest(&manifest)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 6: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, &manifest, train_dataset, test_dataset, TrainingSinks {
            checkpoints: &ckpt_manager,
            metrics:     &metrics,
            vocabs:      &vocabs,
        })
    }
}
