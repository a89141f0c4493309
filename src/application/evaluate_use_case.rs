// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores the latest checkpoint on the held-out split:
//
//   Step 1: Load manifest + vocabularies   (Layer 6 - infra)
//           and check they belong to the same run
//   Step 2: Rebuild the same split         (Layer 4 - data)
//   Step 3: Load weights on the inner backend
//   Step 4: Greedy evaluation              (Layer 5 - ml)
//
// The split is rebuilt from the manifest's seed and test size,
// so it matches the one used during training as long as the
// corpus file is unchanged.

use anyhow::Result;
use burn::data::dataloader::DataLoaderBuilder;

use crate::application::corpus::{encode_examples, ensure_vocab_matches, load_and_split};
use crate::data::{batcher::ParseBatcher, dataset::ParseDataset};
use crate::infra::{checkpoint::CheckpointManager, progress::batch_bar, vocab_store::VocabStore};
use crate::ml::{
    evaluator::{evaluate, log_examples, EvalReport},
    generator::{DecodeMode, Generator},
    inferencer::InferBackend,
    model::Seq2Seq,
};

pub struct EvaluateUseCase {
    checkpoint_dir: String,
    /// Overrides the corpus path recorded at training time
    corpus_path:    Option<String>,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: String, corpus_path: Option<String>) -> Self {
        Self { checkpoint_dir, corpus_path }
    }

    pub fn execute(&self) -> Result<EvalReport> {
        // ── Step 1: Manifest + vocabularies ───────────────────────────────────
        let ckpt     = CheckpointManager::new(&self.checkpoint_dir)?;
        let manifest = ckpt.load_manifest()?;
        let vocabs   = VocabStore::new(&self.checkpoint_dir).load()?;
        ensure_vocab_matches(&vocabs, &manifest)?;
        let cfg      = &manifest.config;

        // ── Step 2: Same held-out split as training ───────────────────────────
        let corpus_path = self.corpus_path.as_deref().unwrap_or(&cfg.corpus_path);
        let (_, test)   = load_and_split(corpus_path, cfg.test_size, cfg.seed)?;
        if test.is_empty() {
            anyhow::bail!("Held-out split is empty (test_size = {})", cfg.test_size);
        }
        let test_dataset = ParseDataset::new(encode_examples(&test, &vocabs, &manifest.lengths));
        let test_batches = test_dataset.sample_count().div_ceil(cfg.eval_batch_size);

        // ── Step 3: Model on the inner backend ────────────────────────────────
        let device = burn::backend::wgpu::WgpuDevice::default();
        let model: Seq2Seq<InferBackend> = manifest.model_config().init(&device);
        let model  = ckpt.load_model(model, &device)?;

        let loader = DataLoaderBuilder::new(ParseBatcher::<InferBackend>::new(device, manifest.tokens.source_pad))
            .batch_size(cfg.eval_batch_size)
            .num_workers(1)
            .build(test_dataset);

        // ── Step 4: Greedy evaluation ─────────────────────────────────────────
        let generator = Generator::new(manifest.tokens, manifest.lengths.horizon(), DecodeMode::Greedy);
        let pb        = batch_bar(test_batches, "evaluate");
        let report    = evaluate(&model, loader.as_ref(), &generator, &pb);
        pb.finish_and_clear();

        tracing::info!(
            "Evaluated {} examples in {} batches: loss {:.4}, accuracy {:.4}",
            test.len(), report.batches, report.loss, report.accuracy.value()
        );
        log_examples(&report, &vocabs, manifest.tokens.source_pad);
        Ok(report)
    }
}
