// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + held-out evaluation loop using Burn's DataLoader and AdamW.
//
// Per epoch:
//   1. teacher-forced generate on every shuffled training batch,
//      backward, one optimizer step per batch
//   2. model.valid() → inner backend, dropout off for the whole pass
//   3. greedy evaluation on the held-out split
//   4. one summary line on stdout, one metrics row, one checkpoint
//
// Backends:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu)
//   - The evaluation batcher must also use MyInnerBackend
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::{RunManifest, TrainConfig};
use crate::data::{batcher::ParseBatcher, dataset::ParseDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
    progress::batch_bar,
    vocab_store::Vocabularies,
};
use crate::ml::evaluator::{evaluate, log_examples};
use crate::ml::generator::{DecodeMode, Generator};
use crate::ml::model::Seq2Seq;

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

const WEIGHT_DECAY: f32 = 1e-2;

/// Everything the loop writes to besides the model itself.
pub struct TrainingSinks<'a> {
    pub checkpoints: &'a CheckpointManager,
    pub metrics:     &'a MetricsLogger,
    pub vocabs:      &'a Vocabularies,
}

pub fn run_training(
    cfg:      &TrainConfig,
    manifest: &RunManifest,
    train:    ParseDataset,
    test:     ParseDataset,
    sinks:    TrainingSinks<'_>,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, manifest, train, test, sinks, device)
}

fn train_loop(
    cfg:      &TrainConfig,
    manifest: &RunManifest,
    train:    ParseDataset,
    test:     ParseDataset,
    sinks:    TrainingSinks<'_>,
    device:   burn::backend::wgpu::WgpuDevice,
) -> Result<()> {
    MyBackend::seed(cfg.seed);
    let tokens  = manifest.tokens;
    let horizon = manifest.lengths.horizon();

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: Seq2Seq<MyBackend> = manifest.model_config().init(&device);
    tracing::info!(
        "Model ready: embedding={}, hidden={}, {} parameters",
        cfg.embedding_size, cfg.hidden_size, model.num_params()
    );

    // ── AdamW over encoder + decoder ──────────────────────────────────────────
    let mut optim = AdamWConfig::new()
        .with_weight_decay(WEIGHT_DECAY)
        .init();

    // Mode is fixed per phase, not per call
    let teacher = Generator::new(tokens, horizon, DecodeMode::TeacherForced);
    let greedy  = Generator::new(tokens, horizon, DecodeMode::Greedy);

    let train_batches = train.sample_count().div_ceil(cfg.train_batch_size);
    let test_batches  = test.sample_count().div_ceil(cfg.eval_batch_size);

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_loader = DataLoaderBuilder::new(ParseBatcher::<MyBackend>::new(device.clone(), tokens.source_pad))
        .batch_size(cfg.train_batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train);

    // ── Evaluation data loader (InnerBackend — no autodiff overhead) ──────────
    let test_loader = DataLoaderBuilder::new(ParseBatcher::<MyInnerBackend>::new(device.clone(), tokens.source_pad))
        .batch_size(cfg.eval_batch_size)
        .num_workers(1)
        .build(test);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let pb = batch_bar(train_batches, format!("epoch {epoch}"));
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in train_loader.iter() {
            let out = teacher.generate(&model, batch.source, batch.labels, batch.mask);

            let loss_val: f64 = out.loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val;
            batches  += 1;
            pb.set_message(format!("loss {loss_val:.4}"));

            // Gradients are consumed here; nothing carries into the next batch
            let grads = out.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let train_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };

        // ── Evaluation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let pb = batch_bar(test_batches, "evaluate");
        let report = evaluate(&model_valid, test_loader.as_ref(), &greedy, &pb);
        pb.finish_and_clear();

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | accuracy={:.1}% ({}/{})",
            epoch, cfg.epochs, train_loss, report.loss,
            report.accuracy.value() * 100.0, report.accuracy.correct, report.accuracy.total,
        );

        sinks.metrics.log(&EpochMetrics::new(epoch, train_loss, report.loss, report.accuracy.value()))?;
        sinks.checkpoints.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
        log_examples(&report, sinks.vocabs, tokens.source_pad);
    }

    tracing::info!("Training complete! Metrics in '{}'", sinks.metrics.csv_path().display());
    Ok(())
}
