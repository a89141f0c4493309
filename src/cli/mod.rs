// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`     — trains the parser on a corpus file
//   2. `evaluate`  — scores the latest checkpoint on the held-out split
//   3. `translate` — turns one question into a logical form
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs, TranslateArgs};

use crate::domain::traits::QueryTranslator;

#[derive(Parser, Debug)]
#[command(
    name = "jobs-semparse",
    version,
    about = "Train an attention seq2seq parser that turns job questions into logical forms."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => run_train(args),
            Commands::Evaluate(args)  => run_evaluate(args),
            Commands::Translate(args) => run_translate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus: {}", args.corpus);
    let use_case = TrainUseCase::new(args.into());
    use_case.execute()?;

    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(args.checkpoint_dir, args.corpus).execute()?;
    println!(
        "Token accuracy: {:.2}% ({}/{}) | mean loss {:.4}",
        report.accuracy.value() * 100.0,
        report.accuracy.correct,
        report.accuracy.total,
        report.loss,
    );
    Ok(())
}

fn run_translate(args: TranslateArgs) -> Result<()> {
    use crate::application::translate_use_case::TranslateUseCase;

    let use_case = TranslateUseCase::new(&args.checkpoint_dir)?;
    let query    = use_case.translate(&args.question)?;
    println!("\nQuery: {}", query);
    Ok(())
}
