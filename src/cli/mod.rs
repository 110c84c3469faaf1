// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
// `detect` and `score` print the DetectResponse as JSON.
//
// Reference: Rust Book §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, DetectArgs, PrepareArgs, ScoreArgs, TextArgs, TrainArgs};

use crate::application::detect_use_case::{DetectRequest, DetectResponse, DetectUseCase, Engine};

#[derive(Parser, Debug)]
#[command(
    name = "slopmop-detector",
    version,
    about = "Train a transformer classifier for AI-generated text, then score texts with it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Detect(args)  => run_detect(args),
            Commands::Score(args)   => run_score(args),
            Commands::Prepare(args) => run_prepare(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on: {}", args.dataset.data);
    let report = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete. Best epoch {} (val_loss={:.4}) after {} epochs{}.",
        report.best_epoch,
        report.best_val_loss,
        report.epochs_run,
        if report.stopped_early { ", stopped early" } else { "" },
    );
    Ok(())
}

fn run_detect(args: DetectArgs) -> Result<()> {
    use crate::ml::inferencer::{Detector, InferBackend, LoadOptions};

    let text = read_text(&args.input)?;
    let opts = LoadOptions::new(&args.checkpoint_dir).with_fallback_dir(args.fallback_dir);
    let device   = burn::backend::wgpu::WgpuDevice::default();
    let detector = Detector::<InferBackend>::load(&opts, device)?;

    let use_case = DetectUseCase::new(Engine::Model(Box::new(detector)))
        .with_max_chars(args.input.max_chars);
    print_response(&use_case.execute(&DetectRequest::new(text))?)
}

fn run_score(args: ScoreArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let use_case = DetectUseCase::new(Engine::Heuristic).with_max_chars(args.input.max_chars);
    print_response(&use_case.execute(&DetectRequest::new(text))?)
}

fn run_prepare(args: PrepareArgs) -> Result<()> {
    use crate::application::prepare_use_case::PrepareUseCase;

    let summary = PrepareUseCase::new(args.into()).execute()?;
    println!(
        "Prepared {} rows: {} human, {} AI, {} unlabelled.",
        summary.total(), summary.human, summary.ai, summary.unlabeled,
    );
    Ok(())
}

fn read_text(input: &TextArgs) -> Result<String> {
    match (&input.text, &input.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read '{}'", path.display())),
        (None, None) => anyhow::bail!("Provide --text or --file"),
    }
}

fn print_response(response: &DetectResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
