// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and delegates to Layer 2 (application).
//
//   1. `train`   — fine-tunes the classifier, writes an artifact
//   2. `predict` — answers one JSON request from an artifact

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use crate::application::{
    predict_use_case::{OutputChannels, PredictUseCase},
    train_use_case::{SaveReport, TrainUseCase},
};
use crate::ml::inferencer::ArtifactLoader;
use commands::{Commands, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "question-classifier",
    version,
    about = "Fine-tune and serve an Arabic textual/arithmetic question classifier."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<ExitCode> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<ExitCode> {
    tracing::info!("Starting training, artifact goes to '{}'", args.output_dir.display());

    match TrainUseCase::new(args.into()).execute()? {
        SaveReport::Saved { files } => tracing::info!("Saved files: {:?}", files),
        // Training itself finished, so the run still exits 0.
        SaveReport::VerificationFailed { reason } => {
            tracing::error!("Training finished but the artifact could not be saved: {reason}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_predict(args: PredictArgs) -> Result<ExitCode> {
    if !args.ignored.is_empty() {
        tracing::warn!("Ignoring {} extra argument(s)", args.ignored.len());
    }
    let use_case = PredictUseCase::new(ArtifactLoader);
    let mut channels = OutputChannels::stdio();

    let emitted = use_case.respond(args.artifact_dir.as_deref(), args.request.as_deref(), &mut channels)?;
    Ok(if emitted { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
