// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap, hands work to Layer 2, and prints the results.
//
// Commands:
//   1. `train`    — trains the classifier, saves checkpoints
//   2. `evaluate` — test-set loss and accuracy of a checkpoint
//   3. `predict`  — class probabilities for one test image
//   4. `autograd` — gradient of mean(x²) via backward()
//   5. `step`     — one optimiser step, before/after weights

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{AutogradArgs, Commands, EvaluateArgs, PredictArgs, StepArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "digit-trainer",
    version,
    about = "Train a small feed-forward classifier on MNIST digits with burn."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. This layer only routes and prints.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Predict(args)  => run_predict(args),
            Commands::Autograd(args) => run_autograd(args),
            Commands::Step(args)     => run_step(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};

    let config = match args.config.clone() {
        Some(path) => {
            tracing::info!("Reading training config from '{}'", path.display());
            TrainConfig::from_json_file(path)?
        }
        None => args.into(),
    };
    tracing::info!("Starting training, checkpoints in '{}'", config.checkpoint_dir);

    let summary = TrainUseCase::new(config).execute()?;

    if let Some(last) = summary.final_metrics() {
        println!(
            "Training complete. Final training loss {:.4}, validation accuracy {:.2}%",
            last.train_loss,
            last.val_accuracy * 100.0
        );
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(&args.checkpoint_dir)?.execute(args.limit)?;

    println!("Test loss:     {:.4}", report.loss);
    println!(
        "Test accuracy: {:.2}% ({}/{})",
        report.accuracy() * 100.0,
        report.correct,
        report.total
    );
    for class in 0..report.class_total.len() {
        if let Some(acc) = report.class_accuracy(class) {
            println!("  digit {class}: {:.2}% of {}", acc * 100.0, report.class_total[class]);
        }
    }
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let (label, prediction) = PredictUseCase::new(&args.checkpoint_dir)?.execute(args.index)?;

    println!("Test image {} (label {})", args.index, label);
    println!("Predicted: {} ({:.2}%)", prediction.class, prediction.confidence * 100.0);
    for (class, p) in prediction.top_k(args.top) {
        println!("  {class}: {:.4}", p);
    }
    Ok(())
}

fn run_autograd(args: AutogradArgs) -> Result<()> {
    use crate::application::walkthrough_use_case::WalkthroughUseCase;

    let check = WalkthroughUseCase::autograd(args.rows, args.cols, args.seed)?;

    println!("x        = {:?}", check.input);
    println!("z        = mean(x²) = {:.6}", check.output);
    println!("dz/dx    = {:?}", check.gradient);
    println!("2x / n   = {:?}", check.analytic_gradient());
    println!("max |difference| = {:e}", check.max_error());
    Ok(())
}

fn run_step(args: StepArgs) -> Result<()> {
    use crate::application::walkthrough_use_case::WalkthroughUseCase;

    let report = WalkthroughUseCase::step(&(&args).into())?;
    let n = args.show.min(report.weight_before.len());

    println!("First layer weights {:?}", report.weight_shape);
    println!("Loss:            {:.6}", report.loss);
    println!("Initial weights: {:?}", &report.weight_before[..n]);
    println!("Gradient:        {:?}", &report.gradient[..n]);
    println!("Updated weights: {:?}", &report.weight_after[..n]);
    println!(
        "Mean |update| = {:e} (learning rate {})",
        report.mean_update(),
        report.learning_rate
    );
    Ok(())
}
