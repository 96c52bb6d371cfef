// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands and all their configurable flags.
//
// Enum-valued flags (activation, loss, optimizer) are parsed
// through their FromStr impls, so clap never leaks into the
// layers below.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::{train_use_case::TrainConfig, walkthrough_use_case::StepConfig};
use crate::ml::{loss::LossKind, model::Activation, trainer::OptimizerKind};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier on MNIST and save checkpoints
    Train(TrainArgs),

    /// Report test-set loss and accuracy of a trained checkpoint
    Evaluate(EvaluateArgs),

    /// Show class probabilities for one test image
    Predict(PredictArgs),

    /// Compute d/dx of mean(x²) with autograd and compare with 2x/n
    Autograd(AutogradArgs),

    /// Run one training step and show how the first layer's weights move
    Step(StepArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSON file with a full or partial TrainConfig; replaces the flags below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory to save model checkpoints, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Use only the first N training images
    #[arg(long)]
    pub limit: Option<usize>,

    /// Hidden layer widths, comma separated
    #[arg(long, value_delimiter = ',', default_value = "128,64")]
    pub hidden_sizes: Vec<usize>,

    /// relu, sigmoid or tanh
    #[arg(long, default_value = "relu")]
    pub activation: Activation,

    /// cross-entropy (on logits) or nll (on log-softmax)
    #[arg(long, default_value = "nll")]
    pub loss: LossKind,

    /// sgd or adam
    #[arg(long, default_value = "sgd")]
    pub optimizer: OptimizerKind,

    #[arg(long, default_value_t = 0.003)]
    pub lr: f64,

    /// SGD momentum (0 disables it)
    #[arg(long, default_value_t = 0.0)]
    pub momentum: f64,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Share of training images used for fitting; the rest validates
    #[arg(long, default_value_t = 0.9)]
    pub train_fraction: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Data loader worker threads
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,

    /// Normalisation mean applied after scaling pixels to [0, 1]
    #[arg(long, default_value_t = 0.5)]
    pub norm_mean: f32,

    /// Normalisation standard deviation
    #[arg(long, default_value_t = 0.5)]
    pub norm_std: f32,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            checkpoint_dir: a.checkpoint_dir,
            sample_limit:   a.limit,
            hidden_sizes:   a.hidden_sizes,
            activation:     a.activation,
            loss:           a.loss,
            optimizer:      a.optimizer,
            learning_rate:  a.lr,
            momentum:       a.momentum,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            train_fraction: a.train_fraction,
            seed:           a.seed,
            num_workers:    a.num_workers,
            norm_mean:      a.norm_mean,
            norm_std:       a.norm_std,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Use only the first N test images
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Index of the image in the MNIST test split
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// How many of the most likely classes to list
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

#[derive(Args, Debug)]
pub struct AutogradArgs {
    #[arg(long, default_value_t = 2)]
    pub rows: usize,

    #[arg(long, default_value_t = 2)]
    pub cols: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct StepArgs {
    #[arg(long, value_delimiter = ',', default_value = "128,64")]
    pub hidden_sizes: Vec<usize>,

    #[arg(long, default_value = "relu")]
    pub activation: Activation,

    #[arg(long, default_value = "cross-entropy")]
    pub loss: LossKind,

    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// How many weight values to print
    #[arg(long, default_value_t = 5)]
    pub show: usize,
}

impl From<&StepArgs> for StepConfig {
    fn from(a: &StepArgs) -> Self {
        StepConfig {
            hidden_sizes:  a.hidden_sizes.clone(),
            activation:    a.activation,
            loss:          a.loss,
            learning_rate: a.lr,
            batch_size:    a.batch_size,
            seed:          a.seed,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["digit-trainer", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let default = TrainConfig::default();
        assert_eq!(cfg.hidden_sizes, default.hidden_sizes);
        assert_eq!(cfg.loss, default.loss);
        assert_eq!(cfg.optimizer, default.optimizer);
        assert_eq!(cfg.batch_size, default.batch_size);
        assert_eq!(cfg.epochs, default.epochs);
        assert_eq!(cfg.learning_rate, default.learning_rate);
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "digit-trainer", "train",
            "--hidden-sizes", "256,128,64",
            "--activation", "tanh",
            "--loss", "cross-entropy",
            "--optimizer", "adam",
            "--lr", "0.001",
            "--limit", "1000",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.hidden_sizes, vec![256, 128, 64]);
        assert_eq!(cfg.activation, Activation::Tanh);
        assert_eq!(cfg.loss, LossKind::CrossEntropy);
        assert_eq!(cfg.optimizer, OptimizerKind::Adam);
        assert_eq!(cfg.sample_limit, Some(1000));
    }

    #[test]
    fn test_unknown_activation_is_rejected() {
        let result = Cli::try_parse_from(["digit-trainer", "train", "--activation", "swish"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_predict_args() {
        let cli = Cli::try_parse_from(["digit-trainer", "predict", "--index", "17"]).unwrap();
        let Commands::Predict(args) = cli.command else { panic!("expected predict") };
        assert_eq!(args.index, 17);
        assert_eq!(args.checkpoint_dir, "checkpoints");
    }
}
