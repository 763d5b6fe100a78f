use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "preq",
    version,
    about = "Prequential evaluation of online classifiers",
    long_about = "Evaluate incrementally trained classifiers on data streams with the\n\
                  prequential (test-then-train) protocol. Streams are CSV files whose last\n\
                  column is the class label, or the built-in SEA generator."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate a classifier on a single stream
    Run(RunArgs),
    /// Evaluate a classifier on many CSV files, one run per file
    Batch(BatchArgs),
    /// Validate a CSV stream file
    Validate(ValidateArgs),
    /// List available classifiers
    Classifiers(ClassifiersArgs),
}

/// Options shared by `run` and `batch`
///
/// Precedence: `--config` file, then individual flags, then `--set` pairs.
#[derive(Args, Clone)]
pub struct EvalArgs {
    /// Classifier to evaluate (see `preq classifiers`)
    #[arg(long, default_value = "naive-bayes")]
    pub classifier: String,

    /// 0-based indices of nominal attributes
    #[arg(long, num_args = 1..)]
    pub nominal: Vec<usize>,

    /// Samples between metric snapshots
    #[arg(long)]
    pub n_wait: Option<u64>,

    /// Maximum number of evaluated instances
    #[arg(long)]
    pub max_instances: Option<u64>,

    /// Wall-time budget in seconds
    #[arg(long)]
    pub max_time: Option<f64>,

    /// Instances per predict/train step
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Instances used for pretraining (0 or 1 disables it)
    #[arg(long)]
    pub pretrain_size: Option<usize>,

    /// Report kappa next to accuracy in snapshots
    #[arg(long, default_value_t = false)]
    pub show_kappa: bool,

    /// Emit raw per-batch results to the snapshot sinks
    #[arg(long, default_value_t = false)]
    pub show_plot: bool,

    /// JSON configuration file
    #[arg(long, env = "PREQ_CONFIG")]
    pub config: Option<String>,

    /// Configuration overrides as key=value (e.g., --set n_wait=500)
    #[arg(long = "set", num_args = 1..)]
    pub set: Vec<String>,

    /// Compact JSON output (no indentation)
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Suppress progress messages on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// CSV stream file (last column is the class label)
    #[arg(long, conflicts_with = "generator")]
    pub file: Option<String>,

    /// Synthetic stream generator (sea)
    #[arg(long)]
    pub generator: Option<String>,

    /// Generator seed
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// SEA concept function (0-3)
    #[arg(long, default_value_t = 0)]
    pub function: usize,

    /// Probability of flipping a generated label
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    #[command(flatten)]
    pub eval: EvalArgs,

    /// Output file for the report (default: config output_file, else stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write every snapshot as a JSON line to this file
    #[arg(long)]
    pub snapshots: Option<String>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (e.g., "data/*.csv")
    #[arg(long, conflicts_with = "files")]
    pub glob: Option<String>,

    /// Explicit list of input files
    #[arg(long, num_args = 1..)]
    pub files: Option<Vec<String>>,

    /// Keep going after a file fails
    #[arg(long, default_value_t = false)]
    pub continue_on_error: bool,

    #[command(flatten)]
    pub eval: EvalArgs,

    /// Output file for the report array (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// CSV stream file
    #[arg(long)]
    pub file: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ClassifiersArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
