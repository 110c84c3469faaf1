// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Subcommands:
//   train   - fit the transformer classifier on a labelled dataset
//   detect  - score one text with the trained model
//   score   - score one text with the marker-phrase heuristic
//   prepare - normalise a dataset into a text,label CSV
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::{
    detect_use_case::DEFAULT_MAX_CHARS,
    prepare_use_case::PrepareConfig,
    train_use_case::TrainConfig,
};
use crate::ml::model::HeadKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the AI-text classifier
    Train(TrainArgs),

    /// Classify a text with the trained model
    Detect(DetectArgs),

    /// Classify a text with the marker-phrase heuristic
    Score(ScoreArgs),

    /// Normalise a dataset into a text,label CSV
    Prepare(PrepareArgs),
}

/// Classification head, kept separate from the model type so the
/// ml layer does not depend on clap.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum HeadArg {
    /// One logit, sigmoid, binary cross-entropy
    Single,
    /// Two logits, softmax, cross-entropy
    TwoClass,
}

impl From<HeadArg> for HeadKind {
    fn from(h: HeadArg) -> Self {
        match h {
            HeadArg::Single   => HeadKind::SingleLogit,
            HeadArg::TwoClass => HeadKind::TwoClass,
        }
    }
}

/// Dataset selection shared by `train` and `prepare`.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Dataset file (.csv, .jsonl, .json) or a directory of them
    #[arg(long, default_value = "data/train.csv")]
    pub data: String,

    /// Column holding human-written text in wide (one column per model) datasets
    #[arg(long, default_value = "Human_story")]
    pub human_column: String,

    /// Keep at most this many rows per label
    #[arg(long)]
    pub sample_per_label: Option<usize>,

    /// Seed for sampling, shuffling and the train/validation split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Directory for weights, tokenizer, configs and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Tokens per input sequence, including [CLS] and [SEP]
    #[arg(long, default_value_t = 256)]
    pub max_seq_len: usize,

    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Upper bound on epochs; early stopping may end sooner
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, default_value_t = 2e-5)]
    pub lr: f64,

    /// AdamW decoupled weight decay
    #[arg(long, default_value_t = 0.01)]
    pub weight_decay: f64,

    /// Hidden size; must be divisible by --num-heads
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Feed-forward inner size, typically 4x d_model
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    #[arg(long, value_enum, default_value_t = HeadArg::Single)]
    pub head: HeadArg,

    /// Fraction of rows used for training; the rest validate
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Checkpoint directory whose encoder weights start the run
    #[arg(long)]
    pub init_from: Option<String>,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:        a.dataset.data,
            checkpoint_dir:   a.checkpoint_dir,
            human_column:     a.dataset.human_column,
            max_seq_len:      a.max_seq_len,
            batch_size:       a.batch_size,
            epochs:           a.epochs,
            lr:               a.lr,
            weight_decay:     a.weight_decay,
            d_model:          a.d_model,
            num_heads:        a.num_heads,
            num_layers:       a.num_layers,
            d_ff:             a.d_ff,
            dropout:          a.dropout,
            vocab_size:       a.vocab_size,
            head:             a.head.into(),
            seed:             a.dataset.seed,
            train_fraction:   a.train_fraction,
            patience:         a.patience,
            sample_per_label: a.dataset.sample_per_label,
            init_from:        a.init_from,
        }
    }
}

/// Text input shared by `detect` and `score`.
#[derive(Args, Debug)]
pub struct TextArgs {
    /// Text to classify
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    pub max_chars: usize,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    #[command(flatten)]
    pub input: TextArgs,

    /// Directory written by `train`
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Encoder weights and tokenizer to use when no trained model loads
    #[arg(long)]
    pub fallback_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub input: TextArgs,
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Output CSV path
    #[arg(long, default_value = "data/prepared.csv")]
    pub output: PathBuf,

    /// Unlabelled rows to keep when sampling
    #[arg(long, default_value_t = 0)]
    pub sample_unlabeled: usize,
}

impl From<PrepareArgs> for PrepareConfig {
    fn from(a: PrepareArgs) -> Self {
        PrepareConfig {
            data_path:        a.dataset.data,
            output_path:      a.output,
            human_column:     a.dataset.human_column,
            sample_per_label: a.dataset.sample_per_label,
            sample_unlabeled: a.sample_unlabeled,
            seed:             a.dataset.seed,
        }
    }
}
