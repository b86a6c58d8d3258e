use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "recon-judge",
    version,
    about = "Score how well reconstructions recovered each ground-truth claim"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Judge documents and write per-document and aggregate outputs
    Judge(JudgeArgs),
    /// Recompute aggregate stats from stored judgments
    Aggregate(AggregateArgs),
}

#[derive(Parser, Debug)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .args(["doc_id", "all"])
))]
pub struct JudgeArgs {
    /// Directory with reconstruction records (<doc_id>.json)
    #[arg(long)]
    pub reconstruction_dir: PathBuf,

    /// Directory with claims records (<doc_id>.json)
    #[arg(long)]
    pub claims_dir: PathBuf,

    /// Document id to judge (repeatable)
    #[arg(long = "doc-id", num_args = 1..)]
    pub doc_id: Vec<String>,

    /// Judge every document with a reconstruction
    #[arg(long)]
    pub all: bool,

    #[arg(long, default_value = "./output")]
    pub output: PathBuf,

    /// YAML config file; environment variables override it
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct AggregateArgs {
    #[arg(long, default_value = "./output")]
    pub output: PathBuf,
}
