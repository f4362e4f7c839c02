//! Command line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Local hybrid (BM25 + vector) document retrieval
#[derive(Parser, Debug)]
#[command(name = "ragdb", version, long_about = None)]
pub struct Cli {
    /// Directory holding config.toml; relative data paths resolve against it
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    /// Config environment (selects config.<env>.toml)
    #[arg(long, global = true, env = "RUST_ENV", default_value = "dev")]
    pub env: String,

    /// Override the index namespace directory
    #[arg(long, global = true)]
    pub index_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest one plain-text file
    Ingest(IngestArgs),

    /// Ingest every .txt file under a directory
    #[command(name = "ingest-dir")]
    IngestDir(IngestDirArgs),

    /// Rank chunks against a query
    Query(QueryArgs),

    /// Build the answer prompt for a question from the best chunks
    Ask(AskArgs),

    /// Report index counts and load-time issues
    Health(HealthArgs),
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    pub file: PathBuf,

    /// Document id (defaults to the file stem)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args, Debug)]
pub struct IngestDirArgs {
    /// Defaults to data.raw_txt_dir
    pub dir: Option<PathBuf>,

    /// Only ingest the first N files
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    pub query: String,

    #[arg(long)]
    pub lexical_weight: Option<f32>,

    #[arg(long)]
    pub semantic_weight: Option<f32>,

    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    pub question: String,

    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
}

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[arg(long)]
    pub json: bool,
}
