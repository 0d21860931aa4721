use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::{DEFAULT_FUZZY_LIMIT, DEFAULT_FUZZY_THRESHOLD};

#[derive(Debug, Parser)]
#[command(
    name = "fuzzdoc",
    about = "Offline fuzzy full-text search over a directory of text documents"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true, env = "FUZZDOC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the documents to index [default: <data-dir>/data]
    #[arg(long, global = true, env = "FUZZDOC_CORPUS_DIR")]
    pub corpus: Option<PathBuf>,

    /// Glob selecting documents, relative to the corpus (repeatable)
    #[arg(long = "pattern", global = true)]
    pub patterns: Vec<String>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build or incrementally update the index
    Index(IndexArgs),
    /// Search indexed documents
    Search(SearchArgs),
    /// Show how text is split into terms
    Tokenize(TokenizeArgs),
    /// Show index location and statistics
    Status(StatusArgs),
    /// Interactive menu for indexing and searching
    Shell,
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Index --

#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// Discard the current index and re-index every document
    #[arg(long)]
    pub full: bool,

    /// Output statistics as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Match query terms exactly, without fuzzy expansion
    #[arg(long)]
    pub no_fuzzy: bool,

    /// Minimum similarity (0-100) for a fuzzy expansion
    #[arg(long, default_value_t = DEFAULT_FUZZY_THRESHOLD)]
    pub threshold: f64,

    /// Maximum fuzzy expansions per query term
    #[arg(long, default_value_t = DEFAULT_FUZZY_LIMIT)]
    pub expansions: usize,
}

// -- Tokenize --

#[derive(Debug, Parser)]
pub struct TokenizeArgs {
    /// Text to split into terms
    pub text: String,

    /// Output as a JSON array
    #[arg(long)]
    pub json: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "fuzzdoc",
            &mut std::io::stdout(),
        );
    }
}
