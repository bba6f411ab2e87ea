//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand, ValueEnum,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Analyze symbols and dependencies across a TypeScript project.
#[derive(Parser)]
#[command(
    name = "symshake",
    version,
    about = "Whole-project symbol and dependency analysis for TypeScript sources",
    styles = clap_cargo_style()
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Fail when the parser reports syntax errors
    #[arg(long, global = true)]
    pub strict: bool,

    /// Follow references to symbols imported from bare module specifiers
    #[arg(long, global = true)]
    pub include_node_modules: bool,

    /// Follow references to ambient standard-library symbols
    #[arg(long, global = true)]
    pub include_system: bool,

    /// Follow references to declarations used purely as types
    #[arg(long, global = true)]
    pub follow_types: bool,

    /// Extract files one at a time instead of on worker threads
    #[arg(long, global = true)]
    pub sequential: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the project graph and print statistics
    Analyze {
        /// Source files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Emit statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the live set from entry points and report the rest
    Shake {
        /// Entry point in `<file_key>:<name>` form (repeatable)
        #[arg(long = "entry", value_name = "ID", required = true)]
        entries: Vec<String>,

        /// Source files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Node cap for DOT output
        #[arg(long, default_value_t = 100)]
        max_nodes: usize,

        /// Restrict DOT output to included symbols
        #[arg(long)]
        included_only: bool,

        /// Append file:line to adjacency-list entries
        #[arg(long)]
        show_location: bool,
    },

    /// Enumerate circular dependencies
    Cycles {
        /// Source files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List everything that transitively depends on a symbol
    Impact {
        /// Target symbol in `<file_key>:<name>` form
        target: String,

        /// Source files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Rank symbols by dependency count
    Largest {
        /// How many symbols to show
        #[arg(short = 'k', long, default_value_t = 10)]
        count: usize,

        /// Source files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One-paragraph totals
    Text,
    /// Totals plus per-file symbol listings
    Detailed,
    Json,
    Markdown,
    Dot,
    /// Per-symbol dependency listing
    Adjacency,
}
