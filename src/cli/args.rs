//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Turn unstructured troubleshooting documents into browsable decision trees
#[derive(Parser, Debug)]
#[command(name = "guidwire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a tree document
    Validate {
        /// Tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show tree metadata and structure
    Info {
        /// Tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Render the branch structure from the start node
        #[arg(long)]
        outline: bool,
    },

    /// Walk a tree interactively in the terminal
    Run {
        /// Tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Scan a folder of documents into a content manifest
    Ingest {
        /// Source folder to scan
        #[arg(value_hint = ValueHint::DirPath)]
        root: PathBuf,
        /// Content folder (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build and browse tree libraries
    Library {
        #[command(subcommand)]
        command: LibraryCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Library subcommands
#[derive(Subcommand, Debug)]
pub enum LibraryCommands {
    /// Generate a tree per ingested document and write the catalog
    Build {
        /// Content folder containing manifest.json (default from config)
        #[arg(short, long)]
        content_dir: Option<PathBuf>,
    },

    /// List catalog entries grouped by category
    List {
        /// Content folder (default from config)
        #[arg(short, long)]
        content_dir: Option<PathBuf>,
    },

    /// Search catalog entries by keyword
    Search {
        /// Keyword(s) to search for
        query: String,
        /// Content folder (default from config)
        #[arg(short, long)]
        content_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init,

    /// Show config paths
    Path,
}
