use clap::{Parser, Subcommand};
use reelname_common::ProviderKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelname")]
#[command(author, version, about = "Resolve media filenames against metadata providers")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up metadata for one or more files
    Resolve {
        /// Files to resolve
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Query only this provider
        #[arg(short, long)]
        provider: Option<ProviderKind>,

        /// Output records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename files from their resolved metadata
    Rename {
        /// Files to rename
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Query only this provider
        #[arg(short, long)]
        provider: Option<ProviderKind>,

        /// Naming pattern (defaults to the configured movie or TV pattern)
        #[arg(long)]
        pattern: Option<String>,

        /// Show what would be renamed without touching files
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse filenames offline and show what was extracted
    Parse {
        /// Filenames to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List metadata providers and whether they are usable
    Providers,

    /// Download the AniDB title list again
    RefreshTitles,

    /// Write a default configuration file
    Init {
        /// Where to write the file
        #[arg(default_value = "reelname.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
