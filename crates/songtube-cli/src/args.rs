use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "songtube")]
#[command(author, version, about = "Resolve song queries to YouTube audio and download it")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for a song and print the accepted video URL
    Resolve {
        /// Search query, e.g. "<artist> <title>"
        query: String,

        #[command(flatten)]
        search: SearchOptions,
    },

    /// Download the audio of a video URL
    Download {
        /// YouTube video URL
        url: String,

        #[command(flatten)]
        download: DownloadOptions,
    },

    /// Search for a song and download its audio
    Get {
        /// Search query, e.g. "<artist> <title>"
        query: String,

        #[command(flatten)]
        search: SearchOptions,

        #[command(flatten)]
        download: DownloadOptions,
    },

    /// Search and download every query in a file
    Batch {
        /// File containing search queries (one per line)
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum songs processed at once
        #[arg(short, long)]
        parallel: Option<usize>,

        #[command(flatten)]
        search: SearchOptions,

        #[command(flatten)]
        download: DownloadOptions,
    },

    /// Check dependencies and credentials
    Doctor,

    /// Show configuration
    Config,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct SearchOptions {
    /// Reject videos this long or longer (seconds)
    #[arg(long)]
    pub max_length: Option<u64>,

    /// Reject videos with this many views or fewer
    #[arg(long)]
    pub min_views: Option<u64>,

    /// Number of search results to rank
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct DownloadOptions {
    /// Target audio bitrate in bits per second
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub bitrate: Option<u64>,

    /// Directory downloads are written to
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
