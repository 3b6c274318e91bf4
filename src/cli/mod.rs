pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chanscrape")]
#[command(about = "Read and post to an imageboard from the terminal", long_about = None)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Always fetch fresh pages
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Site origin, overriding the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file (default: ~/.config/chanscrape/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List boards
    Boards,
    /// List threads on a board
    Threads {
        /// Board id, e.g. "b"
        board: String,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Read the catalog instead of the board index
        #[arg(long)]
        catalog: bool,
    },
    /// Show a thread with its replies
    Thread {
        board: String,
        id: String,
    },
    /// Search the site
    Search {
        query: String,
    },
    /// Start a new thread
    Post {
        board: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        text: String,

        /// Image to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Reply to a thread
    Reply {
        board: String,
        thread: String,

        #[arg(long)]
        text: String,

        /// Image to attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
}
