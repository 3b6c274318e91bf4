use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chanscrape::app::AppContext;
use chanscrape::cache::CachePolicy;
use chanscrape::cli::commands::{self, Output};
use chanscrape::cli::{Cli, Commands};
use chanscrape::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.client.base_url = base_url.clone();
    }
    if cli.no_cache {
        config.client.cache_enabled = false;
    }

    let ctx = AppContext::new(config)?;
    let output = Output {
        json: cli.json,
        policy: if cli.no_cache {
            CachePolicy::Bypass
        } else {
            CachePolicy::Use
        },
    };

    match cli.command {
        Commands::Boards => {
            commands::list_boards(&ctx, output).await?;
        }
        Commands::Threads {
            board,
            page,
            catalog,
        } => {
            commands::list_threads(&ctx, output, &board, page, catalog).await?;
        }
        Commands::Thread { board, id } => {
            commands::show_thread(&ctx, output, &board, &id).await?;
        }
        Commands::Search { query } => {
            commands::search(&ctx, output, &query).await?;
        }
        Commands::Post {
            board,
            title,
            text,
            image,
        } => {
            commands::create_thread(&ctx, output, &board, &title, &text, image.as_deref()).await?;
        }
        Commands::Reply {
            board,
            thread,
            text,
            image,
        } => {
            commands::reply(&ctx, output, &board, &thread, &text, image.as_deref()).await?;
        }
    }

    Ok(())
}
