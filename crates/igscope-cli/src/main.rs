mod run;
mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "igscope-cli")]
#[command(about = "Fetch public profiles and report engagement metrics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a batch of profiles and append successful results to the output file
    Run {
        /// Usernames to fetch; a leading `@` is ignored
        usernames: Vec<String>,
        /// JSON input document: `{"usernames": [...], "concurrency": N}`
        #[arg(long)]
        input: Option<PathBuf>,
        /// Maximum number of profiles fetched at once
        #[arg(long)]
        concurrency: Option<usize>,
        /// JSON-lines file successful results are appended to
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the usernames that would be fetched, then exit
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Also loads `.env`, so `RUST_LOG` may come from there.
    let config = igscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Run {
            usernames,
            input,
            concurrency,
            output,
            dry_run,
        }) => {
            run::run_profiles(
                &config,
                run::RunArgs {
                    usernames,
                    input,
                    concurrency,
                    output,
                    dry_run,
                },
            )
            .await?;
        }
        None => println!("igscope-cli: nothing to do; try `igscope-cli run --help`"),
    }

    Ok(())
}
