// Copyright 2026 SA Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sa_scraper::cli::{self, GlobalOptions};
use sa_scraper::config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sa-scraper",
    about = "sa-scraper: seasonally-adjusted indicator values from a client-side charting page",
    version,
    after_help = "Run 'sa-scraper <command> --help' for details on each command."
)]
struct Cli {
    /// Target page hosting the indicator chart
    #[arg(long, global = true, env = config::TARGET_URL_ENV)]
    target_url: Option<String>,

    /// Browser executable (skips discovery)
    #[arg(long, global = true, env = sa_scraper::renderer::chromium::CHROMIUM_PATH_ENV)]
    chromium_path: Option<PathBuf>,

    /// Indicator catalog JSON file (defaults to the built-in catalog)
    #[arg(long, global = true, env = config::CATALOG_ENV)]
    catalog: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, env = config::HOST_ENV, default_value = config::DEFAULT_HOST)]
        host: String,
        /// Port to listen on
        #[arg(long, env = config::PORT_ENV, default_value_t = config::DEFAULT_PORT)]
        port: u16,
    },
    /// Scrape one indicator and print it as JSON
    Scrape {
        /// Indicator code (e.g. "CMP")
        indicator: String,
        /// Keep only the most recent N months
        #[arg(long)]
        months: Option<i64>,
        /// Print only the value for this date (site format, e.g. "10/1/2025")
        #[arg(long)]
        date: Option<String>,
    },
    /// Scrape several indicators one after another
    Batch {
        /// Indicator codes
        #[arg(required = true)]
        indicators: Vec<String>,
        /// Keep only the most recent N months of each
        #[arg(long)]
        months: Option<i64>,
    },
    /// List known indicators
    Indicators {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let opts = GlobalOptions {
        target_url: cli.target_url,
        chromium_path: cli.chromium_path,
        catalog: cli.catalog,
        verbose: cli.verbose,
        log_json: cli.log_json || config::json_logs_from_env(),
    };
    cli::init_tracing(opts.verbose, opts.log_json);

    let result = match cli.command {
        Commands::Serve { host, port } => cli::serve::run(&opts, &host, port).await,
        Commands::Scrape {
            indicator,
            months,
            date,
        } => cli::scrape_cmd::run(&opts, &indicator, months, date.as_deref()).await,
        Commands::Batch { indicators, months } => {
            cli::scrape_cmd::run_batch(&opts, &indicators, months).await
        }
        Commands::Indicators { json } => cli::indicators_cmd::run(&opts, json).await,
        Commands::Doctor => cli::doctor::run(&opts).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sa-scraper", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
