// Copyright 2026 Navscope Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use navscope::cli;
use navscope::pipeline::WaitPlan;

#[derive(Parser)]
#[command(
    name = "navscope",
    about = "Navscope — ten-year NAV, share price, and discount workbooks for investment trusts",
    version,
    after_help = "Run 'navscope <command> --help' for details on each command."
)]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every company URL in the list and write one workbook each
    Run {
        /// CSV file with a URL column of company detail pages
        #[arg(long, default_value = "urls.csv")]
        urls: PathBuf,
        /// Directory for the generated workbooks
        #[arg(long, default_value = "Results")]
        out_dir: PathBuf,
        /// Navigation deadline per page in milliseconds
        #[arg(long, default_value = "30000")]
        nav_timeout: u64,
        /// Wait after navigation before scrolling, in milliseconds
        #[arg(long, default_value = "2000")]
        settle_ms: u64,
        /// Wait for the chart to load after scrolling, in milliseconds
        #[arg(long, default_value = "10000")]
        chart_ms: u64,
        /// Wait for the refetch after clicking ten-year, in milliseconds
        #[arg(long, default_value = "5000")]
        click_ms: u64,
    },
    /// Fetch one security directly by Morningstar id (no browser)
    Fetch {
        /// Morningstar security id (e.g. "F00000ABCD")
        #[arg(long)]
        id: String,
        /// Series start date, YYYY-MM-DD
        #[arg(long)]
        start_date: String,
        /// Series end date, YYYY-MM-DD
        #[arg(long)]
        end_date: String,
        /// Workbook name (defaults to the id)
        #[arg(long)]
        name: Option<String>,
        /// Directory for the generated workbook
        #[arg(long, default_value = "Results")]
        out_dir: PathBuf,
    },
    /// Build urls.csv from the AIC find-and-compare listing
    Discover {
        /// Number of listing pages to walk
        #[arg(long, default_value = "20")]
        pages: usize,
        /// Wait per listing page before reading rows, in milliseconds
        #[arg(long, default_value = "5000")]
        settle_ms: u64,
        /// Output CSV path
        #[arg(long, default_value = "urls.csv")]
        out: PathBuf,
    },
    /// Check environment and diagnose issues
    Doctor {
        /// Output directory to probe
        #[arg(long, default_value = "Results")]
        out_dir: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.quiet {
        std::env::set_var("NAVSCOPE_QUIET", "1");
    }

    let directive = if cli.verbose {
        "navscope=debug"
    } else {
        "navscope=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            urls,
            out_dir,
            nav_timeout,
            settle_ms,
            chart_ms,
            click_ms,
        } => {
            let waits = WaitPlan {
                nav_timeout_ms: nav_timeout,
                settle_ms,
                chart_ms,
                click_ms,
            };
            cli::run_cmd::run(&urls, &out_dir, waits).await
        }
        Commands::Fetch {
            id,
            start_date,
            end_date,
            name,
            out_dir,
        } => cli::fetch_cmd::run(&id, &start_date, &end_date, name.as_deref(), &out_dir).await,
        Commands::Discover {
            pages,
            settle_ms,
            out,
        } => cli::discover_cmd::run(pages, settle_ms, &out).await,
        Commands::Doctor { out_dir } => cli::doctor::run(&out_dir).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "navscope", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
