use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use lab_preflight::build_info;
use lab_preflight::config::PreflightConfig;
use lab_preflight::env::EnvSnapshot;
use lab_preflight::health::{self, reporter};

/// Exit code for failures of the tool itself (bad config file, etc.)
const TOOL_ERROR: i32 = 2;

/// Verify the chatbot's environment before starting it
#[derive(Debug, Parser)]
#[command(name = "lab-preflight", version, long_version = build_info::long_version())]
struct Cli {
    /// Dotenv file merged into the environment before the checks run
    /// (defaults to the nearest .env in this or a parent directory)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Skip loading the dotenv file
    #[arg(long, conflicts_with = "env_file")]
    no_env_file: bool,

    /// Preflight config file (defaults to config/preflight.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Timeout for each network check, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Render the summary as a table with durations
    #[arg(long)]
    table: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let mut config = PreflightConfig::load(cli.config.as_deref())
        .context("failed to load preflight configuration")?;
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    let env = if cli.no_env_file {
        EnvSnapshot::from_process()
    } else {
        EnvSnapshot::load(cli.env_file.as_deref()).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable env file");
            EnvSnapshot::from_process()
        })
    };

    println!("{}", reporter::format_banner());

    let runner = health::default_runner(&config);
    let mut first = true;
    let report = runner.run_with(
        &env,
        |check| {
            if !first {
                println!();
            }
            first = false;
            println!("{}", reporter::format_check_heading(check));
        },
        |_, result| println!("{}", reporter::format_check_details(result)),
    );

    reporter::print_report(&report, &config.next_steps, cli.table);

    Ok(report.exit_code())
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            TOOL_ERROR
        }
    };

    std::process::exit(code);
}
