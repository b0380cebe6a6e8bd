//! CLI for batchdl.

mod commands;
mod targets;

use anyhow::{Context, Result};
use batchdl_core::config::{self, BatchConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use commands::{run_batch, run_completions, run_man, run_show_config};

/// Top-level CLI for batchdl.
#[derive(Debug, Parser)]
#[command(name = "batchdl")]
#[command(
    about = "batchdl: run many downloads in parallel with an external tool",
    long_about = None
)]
pub struct Cli {
    /// Use this config file instead of ~/.config/batchdl/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every target, running up to N jobs at once.
    Run {
        /// Targets passed to the tool (a target may carry extra tool arguments
        /// after a space).
        targets: Vec<String>,
        /// Read more targets from FILE, one per line; blank lines and `#`
        /// comments are skipped.
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Run up to N jobs concurrently (default from config).
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,
        /// Directory to download into (overrides config and SONGS_DIR).
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// External download tool to invoke (default from config).
        #[arg(long, value_name = "PROG")]
        tool: Option<String>,
        /// Print the batch report as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file path and the effective configuration.
    Config,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                targets,
                input,
                jobs,
                output_dir,
                tool,
                json,
            } => {
                let mut cfg = load_config(cli.config.as_deref())?;
                apply_run_overrides(&mut cfg, jobs, output_dir, tool);
                cfg.validate()?;
                init_logging(&cfg);
                tracing::debug!("effective config: {:?}", cfg);

                let mut all_targets = targets;
                if let Some(path) = input {
                    all_targets.extend(targets::read_targets_file(&path)?);
                }
                run_batch(&cfg, all_targets, json).await
            }
            CliCommand::Config => {
                batchdl_core::logging::init_logging_stderr();
                let cfg = load_config(cli.config.as_deref())?;
                run_show_config(cli.config.as_deref(), &cfg)?;
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Completions { shell } => {
                run_completions(shell);
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Man => {
                run_man()?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

/// Config file (explicit or XDG default) with environment overrides applied.
fn load_config(path: Option<&Path>) -> Result<BatchConfig> {
    let mut cfg = match path {
        Some(p) => config::load_from_path(p)
            .with_context(|| format!("load config {}", p.display()))?,
        None => config::load_or_init()?,
    };
    cfg.apply_env();
    Ok(cfg)
}

/// Command-line flags win over config file and environment.
fn apply_run_overrides(
    cfg: &mut BatchConfig,
    jobs: Option<usize>,
    output_dir: Option<PathBuf>,
    tool: Option<String>,
) {
    if let Some(jobs) = jobs {
        cfg.concurrency = jobs;
    }
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    if let Some(tool) = tool {
        cfg.tool = tool;
    }
}

fn init_logging(cfg: &BatchConfig) {
    if let Err(err) = batchdl_core::logging::init_logging(cfg.log_file.as_deref()) {
        batchdl_core::logging::init_logging_stderr();
        tracing::warn!("log file unavailable, logging to stderr only: {:#}", err);
    }
}

#[cfg(test)]
mod tests;
