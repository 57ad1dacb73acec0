//! Command-line interface for the `seedqc` crate.
//!
//! Subcommands are implemented in separate files (modules) under `src/bin/seedqc/`:
//! - `qc_cmd.rs`: family / sequence / basepair QC tables
//! - `pid_cmd.rs`: pairwise identity
//! - `info_cmd.rs`: alignment summary and column annotations
//!
//! Shared input handling lives in `input.rs`.
use clap::{ArgAction, Parser, Subcommand};
use anyhow::Result;

#[derive(Debug, Parser)]
#[command(name="seedqc", version=env!("CARGO_PKG_VERSION"), about="Seed alignment QC: composition, identity, canonical basepairs and covariation", disable_help_subcommand=true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Family, per-sequence and per-basepair QC statistics.
    Qc(qc_cmd::QcCmd),
    /// Pairwise sequence identity.
    Pid(pid_cmd::PidCmd),
    /// Alignment summary, column coverage and identity line.
    Info(info_cmd::InfoCmd),
}

#[path = "seedqc/input.rs"] mod input;
#[path = "seedqc/qc_cmd.rs"] mod qc_cmd;
#[path = "seedqc/pid_cmd.rs"] mod pid_cmd;
#[path = "seedqc/info_cmd.rs"] mod info_cmd;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    match cli.command {
        Command::Qc(cmd) => qc_cmd::run(cmd),
        Command::Pid(cmd) => pid_cmd::run(cmd),
        Command::Info(cmd) => info_cmd::run(cmd),
    }
}
