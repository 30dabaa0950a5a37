//! Command-line interface wiring for the `barcard` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! specialized submodules that encapsulate each command family.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod audit;
pub mod common;
pub mod encode;
pub mod render;
pub mod utils;
pub mod wallet;

/// Parsed CLI entrypoint for the `barcard` binary.
#[derive(Parser, Debug)]
#[command(
    name = "barcard",
    version,
    propagate_version = true,
    about = "Encode loyalty-card codes as Code 39, Code 128 or EAN-13 barcodes"
)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// High-level command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Encode(encode::EncodeCommand),
    #[command(subcommand)]
    Render(render::RenderCommand),
    #[command(subcommand)]
    Wallet(wallet::WalletCommand),
    #[command(subcommand)]
    Audit(audit::AuditCommand),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encode(cmd) => encode::handle(cmd),
        Command::Render(cmd) => render::handle(cmd),
        Command::Wallet(cmd) => wallet::handle(cmd),
        Command::Audit(cmd) => audit::handle(cmd),
    }
}
