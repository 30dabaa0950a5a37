//! Audit and hashing commands (`barcard audit ...`).

use crate::cli::common::WalletPathArg;
use crate::cli::utils::load_wallet;
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};

/// Audit subcommands.
#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Compute SHA-256 hash over wallet content.
    Hash(AuditHashArgs),
    /// Show audited history events.
    Log(AuditLogArgs),
}

/// Arguments for `barcard audit hash`.
#[derive(Args, Debug)]
pub struct AuditHashArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
}

/// Arguments for `barcard audit log`.
#[derive(Args, Debug)]
pub struct AuditLogArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
}

/// Execute an audit command.
pub fn handle(command: AuditCommand) -> Result<()> {
    match command {
        AuditCommand::Hash(args) => hash(args),
        AuditCommand::Log(args) => log(args),
    }
}

fn hash(args: AuditHashArgs) -> Result<()> {
    let path = &args.wallet.wallet;
    let wallet = load_wallet(path)?;
    println!("{}  {}", wallet.hash()?, path.display());
    Ok(())
}

fn log(args: AuditLogArgs) -> Result<()> {
    let wallet = load_wallet(&args.wallet.wallet)?;
    let history = &wallet.header.history;
    if history.is_empty() {
        println!("No audit events recorded.");
        return Ok(());
    }
    for event in history {
        println!(
            "{} {} - {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.actor,
            event.action
        );
    }
    let ago = wallet.saved_ago(Utc::now());
    if !ago.is_empty() {
        println!("{}", ago);
    }
    Ok(())
}
