//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use barcard::Wallet;

/// Read a text file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return read_stdin();
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read the entire stdin stream into memory.
pub fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Convert a 1-based card position from the command line to an index.
pub fn card_index(position: usize, len: usize) -> Result<usize> {
    if len == 0 {
        return Err(anyhow!("wallet has no cards"));
    }
    if position == 0 || position > len {
        return Err(anyhow!("card {} out of range 1..{}", position, len));
    }
    Ok(position - 1)
}

/// Load a wallet file, attaching path context to any error.
pub fn load_wallet(path: &Path) -> Result<Wallet> {
    tracing::debug!(path = %path.display(), "loading wallet");
    Wallet::load(path).with_context(|| format!("failed to read wallet {}", path.display()))
}

/// Save a wallet after recording `action` in its history.
pub fn commit_wallet(wallet: &mut Wallet, path: &Path, action: String) -> Result<()> {
    tracing::info!(path = %path.display(), %action, "saving wallet");
    wallet.log_action(action);
    wallet
        .save(path)
        .with_context(|| format!("failed to save wallet {}", path.display()))
}
