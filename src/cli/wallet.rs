//! Wallet lifecycle commands (`barcard wallet ...`).

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use barcard::{Backup, Card, MAX_CARDS, Raster, Wallet, WalletHeader, fit};
use chrono::Utc;
use clap::{Args, Subcommand, ValueEnum};

use crate::cli::common::{DisplayArgs, RenderStyleArg, SelectorArg, WalletPathArg};
use crate::cli::utils::{card_index, commit_wallet, load_wallet, read_input, write_output};

/// Supported `barcard wallet` subcommands.
#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    /// Create an empty wallet file.
    Init(WalletInitArgs),
    /// Add a card to the wallet.
    Add(WalletAddArgs),
    /// Change name, code, color or symbology of a card.
    Edit(WalletEditArgs),
    /// Remove a card.
    Remove(WalletRemoveArgs),
    /// Move a card to another position.
    Move(WalletMoveArgs),
    /// List all cards.
    List(WalletListArgs),
    /// Display a card's barcode.
    Show(WalletShowArgs),
    /// Write the wallet as a JSON backup document.
    Export(WalletExportArgs),
    /// Replace all cards with the contents of a JSON backup.
    Import(WalletImportArgs),
    /// Toggle maximum display brightness.
    Bright(WalletBrightArgs),
}

/// Arguments for `barcard wallet init`.
#[derive(Args, Debug)]
pub struct WalletInitArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// Overwrite an existing wallet file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `barcard wallet add`.
#[derive(Args, Debug)]
pub struct WalletAddArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// Code printed on the card.
    pub code: String,
    /// Display name of the card.
    #[arg(short = 'n', long, default_value = "")]
    pub name: String,
    /// Card color (`#RRGGBB` or palette name).
    #[arg(short = 'c', long)]
    pub color: Option<String>,
    /// Symbology used to display the code.
    #[arg(long, default_value_t = SelectorArg::Auto, value_enum)]
    pub symbology: SelectorArg,
    /// Insert at this 1-based position instead of appending.
    #[arg(long)]
    pub at: Option<usize>,
}

/// Arguments for `barcard wallet edit`.
#[derive(Args, Debug)]
pub struct WalletEditArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// 1-based card position.
    pub position: usize,
    /// New code.
    #[arg(long)]
    pub code: Option<String>,
    /// New display name.
    #[arg(short = 'n', long)]
    pub name: Option<String>,
    /// New color (`#RRGGBB` or palette name).
    #[arg(short = 'c', long)]
    pub color: Option<String>,
    /// New symbology.
    #[arg(long, value_enum)]
    pub symbology: Option<SelectorArg>,
}

/// Arguments for `barcard wallet remove`.
#[derive(Args, Debug)]
pub struct WalletRemoveArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// 1-based card position.
    pub position: usize,
}

/// Arguments for `barcard wallet move`.
#[derive(Args, Debug)]
pub struct WalletMoveArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// Current 1-based position.
    pub from: usize,
    /// Target 1-based position.
    pub to: usize,
}

/// Arguments for `barcard wallet list`.
#[derive(Args, Debug)]
pub struct WalletListArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
}

/// Arguments for `barcard wallet show`.
#[derive(Args, Debug)]
pub struct WalletShowArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// 1-based card position.
    #[arg(default_value_t = 1)]
    pub position: usize,
    /// Step forwards (positive) or backwards from `position`, wrapping around.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub step: isize,
    /// Rendering style.
    #[arg(long, default_value_t = RenderStyleArg::Block, value_enum)]
    pub style: RenderStyleArg,
    #[command(flatten)]
    pub display: DisplayArgs,
}

/// Arguments for `barcard wallet export`.
#[derive(Args, Debug)]
pub struct WalletExportArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
}

/// Arguments for `barcard wallet import`.
#[derive(Args, Debug)]
pub struct WalletImportArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// Backup document to read (`-` for stdin).
    pub source: PathBuf,
}

/// Arguments for `barcard wallet bright`.
#[derive(Args, Debug)]
pub struct WalletBrightArgs {
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// New brightness mode.
    #[arg(value_enum)]
    pub mode: BrightMode,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum BrightMode {
    On,
    Off,
}

/// Execute a wallet command.
pub fn handle(command: WalletCommand) -> Result<()> {
    match command {
        WalletCommand::Init(args) => init(args),
        WalletCommand::Add(args) => add(args),
        WalletCommand::Edit(args) => edit(args),
        WalletCommand::Remove(args) => remove(args),
        WalletCommand::Move(args) => move_card(args),
        WalletCommand::List(args) => list(args),
        WalletCommand::Show(args) => show(args),
        WalletCommand::Export(args) => export(args),
        WalletCommand::Import(args) => import(args),
        WalletCommand::Bright(args) => bright(args),
    }
}

fn init(args: WalletInitArgs) -> Result<()> {
    let path = args.wallet.wallet;
    if path.exists() && !args.force {
        return Err(anyhow!(
            "wallet {} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    let mut wallet = Wallet::new(WalletHeader::new());
    commit_wallet(&mut wallet, &path, "wallet init".to_string())?;
    println!("Created wallet {}", path.display());
    Ok(())
}

/// Encode the card once so that unencodable codes are reported up front.
fn warn_if_unencodable(card: &Card) {
    if let Err(err) = card.encode() {
        tracing::warn!(code = %card.code, %err, "card code cannot be displayed");
        eprintln!("warning: {}", err);
    }
}

fn add(args: WalletAddArgs) -> Result<()> {
    let path = args.wallet.wallet;
    let mut wallet = load_wallet(&path)?;
    let card = Card::new(
        args.name,
        args.code,
        args.color.as_deref(),
        args.symbology.into(),
    )?;
    warn_if_unencodable(&card);
    let position = match args.at {
        Some(at) => {
            let index = card_index(at, wallet.cards.len() + 1)?;
            wallet.insert_card(index, card.clone())?;
            at
        }
        None => {
            wallet.append_card(card.clone())?;
            wallet.cards.len()
        }
    };
    commit_wallet(
        &mut wallet,
        &path,
        format!("add card {} '{}'", position, card.name),
    )?;
    println!(
        "Added '{}' as card {} of {} ({})",
        card.name,
        position,
        MAX_CARDS,
        card.selector.label()
    );
    Ok(())
}

fn edit(args: WalletEditArgs) -> Result<()> {
    let path = args.wallet.wallet;
    let mut wallet = load_wallet(&path)?;
    let index = card_index(args.position, wallet.cards.len())?;
    let current = wallet.get(index)?.clone();
    let card = Card::new(
        args.name.unwrap_or(current.name),
        args.code.unwrap_or(current.code),
        Some(args.color.as_deref().unwrap_or(&current.color)),
        args.symbology.map(Into::into).unwrap_or(current.selector),
    )?;
    warn_if_unencodable(&card);
    let name = card.name.clone();
    wallet.replace_card(index, card)?;
    commit_wallet(
        &mut wallet,
        &path,
        format!("edit card {} '{}'", args.position, name),
    )?;
    println!("Updated card {} '{}'", args.position, name);
    Ok(())
}

fn remove(args: WalletRemoveArgs) -> Result<()> {
    let path = args.wallet.wallet;
    let mut wallet = load_wallet(&path)?;
    let index = card_index(args.position, wallet.cards.len())?;
    let card = wallet.remove_card(index)?;
    commit_wallet(
        &mut wallet,
        &path,
        format!("remove card {} '{}'", args.position, card.name),
    )?;
    println!("Removed card {} '{}'", args.position, card.name);
    Ok(())
}

fn move_card(args: WalletMoveArgs) -> Result<()> {
    let path = args.wallet.wallet;
    let mut wallet = load_wallet(&path)?;
    let from = card_index(args.from, wallet.cards.len())?;
    let to = card_index(args.to, wallet.cards.len())?;
    wallet.move_card(from, to)?;
    commit_wallet(
        &mut wallet,
        &path,
        format!("move card {} to {}", args.from, args.to),
    )?;
    println!("Moved card {} to position {}", args.from, args.to);
    Ok(())
}

fn list(args: WalletListArgs) -> Result<()> {
    let wallet = load_wallet(&args.wallet.wallet)?;
    if wallet.cards.is_empty() {
        println!("No cards yet. Add one with `barcard wallet add`.");
    }
    for (idx, card) in wallet.cards.iter().enumerate() {
        let name = if card.name.is_empty() {
            "(unnamed)"
        } else {
            card.name.as_str()
        };
        println!(
            "{:>2}. {:<20} {:<17} {} {}",
            idx + 1,
            name,
            card.selector.label(),
            card.color,
            card.code
        );
    }
    println!(
        "{}/{} cards, bright: {}",
        wallet.cards.len(),
        MAX_CARDS,
        if wallet.header.bright { "on" } else { "off" }
    );
    let ago = wallet.saved_ago(Utc::now());
    if !ago.is_empty() {
        println!("{}", ago);
    }
    Ok(())
}

fn show(args: WalletShowArgs) -> Result<()> {
    let wallet = load_wallet(&args.wallet.wallet)?;
    let start = card_index(args.position, wallet.cards.len())?;
    let index = wallet
        .cycle(start, args.step)
        .ok_or_else(|| anyhow!("wallet has no cards"))?;
    let card = wallet.get(index)?;
    let encoded = wallet.encode_card(index)?;
    println!(
        "[{}/{}] {} ({})",
        index + 1,
        wallet.cards.len(),
        card.name,
        encoded.symbology
    );
    match fit(&encoded.descriptor, &args.display.into()) {
        Ok(placement) => {
            tracing::debug!(
                module_px = placement.module_px,
                offset_px = placement.offset_px,
                "card fits display"
            );
            print!(
                "{}",
                Raster::from_descriptor(&encoded.descriptor).render(args.style.into())
            );
        }
        Err(err) => println!("{}", err),
    }
    println!("{}", encoded.text);
    Ok(())
}

fn export(args: WalletExportArgs) -> Result<()> {
    let wallet = load_wallet(&args.wallet.wallet)?;
    let mut json = wallet.export_backup()?;
    json.push('\n');
    write_output(&args.output, &json)?;
    if args.output.as_os_str() != "-" {
        println!(
            "Exported {} card(s) to {}",
            wallet.cards.len(),
            args.output.display()
        );
    }
    Ok(())
}

fn import(args: WalletImportArgs) -> Result<()> {
    let path = args.wallet.wallet;
    let json = read_input(&args.source)?;
    if let Ok(backup) = serde_json::from_str::<Backup>(&json) {
        for (idx, entry) in backup.barcodes.iter().take(MAX_CARDS).enumerate() {
            if entry.has_invalid_color() && !entry.code.trim().is_empty() {
                tracing::warn!(
                    entry = idx + 1,
                    color = entry.color.as_deref().unwrap_or_default(),
                    "unusable color in backup, using default"
                );
            }
        }
        if backup.barcodes.len() > MAX_CARDS {
            tracing::warn!(
                entries = backup.barcodes.len(),
                kept = MAX_CARDS,
                "backup holds more entries than a wallet can store"
            );
        }
    }
    let mut wallet = if path.exists() {
        load_wallet(&path)?
    } else {
        Wallet::new(WalletHeader::new())
    };
    let count = wallet
        .import_backup(&json)
        .with_context(|| format!("failed to import {}", args.source.display()))?;
    commit_wallet(
        &mut wallet,
        &path,
        format!("import {} card(s) from {}", count, args.source.display()),
    )?;
    println!("Imported {} card(s) into {}", count, path.display());
    Ok(())
}

fn bright(args: WalletBrightArgs) -> Result<()> {
    let path = args.wallet.wallet;
    let mut wallet = load_wallet(&path)?;
    wallet.header.bright = matches!(args.mode, BrightMode::On);
    let state = if wallet.header.bright { "on" } else { "off" };
    commit_wallet(&mut wallet, &path, format!("bright {}", state))?;
    println!("Brightness boost {}", state);
    Ok(())
}
