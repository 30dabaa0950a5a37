//! Encoding helpers (`barcard encode ...`).

use anyhow::{Context, Result};
use barcard::{
    Ean13, Raster, Symbology, complete_ean13, compute_check_digit, encode_card, fit,
    is_plausible_ean,
};
use clap::{Args, Subcommand};

use crate::cli::common::{DisplayArgs, RenderStyleArg, SelectorArg};

/// Encode subcommands.
#[derive(Subcommand, Debug)]
pub enum EncodeCommand {
    /// Encode a code into a barcode symbol.
    Symbol(EncodeSymbolArgs),
    /// Compute the EAN/UPC check digit of a digit string.
    Check(EncodeCheckArgs),
}

/// Arguments for `barcard encode symbol`.
#[derive(Args, Debug)]
pub struct EncodeSymbolArgs {
    /// Code to encode.
    pub code: String,
    /// Symbology to use.
    #[arg(long, default_value_t = SelectorArg::Auto, value_enum)]
    pub symbology: SelectorArg,
    /// Text rendering style.
    #[arg(long, default_value_t = RenderStyleArg::Block, value_enum)]
    pub style: RenderStyleArg,
    #[command(flatten)]
    pub display: DisplayArgs,
}

/// Arguments for `barcard encode check`.
#[derive(Args, Debug)]
pub struct EncodeCheckArgs {
    /// Digits to compute the check digit over.
    pub digits: String,
}

/// Execute an encode command.
pub fn handle(command: EncodeCommand) -> Result<()> {
    match command {
        EncodeCommand::Symbol(args) => symbol(args),
        EncodeCommand::Check(args) => check(args),
    }
}

fn symbol(args: EncodeSymbolArgs) -> Result<()> {
    let encoded = encode_card(&args.code, args.symbology.into())
        .with_context(|| format!("failed to encode '{}'", args.code))?;
    tracing::debug!(
        symbology = %encoded.symbology,
        codewords = encoded.descriptor.len(),
        "encoded symbol"
    );
    let raster = Raster::from_descriptor(&encoded.descriptor);
    print!("{}", raster.render(args.style.into()));
    println!(
        "{} '{}': {} codewords, {} modules",
        encoded.symbology,
        encoded.text,
        encoded.descriptor.len(),
        encoded.descriptor.total_modules()
    );
    if encoded.symbology == Symbology::Ean13 {
        let parity = encoded
            .text
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .and_then(|d| Ean13::parity_letters(d as u8));
        if let Some(parity) = parity {
            println!("Left-half parity: {}", parity);
        }
    }
    match fit(&encoded.descriptor, &args.display.into()) {
        Ok(placement) => println!(
            "Fits display: {} px per module at offset {} px",
            placement.module_px, placement.offset_px
        ),
        Err(err) => {
            tracing::warn!(%err, "symbol does not fit the display");
            println!("{}", err);
        }
    }
    Ok(())
}

fn check(args: EncodeCheckArgs) -> Result<()> {
    let digits = args.digits.trim();
    let check = compute_check_digit(digits)
        .with_context(|| format!("cannot compute a check digit for '{}'", digits))?;
    println!("Check digit: {}", check);
    if is_plausible_ean(digits) {
        println!("'{}' is a valid EAN/UPC code", digits);
    }
    if let Some(full) = complete_ean13(digits) {
        println!("EAN-13: {}", full);
    }
    Ok(())
}
