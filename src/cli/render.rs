//! Rendering commands (`barcard render ...`).

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use barcard::{
    DEFAULT_COLOR, EncodedSymbol, ImageRenderOptions, Raster, encode_card, fit, parse_hex_color,
    render_symbol_image, resolve_color,
};
use clap::{Args, Subcommand};

use crate::cli::common::{
    DisplayArgs, ImageLayoutArg, RenderStyleArg, SelectorArg, WalletPathArg,
};
use crate::cli::utils::{card_index, load_wallet, write_output};

/// Available render subcommands.
#[derive(Subcommand, Debug)]
pub enum RenderCommand {
    /// Print a text rendering of the symbol.
    Ascii(RenderAsciiArgs),
    /// Render a PNG image of the symbol.
    Image(RenderImageArgs),
}

/// Where the code to render comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Inline code to render.
    #[arg(long)]
    pub code: Option<String>,
    /// 1-based position of a wallet card to render.
    #[arg(long)]
    pub card: Option<usize>,
}

/// Args for `barcard render ascii`.
#[derive(Args, Debug)]
pub struct RenderAsciiArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Symbology for inline codes.
    #[arg(long, default_value_t = SelectorArg::Auto, value_enum)]
    pub symbology: SelectorArg,
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// Rendering style.
    #[arg(long, default_value_t = RenderStyleArg::Block, value_enum)]
    pub style: RenderStyleArg,
    #[command(flatten)]
    pub display: DisplayArgs,
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Args for `barcard render image`.
#[derive(Args, Debug)]
pub struct RenderImageArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Symbology for inline codes.
    #[arg(long, default_value_t = SelectorArg::Auto, value_enum)]
    pub symbology: SelectorArg,
    #[command(flatten)]
    pub wallet: WalletPathArg,
    /// Output PNG file.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Pixels per module.
    #[arg(long = "module-px", default_value_t = 3)]
    pub module_px: u32,
    /// Bar height in pixels.
    #[arg(long, default_value_t = 120)]
    pub height: u32,
    /// Accent color (`#RRGGBB` or palette name); defaults to the card color.
    #[arg(long)]
    pub color: Option<String>,
    /// Blank modules on either side of the bars.
    #[arg(long = "quiet-zone", default_value_t = 10)]
    pub quiet_zone: u32,
    /// Output layout.
    #[arg(long, default_value_t = ImageLayoutArg::Plain, value_enum)]
    pub layout: ImageLayoutArg,
}

/// Execute a render command.
pub fn handle(command: RenderCommand) -> Result<()> {
    match command {
        RenderCommand::Ascii(args) => ascii(args),
        RenderCommand::Image(args) => image(args),
    }
}

/// Encoded symbol plus the card color, if it came from the wallet.
fn resolve_source(
    source: &SourceArgs,
    symbology: SelectorArg,
    wallet: &WalletPathArg,
) -> Result<(EncodedSymbol, Option<String>)> {
    if let Some(code) = source.code.as_deref() {
        let encoded = encode_card(code, symbology.into())
            .with_context(|| format!("failed to encode '{}'", code))?;
        return Ok((encoded, None));
    }
    let position = source
        .card
        .ok_or_else(|| anyhow!("either --code or --card is required"))?;
    let wallet_file = load_wallet(&wallet.wallet)?;
    let index = card_index(position, wallet_file.cards.len())?;
    let encoded = wallet_file.encode_card(index)?;
    Ok((encoded, Some(wallet_file.cards[index].color.clone())))
}

fn ascii(args: RenderAsciiArgs) -> Result<()> {
    let (encoded, _) = resolve_source(&args.source, args.symbology, &args.wallet)?;
    let placement = fit(&encoded.descriptor, &args.display.into())?;
    tracing::info!(
        symbology = %encoded.symbology,
        modules = placement.modules,
        module_px = placement.module_px,
        "rendering text symbol"
    );
    let output = Raster::from_descriptor(&encoded.descriptor).render(args.style.into());
    match args.output {
        Some(path) => {
            write_output(&path, &output)?;
            println!(
                "Wrote {} rendering of '{}' to {}",
                encoded.symbology,
                encoded.text,
                path.display()
            );
        }
        None => print!("{}", output),
    }
    Ok(())
}

fn image(args: RenderImageArgs) -> Result<()> {
    let (encoded, card_color) = resolve_source(&args.source, args.symbology, &args.wallet)?;
    let color = match args.color.as_deref() {
        Some(c) => resolve_color(c)?,
        None => card_color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
    };
    let options = ImageRenderOptions {
        module_px: args.module_px,
        bar_height_px: args.height,
        quiet_zone_modules: args.quiet_zone,
        layout: args.layout.into(),
        accent: parse_hex_color(&color)?,
    };

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
    }

    tracing::info!(
        symbology = %encoded.symbology,
        path = %args.output.display(),
        "rendering symbol image"
    );
    let image = render_symbol_image(&encoded.descriptor, &options)?;
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Rendered {} '{}' to {} ({}x{} px)",
        encoded.symbology,
        encoded.text,
        args.output.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
