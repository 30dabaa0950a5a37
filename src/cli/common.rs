//! Shared clap helper types for CLI commands.

use std::path::PathBuf;

use barcard::{DisplayBudget, ImageLayout, RenderStyle, Selector};
use clap::{Args, ValueEnum};

/// Encoding selectors accepted by CLI commands.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SelectorArg {
    /// EAN-13/UPC when the code checks out, Code 128 otherwise.
    Auto,
    Code128,
    Code39,
}

impl From<SelectorArg> for Selector {
    fn from(value: SelectorArg) -> Selector {
        match value {
            SelectorArg::Auto => Selector::Auto,
            SelectorArg::Code128 => Selector::Code128,
            SelectorArg::Code39 => Selector::Code39,
        }
    }
}

/// Text render styles.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RenderStyleArg {
    Block,
    #[value(name = "ascii-01")]
    Ascii01,
    Bits,
}

impl From<RenderStyleArg> for RenderStyle {
    fn from(value: RenderStyleArg) -> Self {
        match value {
            RenderStyleArg::Block => RenderStyle::Block,
            RenderStyleArg::Ascii01 => RenderStyle::Ascii01,
            RenderStyleArg::Bits => RenderStyle::Bits,
        }
    }
}

/// Output layout options for image rendering.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ImageLayoutArg {
    Plain,
    Card,
}

impl From<ImageLayoutArg> for ImageLayout {
    fn from(value: ImageLayoutArg) -> ImageLayout {
        match value {
            ImageLayoutArg::Plain => ImageLayout::Plain,
            ImageLayoutArg::Card => ImageLayout::Card,
        }
    }
}

/// Location of the wallet file.
#[derive(Args, Debug, Clone)]
pub struct WalletPathArg {
    /// Wallet file (JSONL).
    #[arg(long = "wallet", env = "BARCARD_WALLET", default_value = "wallet.jsonl")]
    pub wallet: PathBuf,
}

/// Display the symbol has to fit on.
#[derive(Args, Debug, Clone, Copy)]
pub struct DisplayArgs {
    /// Display width in pixels.
    #[arg(long = "display-width", default_value_t = 336)]
    pub display_width: usize,
    /// Number of module slots the display can draw.
    #[arg(long = "max-modules", default_value_t = 165)]
    pub max_modules: usize,
}

impl From<DisplayArgs> for DisplayBudget {
    fn from(value: DisplayArgs) -> DisplayBudget {
        DisplayBudget {
            width_px: value.display_width,
            max_modules: value.max_modules,
        }
    }
}
