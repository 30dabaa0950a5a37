//! Core library for 1D barcode encoding and card wallet management.
//!
//! The encoders ([`encode_code39`], [`encode_code128`], [`encode_ean13`]) are
//! pure functions over static tables; the remaining modules are the glue a
//! front end needs to pick an encoder, fit the result to a display and keep
//! a list of cards.

mod check_digit;
mod code128;
mod code39;
mod dispatch;
mod ean13;
mod encoding;
mod image;
mod raster;
mod wallet;

pub use check_digit::{complete_ean13, compute_check_digit, is_plausible_ean};
pub use code39::{CODE39_ALPHABET, Code39, encode_code39};
pub use code128::{Code128, Subset, encode_code128};
pub use dispatch::{EncodedSymbol, Selector, encode_card};
pub use ean13::{EAN13_MODULES, Ean13, encode_ean13};
pub use encoding::{Codeword, EncodeError, SymbolDescriptor, SymbolEncoder, Symbology};
pub use self::image::{ImageLayout, ImageRenderOptions, parse_hex_color, render_symbol_image};
pub use raster::{DisplayBudget, Placement, Raster, RenderError, RenderStyle, fit};
pub use wallet::{
    AuditEvent, Backup, BackupEntry, Card, DEFAULT_COLOR, MAX_CARDS, PALETTE, Wallet, WalletHeader,
    resolve_color,
};
