//! Rendering helpers for producing PNG output of barcode symbols.

mod paint;

pub use paint::{ImageLayout, ImageRenderOptions, parse_hex_color, render_symbol_image};
