use anyhow::{Result, anyhow};
use image::imageops::overlay;
use image::{DynamicImage, ImageBuffer, Rgba};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::encoding::SymbolDescriptor;
use crate::raster::Raster;

const MAX_MODULE_PX: u32 = 64;
const MAX_BAR_HEIGHT_PX: u32 = 4096;
const MAX_IMAGE_WIDTH_PX: u32 = 16_384;

/// Visual framing of the generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    /// Bars and quiet zone only.
    Plain,
    /// Bars on a card with a colored header band, as shown in the wallet.
    Card,
}

/// Options controlling PNG generation.
#[derive(Debug, Clone, Copy)]
pub struct ImageRenderOptions {
    pub module_px: u32,
    pub bar_height_px: u32,
    pub quiet_zone_modules: u32,
    pub layout: ImageLayout,
    pub accent: Rgba<u8>,
}

impl Default for ImageRenderOptions {
    fn default() -> Self {
        Self {
            module_px: 3,
            bar_height_px: 120,
            quiet_zone_modules: 10,
            layout: ImageLayout::Plain,
            accent: rgba(0x12, 0xd6, 0x12, 0xff),
        }
    }
}

struct Palette {
    background: Rgba<u8>,
    bar: Rgba<u8>,
    card_bg: Rgba<u8>,
    border: Rgba<u8>,
}

const PALETTE: Palette = Palette {
    background: Rgba([0xff, 0xff, 0xff, 0xff]),
    bar: Rgba([0x00, 0x00, 0x00, 0xff]),
    card_bg: Rgba([0x1c, 0x1c, 0x1c, 0xff]),
    border: Rgba([0x40, 0x40, 0x40, 0xff]),
};

/// Rasterise a symbol into an RGBA image.
pub fn render_symbol_image(
    descriptor: &SymbolDescriptor,
    options: &ImageRenderOptions,
) -> Result<DynamicImage> {
    let module_px = options.module_px.clamp(1, MAX_MODULE_PX);
    let bar_height = options.bar_height_px.clamp(1, MAX_BAR_HEIGHT_PX);
    let raster = Raster::from_descriptor(descriptor);
    if raster.is_empty() {
        return Err(anyhow!("symbol has no modules to draw"));
    }

    let too_wide = || anyhow!("symbol with {} modules is too wide", raster.len());
    let quiet_px = options
        .quiet_zone_modules
        .checked_mul(module_px)
        .ok_or_else(too_wide)?;
    let bars_width = u32::try_from(raster.len())
        .ok()
        .and_then(|modules| modules.checked_mul(module_px))
        .zip(quiet_px.checked_mul(2))
        .and_then(|(bars, quiet)| bars.checked_add(quiet))
        .filter(|&width| width <= MAX_IMAGE_WIDTH_PX)
        .ok_or_else(too_wide)?;

    let mut symbol_img = ImageBuffer::from_pixel(bars_width, bar_height, PALETTE.background);
    for (start, len) in raster.bar_runs() {
        let x = quiet_px + start as u32 * module_px;
        draw_filled_rect_mut(
            &mut symbol_img,
            Rect::at(x as i32, 0).of_size(len as u32 * module_px, bar_height),
            PALETTE.bar,
        );
    }

    let final_image = match options.layout {
        ImageLayout::Plain => DynamicImage::ImageRgba8(symbol_img),
        ImageLayout::Card => {
            let margin = (bar_height / 8).max(4);
            let header = (bar_height / 4).max(8);
            let card_width = bars_width + 2 * margin;
            let card_height = header + bar_height + 3 * margin;
            let mut card = ImageBuffer::from_pixel(card_width, card_height, PALETTE.card_bg);
            draw_filled_rect_mut(
                &mut card,
                Rect::at(0, 0).of_size(card_width, header),
                options.accent,
            );
            draw_hollow_rect_mut(
                &mut card,
                Rect::at(0, 0).of_size(card_width, card_height),
                PALETTE.border,
            );
            overlay(
                &mut card,
                &symbol_img,
                i64::from(margin),
                i64::from(header + 2 * margin),
            );
            DynamicImage::ImageRgba8(card)
        }
    };

    Ok(final_image)
}

/// Parse `#RRGGBB` (leading `#` optional) into an opaque color.
pub fn parse_hex_color(input: &str) -> Result<Rgba<u8>> {
    let hex = input.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(anyhow!("color '{}' is not of the form #RRGGBB", input));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    Ok(rgba(channel(0)?, channel(2)?, channel(4)?, 0xff))
}

fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_ean13;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_image_dimensions_and_bars() {
        let symbol = encode_ean13("5901234123457").unwrap();
        let options = ImageRenderOptions {
            module_px: 2,
            bar_height_px: 50,
            quiet_zone_modules: 10,
            ..ImageRenderOptions::default()
        };
        let image = render_symbol_image(&symbol, &options).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), ((95 + 20) * 2, 50));
        // quiet zone, then the start guard bar at module 0
        assert_eq!(*image.get_pixel(0, 10), PALETTE.background);
        assert_eq!(*image.get_pixel(20, 10), PALETTE.bar);
        assert_eq!(*image.get_pixel(21, 10), PALETTE.bar);
        assert_eq!(*image.get_pixel(22, 10), PALETTE.background);
    }

    #[test]
    fn card_layout_paints_the_accent_band() {
        let symbol = encode_ean13("5901234123457").unwrap();
        let accent = parse_hex_color("#FF4949").unwrap();
        let options = ImageRenderOptions {
            layout: ImageLayout::Card,
            accent,
            ..ImageRenderOptions::default()
        };
        let image = render_symbol_image(&symbol, &options).unwrap().to_rgba8();
        let (width, _) = image.dimensions();
        assert_eq!(*image.get_pixel(width / 2, 5), accent);
    }

    #[test]
    fn oversized_quiet_zone_is_an_error() {
        let symbol = encode_ean13("5901234123457").unwrap();
        let options = ImageRenderOptions {
            module_px: 64,
            quiet_zone_modules: 100_000_000,
            ..ImageRenderOptions::default()
        };
        let err = render_symbol_image(&symbol, &options).unwrap_err();
        assert!(err.to_string().contains("too wide"));

        let options = ImageRenderOptions {
            module_px: 64,
            quiet_zone_modules: 200,
            ..ImageRenderOptions::default()
        };
        assert!(render_symbol_image(&symbol, &options).is_err());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#12D612").unwrap(), rgba(0x12, 0xd6, 0x12, 0xff));
        assert_eq!(parse_hex_color("6fd4ed").unwrap(), rgba(0x6f, 0xd4, 0xed, 0xff));
        assert!(parse_hex_color("#12D61").is_err());
        assert!(parse_hex_color("#12D61G").is_err());
    }
}
