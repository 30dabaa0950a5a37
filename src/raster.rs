use crate::encoding::SymbolDescriptor;
use std::fmt::{self, Write};
use thiserror::Error;

/// Blank modules reserved around the symbol when fitting it to a display.
const FIT_MARGIN_MODULES: usize = 20;
/// Pixels reserved at the display edges before a symbol counts as too long.
const FIT_MARGIN_PX: usize = 20;
const MIN_MODULE_PX: usize = 2;
const BLOCK_ROWS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Code too long! ({modules} modules, display fits {budget})")]
    TooLong { modules: usize, budget: usize },
}

/// Physical limits of the target display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBudget {
    pub width_px: usize,
    /// Number of drawable module slots.
    pub max_modules: usize,
}

impl Default for DisplayBudget {
    fn default() -> Self {
        Self {
            width_px: 336,
            max_modules: 15 * 11,
        }
    }
}

impl DisplayBudget {
    /// Largest module count this display accepts.
    pub fn capacity(&self) -> usize {
        self.max_modules
            .min(self.width_px.saturating_sub(FIT_MARGIN_PX) / 2)
    }
}

/// Where and how wide a fitted symbol is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub module_px: usize,
    pub offset_px: usize,
    pub modules: usize,
}

impl Placement {
    pub fn width_px(&self) -> usize {
        self.module_px * self.modules
    }
}

/// Choose a module width and horizontal offset for `descriptor`.
pub fn fit(descriptor: &SymbolDescriptor, budget: &DisplayBudget) -> Result<Placement, RenderError> {
    let modules = descriptor.total_modules();
    if modules > budget.max_modules || modules * 2 > budget.width_px.saturating_sub(FIT_MARGIN_PX) {
        return Err(RenderError::TooLong {
            modules,
            budget: budget.capacity(),
        });
    }
    let module_px = (budget.width_px / (modules + FIT_MARGIN_MODULES)).max(MIN_MODULE_PX);
    let offset_px = budget.width_px.saturating_sub(module_px * modules) / 2;
    Ok(Placement {
        module_px,
        offset_px,
        modules,
    })
}

/// A descriptor expanded to one flag per module (`true` = bar).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    modules: Vec<bool>,
    codeword_widths: Vec<u8>,
    codeword_bits: Vec<u16>,
}

impl Raster {
    pub fn from_descriptor(descriptor: &SymbolDescriptor) -> Self {
        Self {
            modules: descriptor.modules().collect(),
            codeword_widths: descriptor.codewords().iter().map(|c| c.width).collect(),
            codeword_bits: descriptor.codewords().iter().map(|c| c.bits).collect(),
        }
    }

    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Runs of adjacent bars as `(first module, run length)`.
    pub fn bar_runs(&self) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut start = None;
        for (idx, &bar) in self.modules.iter().enumerate() {
            match (bar, start) {
                (true, None) => start = Some(idx),
                (false, Some(s)) => {
                    runs.push((s, idx - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, self.modules.len() - s));
        }
        runs
    }

    pub fn render(&self, style: RenderStyle) -> String {
        match style {
            RenderStyle::Block => self.render_rows('█', ' ', BLOCK_ROWS),
            RenderStyle::Ascii01 => self.render_rows('1', '0', 1),
            RenderStyle::Bits => self.render_bits(),
        }
    }

    fn render_rows(&self, bar: char, space: char, rows: usize) -> String {
        let line: String = self
            .modules
            .iter()
            .map(|&m| if m { bar } else { space })
            .collect();
        let mut out = String::new();
        for _ in 0..rows {
            writeln!(&mut out, "{}", line).ok();
        }
        out
    }

    fn render_bits(&self) -> String {
        let tokens: Vec<String> = self
            .codeword_widths
            .iter()
            .zip(&self.codeword_bits)
            .map(|(width, bits)| format!("{}:{:0w$b}", width, bits, w = usize::from(*width)))
            .collect();
        let mut out = tokens.join(" ");
        out.push('\n');
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// Full-block characters for bars, several rows high
    Block,
    /// Use '1'/'0' for bar/space
    Ascii01,
    /// One `width:bits` token per codeword
    Bits,
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStyle::Block => write!(f, "block"),
            RenderStyle::Ascii01 => write!(f, "ascii-01"),
            RenderStyle::Bits => write!(f, "bits"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode_code39, encode_ean13};
    use pretty_assertions::assert_eq;

    #[test]
    fn ean13_fits_the_default_display() {
        let symbol = encode_ean13("5901234123457").unwrap();
        let placement = fit(&symbol, &DisplayBudget::default()).unwrap();
        // 336 / (95 + 20) = 2
        assert_eq!(
            placement,
            Placement {
                module_px: 2,
                offset_px: (336 - 190) / 2,
                modules: 95,
            }
        );
    }

    #[test]
    fn narrow_symbols_get_wider_modules() {
        let symbol = encode_code39("").unwrap();
        let placement = fit(&symbol, &DisplayBudget::default()).unwrap();
        // 336 / (26 + 20) = 7
        assert_eq!(placement.module_px, 7);
        assert_eq!(placement.offset_px, (336 - 7 * 26) / 2);
    }

    #[test]
    fn long_codes_are_rejected() {
        // 12 * 13 = 156 modules still fits, 15 * 13 = 195 does not
        let symbol = encode_code39("ABCDEFGHIJ").unwrap();
        assert!(fit(&symbol, &DisplayBudget::default()).is_ok());
        let symbol = encode_code39("ABCDEFGHIJKLM").unwrap();
        let err = fit(&symbol, &DisplayBudget::default()).unwrap_err();
        assert_eq!(
            err,
            RenderError::TooLong {
                modules: 195,
                budget: 158,
            }
        );
        assert_eq!(err.to_string(), "Code too long! (195 modules, display fits 158)");
    }

    #[test]
    fn module_slot_limit_applies_independently() {
        let symbol = encode_ean13("5901234123457").unwrap();
        let budget = DisplayBudget {
            width_px: 1000,
            max_modules: 90,
        };
        assert!(fit(&symbol, &budget).is_err());
    }

    #[test]
    fn raster_matches_descriptor() {
        let symbol = encode_ean13("5901234123457").unwrap();
        let raster = Raster::from_descriptor(&symbol);
        assert_eq!(raster.len(), symbol.total_modules());
        assert_eq!(&raster.modules()[..3], &[true, false, true]);
        let runs = raster.bar_runs();
        assert_eq!(runs.first(), Some(&(0, 1)));
        assert_eq!(runs.last(), Some(&(94, 1)));
        let bar_total: usize = runs.iter().map(|(_, len)| len).sum();
        assert_eq!(bar_total, raster.modules().iter().filter(|&&m| m).count());
    }

    #[test]
    fn text_renderings() {
        let symbol = encode_ean13("0000000000000").unwrap();
        let raster = Raster::from_descriptor(&symbol);
        let ascii = raster.render(RenderStyle::Ascii01);
        assert!(ascii.starts_with("1010001101"));
        assert_eq!(ascii.trim_end().len(), 95);
        let block = raster.render(RenderStyle::Block);
        assert_eq!(block.lines().count(), BLOCK_ROWS);
        let bits = raster.render(RenderStyle::Bits);
        assert!(bits.starts_with("3:101 7:0001101 "));
        assert!(bits.trim_end().ends_with("3:101"));
        assert_eq!(RenderStyle::Bits.to_string(), "bits");
    }
}
