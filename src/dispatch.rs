//! Selector-driven choice of encoder for a card's code.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::check_digit::complete_ean13;
use crate::code128::Code128;
use crate::code39::Code39;
use crate::ean13::Ean13;
use crate::encoding::{EncodeError, SymbolDescriptor, SymbolEncoder, Symbology};

/// Encoding requested for a card. `Auto` tries EAN/UPC first and falls back
/// to Code 128.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    #[default]
    Auto,
    Code128,
    Code39,
}

impl Selector {
    /// Numeric type used by the backup format: 0 = auto, 1 = Code 128, 2 = Code 39.
    pub fn type_code(self) -> u8 {
        match self {
            Selector::Auto => 0,
            Selector::Code128 => 1,
            Selector::Code39 => 2,
        }
    }

    /// Unknown codes fall back to `Auto`.
    pub fn from_type_code(code: u8) -> Self {
        match code {
            1 => Selector::Code128,
            2 => Selector::Code39,
            _ => Selector::Auto,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Selector::Auto => "EAN/UPC/Code-128",
            Selector::Code128 => "Code-128",
            Selector::Code39 => "Code-39",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Auto => write!(f, "auto"),
            Selector::Code128 => write!(f, "code128"),
            Selector::Code39 => write!(f, "code39"),
        }
    }
}

/// A symbol together with the symbology and text that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSymbol {
    pub symbology: Symbology,
    /// Text actually encoded; for EAN-13 this is the completed 13-digit code.
    pub text: String,
    pub descriptor: SymbolDescriptor,
}

/// Encode `code` the way a card with `selector` is displayed.
pub fn encode_card(code: &str, selector: Selector) -> Result<EncodedSymbol, EncodeError> {
    let (encoder, text) = match selector {
        Selector::Code39 => (&Code39 as &dyn SymbolEncoder, code.to_string()),
        Selector::Code128 => (&Code128 as &dyn SymbolEncoder, code.to_string()),
        Selector::Auto => match complete_ean13(code) {
            Some(full) => (&Ean13 as &dyn SymbolEncoder, full),
            None => (&Code128 as &dyn SymbolEncoder, code.to_string()),
        },
    };
    let descriptor = encoder.encode(&text)?;
    Ok(EncodedSymbol {
        symbology: encoder.symbology(),
        text,
        descriptor,
    })
}
