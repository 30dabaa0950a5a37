use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One lookup-table entry: a run of `width` modules packed into the low bits
/// of `bits`, read from the most significant of those bits downwards.
/// A set bit is a bar, a clear bit is a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codeword {
    pub bits: u16,
    pub width: u8,
}

impl Codeword {
    pub const fn new(bits: u16, width: u8) -> Self {
        Self { bits, width }
    }

    /// Module at `offset` (0 = leftmost) within this codeword.
    pub fn module(&self, offset: u8) -> bool {
        debug_assert!(offset < self.width);
        (self.bits >> (self.width - 1 - offset)) & 1 == 1
    }

    /// True when no bit is set at or above `width`.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.width <= 16 && u32::from(self.bits) >> self.width == 0
    }
}

/// The output of every encoder: ordered codewords plus their summed width.
///
/// `total_modules` always equals the sum of the codeword widths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolDescriptor {
    codewords: Vec<Codeword>,
    total_modules: usize,
}

impl SymbolDescriptor {
    pub(crate) fn from_codewords(codewords: Vec<Codeword>) -> Self {
        let total_modules = codewords.iter().map(|c| usize::from(c.width)).sum();
        Self {
            codewords,
            total_modules,
        }
    }

    pub fn codewords(&self) -> &[Codeword] {
        &self.codewords
    }

    pub fn total_modules(&self) -> usize {
        self.total_modules
    }

    pub fn len(&self) -> usize {
        self.codewords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codewords.is_empty()
    }

    pub fn first(&self) -> Option<Codeword> {
        self.codewords.first().copied()
    }

    pub fn last(&self) -> Option<Codeword> {
        self.codewords.last().copied()
    }

    /// Every module of the symbol from left to right.
    pub fn modules(&self) -> impl Iterator<Item = bool> + '_ {
        self.codewords
            .iter()
            .flat_map(|cw| (0..cw.width).map(move |offset| cw.module(offset)))
    }
}

/// Symbologies the encoders can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    Code39,
    Code128,
    Ean13,
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbology::Code39 => write!(f, "Code 39"),
            Symbology::Code128 => write!(f, "Code 128"),
            Symbology::Ean13 => write!(f, "EAN-13"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// `found` is `None` when the input ended before a required position.
    #[error("{symbology}: {} at position {position} is not encodable", describe(.found))]
    OutOfAlphabet {
        symbology: Symbology,
        position: usize,
        found: Option<char>,
    },
    #[error("{symbology}: '{pair}' at position {position} is not a digit pair")]
    InvalidDigitPair {
        symbology: Symbology,
        position: usize,
        pair: String,
    },
}

impl EncodeError {
    pub(crate) fn out_of_alphabet(symbology: Symbology, position: usize, found: char) -> Self {
        EncodeError::OutOfAlphabet {
            symbology,
            position,
            found: Some(found),
        }
    }

    pub(crate) fn missing(symbology: Symbology, position: usize) -> Self {
        EncodeError::OutOfAlphabet {
            symbology,
            position,
            found: None,
        }
    }

    pub fn symbology(&self) -> Symbology {
        match self {
            EncodeError::OutOfAlphabet { symbology, .. }
            | EncodeError::InvalidDigitPair { symbology, .. } => *symbology,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            EncodeError::OutOfAlphabet { position, .. }
            | EncodeError::InvalidDigitPair { position, .. } => *position,
        }
    }
}

fn describe(found: &Option<char>) -> String {
    match *found {
        Some(ch) if ch.is_control() => format!("control character U+{:04X}", ch as u32),
        Some(ch) => format!("'{}' (U+{:04X})", ch, ch as u32),
        None => "end of input".to_string(),
    }
}

/// Common interface of the symbol encoders.
pub trait SymbolEncoder {
    fn symbology(&self) -> Symbology;
    fn encode(&self, input: &str) -> Result<SymbolDescriptor, EncodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn modules_are_read_msb_first() {
        let descriptor =
            SymbolDescriptor::from_codewords(vec![Codeword::new(0b101, 3), Codeword::new(0b01, 2)]);
        let modules: Vec<bool> = descriptor.modules().collect();
        assert_eq!(modules, vec![true, false, true, false, true]);
        assert_eq!(descriptor.total_modules(), 5);
    }

    #[test]
    fn stray_high_bits_are_detected() {
        assert!(Codeword::new(0b111, 3).is_well_formed());
        assert!(!Codeword::new(0b1000, 3).is_well_formed());
        assert!(!Codeword::new(0, 0).is_well_formed());
    }

    #[test]
    fn error_messages_name_the_offending_character() {
        let err = EncodeError::out_of_alphabet(Symbology::Code39, 2, 'a');
        assert_eq!(
            err.to_string(),
            "Code 39: 'a' (U+0061) at position 2 is not encodable"
        );
        let err = EncodeError::out_of_alphabet(Symbology::Code128, 0, '\u{7f}');
        assert_eq!(
            err.to_string(),
            "Code 128: control character U+007F at position 0 is not encodable"
        );
        let err = EncodeError::missing(Symbology::Ean13, 12);
        assert_eq!(err.to_string(), "EAN-13: end of input at position 12 is not encodable");
        assert_eq!(err.position(), 12);
        assert_eq!(err.symbology(), Symbology::Ean13);
    }
}
