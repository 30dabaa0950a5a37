use crate::encoding::{Codeword, EncodeError, SymbolDescriptor, SymbolEncoder, Symbology};

/// Width of every Code 39 character: nine elements (three wide) plus the
/// leading inter-character gap.
pub const CODE39_WIDTH: u8 = 13;

/// Characters in table order. `*` (index 36) is the start/stop sentinel.
pub const CODE39_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ* -$%./+";

const SENTINEL: usize = 36;

#[rustfmt::skip]
const CODE39_TABLE: [u16; 44] = [
    0xa6d, 0xd2b, 0xb2b, 0xd95, // 0 1 2 3
    0xa6b, 0xd35, 0xb35, 0xa5b, // 4 5 6 7
    0xd2d, 0xb2d, 0xd4b, 0xb4b, // 8 9 A B
    0xda5, 0xacb, 0xd65, 0xb65, // C D E F
    0xa9b, 0xd4d, 0xb4d, 0xacd, // G H I J
    0xd53, 0xb53, 0xda9, 0xad3, // K L M N
    0xd69, 0xb69, 0xab3, 0xd59, // O P Q R
    0xb59, 0xad9, 0xcab, 0x9ab, // S T U V
    0xcd5, 0x96b, 0xcb5, 0x9b5, // W X Y Z
    0x96d, 0x9ad, 0x95b, 0x925, // * space - $
    0xa49, 0xcad, 0x929, 0x949, // % . / +
];

/// Code 39 without check character or full-ASCII extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct Code39;

impl Code39 {
    /// Table index of `ch`, excluding the sentinel.
    fn symbol_index(ch: char) -> Option<usize> {
        match ch {
            '0'..='9' => Some(ch as usize - '0' as usize),
            'A'..='Z' => Some(ch as usize - 'A' as usize + 10),
            '*' => None,
            _ => CODE39_ALPHABET[SENTINEL..]
                .find(ch)
                .map(|offset| SENTINEL + offset),
        }
    }

    fn codeword(index: usize) -> Codeword {
        Codeword::new(CODE39_TABLE[index], CODE39_WIDTH)
    }
}

impl SymbolEncoder for Code39 {
    fn symbology(&self) -> Symbology {
        Symbology::Code39
    }

    fn encode(&self, input: &str) -> Result<SymbolDescriptor, EncodeError> {
        let mut codewords = Vec::with_capacity(input.len() + 2);
        codewords.push(Self::codeword(SENTINEL));
        for (position, ch) in input.chars().enumerate() {
            let index = Self::symbol_index(ch)
                .ok_or_else(|| EncodeError::out_of_alphabet(Symbology::Code39, position, ch))?;
            codewords.push(Self::codeword(index));
        }
        codewords.push(Self::codeword(SENTINEL));
        Ok(SymbolDescriptor::from_codewords(codewords))
    }
}

pub fn encode_code39(input: &str) -> Result<SymbolDescriptor, EncodeError> {
    Code39.encode(input)
}
