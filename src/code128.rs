use crate::encoding::{Codeword, EncodeError, SymbolDescriptor, SymbolEncoder, Symbology};

pub const CODE128_WIDTH: u8 = 11;
pub const TERMINATOR_WIDTH: u8 = 2;

pub const START_B: u16 = 0x690;
pub const START_C: u16 = 0x69c;
pub const STOP: u16 = 0x63a;
/// Final two-module bar completing the 13-module stop pattern.
pub const TERMINATOR: u16 = 0b11;

const START_B_VALUE: u32 = 104;
const START_C_VALUE: u32 = 105;
/// "Code B" in subset C.
const SWITCH_TO_B_VALUE: usize = 100;
const CHECKSUM_MODULUS: u32 = 103;

/// Minimum length of an all-digit input before subset C is chosen.
pub const SUBSET_C_MIN_LEN: usize = 4;

/// Patterns for symbol values 0..=102.
#[rustfmt::skip]
const CODE128_TABLE: [u16; 103] = [
    0x6cc, 0x66c, 0x666, 0x498, 0x48c, 0x44c, 0x4c8, 0x4c4, //  0
    0x464, 0x648, 0x644, 0x624, 0x59c, 0x4dc, 0x4ce, 0x5cc, //  8
    0x4ec, 0x4e6, 0x672, 0x65c, 0x64e, 0x6e4, 0x674, 0x76e, // 16
    0x74c, 0x72c, 0x726, 0x764, 0x734, 0x732, 0x6d8, 0x6c6, // 24
    0x636, 0x518, 0x458, 0x446, 0x588, 0x468, 0x462, 0x688, // 32
    0x628, 0x622, 0x5b8, 0x58e, 0x46e, 0x5d8, 0x5c6, 0x476, // 40
    0x776, 0x68e, 0x62e, 0x6e8, 0x6e2, 0x6ee, 0x758, 0x746, // 48
    0x716, 0x768, 0x762, 0x71a, 0x77a, 0x642, 0x78a, 0x530, // 56
    0x50c, 0x4b0, 0x486, 0x42c, 0x426, 0x590, 0x584, 0x4d0, // 64
    0x4c2, 0x434, 0x432, 0x612, 0x650, 0x7ba, 0x614, 0x47a, // 72
    0x53c, 0x4bc, 0x49e, 0x5e4, 0x4f4, 0x4f2, 0x7a4, 0x794, // 80
    0x792, 0x6de, 0x6f6, 0x7b6, 0x578, 0x51e, 0x45e, 0x5e8, // 88
    0x5e2, 0x7a8, 0x7a2, 0x5de, 0x5ee, 0x75e, 0x7ae,        // 96
];

/// Code sets the encoder can start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subset {
    B,
    C,
}

impl Subset {
    /// Subset C for all-digit input of at least four characters, else B.
    pub fn select(input: &str) -> Self {
        if input.len() >= SUBSET_C_MIN_LEN && input.bytes().all(|b| b.is_ascii_digit()) {
            Subset::C
        } else {
            Subset::B
        }
    }
}

/// Code 128 with the subset B / subset C heuristic.
#[derive(Debug, Default, Clone, Copy)]
pub struct Code128;

impl Code128 {
    fn codeword(value: usize) -> Codeword {
        Codeword::new(CODE128_TABLE[value], CODE128_WIDTH)
    }

    fn subset_b_value(position: usize, ch: char) -> Result<usize, EncodeError> {
        match ch {
            ' '..='~' => Ok(ch as usize - 32),
            _ => Err(EncodeError::out_of_alphabet(Symbology::Code128, position, ch)),
        }
    }
}

/// Accumulates data codewords together with the mod-103 weighted sum.
struct Builder {
    codewords: Vec<Codeword>,
    checksum: u32,
    weight: u32,
}

impl Builder {
    fn start(pattern: u16, value: u32, capacity: usize) -> Self {
        let mut codewords = Vec::with_capacity(capacity + 4);
        codewords.push(Codeword::new(pattern, CODE128_WIDTH));
        Self {
            codewords,
            checksum: value,
            weight: 1,
        }
    }

    fn push(&mut self, value: usize) {
        self.codewords.push(Code128::codeword(value));
        self.checksum += value as u32 * self.weight;
        self.weight += 1;
    }

    fn finish(mut self) -> SymbolDescriptor {
        let check = (self.checksum % CHECKSUM_MODULUS) as usize;
        self.codewords.push(Code128::codeword(check));
        self.codewords.push(Codeword::new(STOP, CODE128_WIDTH));
        self.codewords.push(Codeword::new(TERMINATOR, TERMINATOR_WIDTH));
        SymbolDescriptor::from_codewords(self.codewords)
    }
}

impl SymbolEncoder for Code128 {
    fn symbology(&self) -> Symbology {
        Symbology::Code128
    }

    fn encode(&self, input: &str) -> Result<SymbolDescriptor, EncodeError> {
        match Subset::select(input) {
            Subset::B => {
                let mut builder = Builder::start(START_B, START_B_VALUE, input.len());
                for (position, ch) in input.chars().enumerate() {
                    builder.push(Self::subset_b_value(position, ch)?);
                }
                Ok(builder.finish())
            }
            Subset::C => {
                // Subset C input is pure ASCII, so byte offsets are positions.
                let mut builder = Builder::start(START_C, START_C_VALUE, input.len() / 2 + 2);
                let paired = input.len() - input.len() % 2;
                for position in (0..paired).step_by(2) {
                    let pair = &input[position..position + 2];
                    let value: usize = pair
                        .parse()
                        .ok()
                        .filter(|_| pair.bytes().all(|b| b.is_ascii_digit()))
                        .ok_or_else(|| EncodeError::InvalidDigitPair {
                            symbology: Symbology::Code128,
                            position,
                            pair: pair.to_string(),
                        })?;
                    builder.push(value);
                }
                if let Some(ch) = input[paired..].chars().next() {
                    // Only '0'..='9' (subset B values 16..=25) may trail a pair run.
                    let value = (ch as usize)
                        .checked_sub(32)
                        .filter(|value| (16..=25).contains(value))
                        .ok_or_else(|| EncodeError::InvalidDigitPair {
                            symbology: Symbology::Code128,
                            position: paired,
                            pair: ch.to_string(),
                        })?;
                    builder.push(SWITCH_TO_B_VALUE);
                    builder.push(value);
                }
                Ok(builder.finish())
            }
        }
    }
}

pub fn encode_code128(input: &str) -> Result<SymbolDescriptor, EncodeError> {
    Code128.encode(input)
}
