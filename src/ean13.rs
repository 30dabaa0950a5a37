use crate::encoding::{Codeword, EncodeError, SymbolDescriptor, SymbolEncoder, Symbology};

pub const EAN13_LEN: usize = 13;
pub const EAN13_MODULES: usize = 95;
pub const DIGIT_WIDTH: u8 = 7;

pub const START_GUARD: Codeword = Codeword::new(0b101, 3);
pub const MIDDLE_GUARD: Codeword = Codeword::new(0b01010, 5);
pub const END_GUARD: Codeword = Codeword::new(0b101, 3);

/// Odd-parity left-half digits.
const L_CODES: [u16; 10] = [0x0d, 0x19, 0x13, 0x3d, 0x23, 0x31, 0x2f, 0x3b, 0x37, 0x0b];
/// Even-parity left-half digits.
const G_CODES: [u16; 10] = [0x27, 0x33, 0x1b, 0x21, 0x1d, 0x39, 0x05, 0x11, 0x09, 0x17];
/// Right-half digits.
const R_CODES: [u16; 10] = [0x72, 0x66, 0x6c, 0x42, 0x5c, 0x4e, 0x50, 0x44, 0x48, 0x74];

/// L/G choice for the six left-half digits keyed by the leading digit.
/// Bit k (LSB first) set means digit k+2 uses the G table.
const PARITY: [u8; 10] = [0x00, 0x34, 0x2c, 0x1c, 0x32, 0x26, 0x0e, 0x2a, 0x1a, 0x16];

/// EAN-13 over a complete 13-digit number (check digit included).
#[derive(Debug, Default, Clone, Copy)]
pub struct Ean13;

impl Ean13 {
    /// Parity pattern for a leading digit, as `L`/`G` letters.
    pub fn parity_letters(first_digit: u8) -> Option<String> {
        let pattern = *PARITY.get(usize::from(first_digit))?;
        Some(
            (0..6)
                .map(|k| if pattern >> k & 1 == 1 { 'G' } else { 'L' })
                .collect(),
        )
    }

    fn digits(input: &str) -> Result<[usize; EAN13_LEN], EncodeError> {
        let mut digits = [0usize; EAN13_LEN];
        let mut chars = input.chars();
        for (position, slot) in digits.iter_mut().enumerate() {
            let ch = chars
                .next()
                .ok_or_else(|| EncodeError::missing(Symbology::Ean13, position))?;
            *slot = ch
                .to_digit(10)
                .ok_or_else(|| EncodeError::out_of_alphabet(Symbology::Ean13, position, ch))?
                as usize;
        }
        if let Some(extra) = chars.next() {
            return Err(EncodeError::out_of_alphabet(Symbology::Ean13, EAN13_LEN, extra));
        }
        Ok(digits)
    }
}

impl SymbolEncoder for Ean13 {
    fn symbology(&self) -> Symbology {
        Symbology::Ean13
    }

    fn encode(&self, input: &str) -> Result<SymbolDescriptor, EncodeError> {
        let digits = Self::digits(input)?;
        let mut codewords = Vec::with_capacity(15);
        codewords.push(START_GUARD);
        let mut parity = PARITY[digits[0]];
        for &digit in &digits[1..7] {
            let table = if parity & 1 == 1 { &G_CODES } else { &L_CODES };
            codewords.push(Codeword::new(table[digit], DIGIT_WIDTH));
            parity >>= 1;
        }
        codewords.push(MIDDLE_GUARD);
        for &digit in &digits[7..] {
            codewords.push(Codeword::new(R_CODES[digit], DIGIT_WIDTH));
        }
        codewords.push(END_GUARD);
        Ok(SymbolDescriptor::from_codewords(codewords))
    }
}

pub fn encode_ean13(input: &str) -> Result<SymbolDescriptor, EncodeError> {
    Ean13.encode(input)
}
