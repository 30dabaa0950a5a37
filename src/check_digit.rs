//! Mod-10 check digits for UPC/EAN numbers.

use crate::encoding::{EncodeError, Symbology};

/// Weighted mod-10 check digit. The last character carries weight 3,
/// the one before it weight 1, alternating towards the front.
pub fn compute_check_digit(digits: &str) -> Result<u8, EncodeError> {
    let chars: Vec<char> = digits.chars().collect();
    let mut sum = 0u32;
    for (position, &ch) in chars.iter().enumerate() {
        let value = ch
            .to_digit(10)
            .ok_or_else(|| EncodeError::out_of_alphabet(Symbology::Ean13, position, ch))?;
        let from_end = chars.len() - 1 - position;
        let weight = if from_end % 2 == 0 { 3 } else { 1 };
        sum += value * weight;
    }
    Ok(((10 - sum % 10) % 10) as u8)
}

/// Heuristic used by the dispatcher: 11 digits, or 12/13 digits whose final
/// digit checks out against the rest.
pub fn is_plausible_ean(input: &str) -> bool {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match input.len() {
        11 => true,
        12 | 13 => {
            let (body, check) = input.split_at(input.len() - 1);
            let expected = check.as_bytes()[0] - b'0';
            compute_check_digit(body).is_ok_and(|digit| digit == expected)
        }
        _ => false,
    }
}

/// Expand a plausible EAN/UPC code to the 13 digits the EAN-13 encoder takes:
/// 11 digits get their check digit appended and a leading `0`, 12 digits
/// (UPC-A) get a leading `0`, 13 digits are returned unchanged.
pub fn complete_ean13(input: &str) -> Option<String> {
    if !is_plausible_ean(input) {
        return None;
    }
    match input.len() {
        11 => {
            let check = compute_check_digit(input).ok()?;
            Some(format!("0{input}{check}"))
        }
        12 => Some(format!("0{input}")),
        _ => Some(input.to_string()),
    }
}
