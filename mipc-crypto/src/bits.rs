//! Code unit access and fixed-width shifts.
//!
//! The device script runs on 32-bit integer semantics: both operands of a
//! shift are truncated to 32 bits and the shift amount is taken modulo 32.
//! The left shift is *not* truncated afterwards, so its result may occupy up
//! to 63 bits.

use crate::Error;

const MASK_32: u64 = 0xFFFF_FFFF;

/// `(a mod 2^32) << (b mod 32)`.
pub fn left_shift_32(a: i64, b: i64) -> u64 {
    ((a as u64) & MASK_32) << ((b as u64) & 0x1F)
}

/// `(a mod 2^32) >> (b mod 32)`.
pub fn right_shift_32(a: i64, b: i64) -> u64 {
    ((a as u64) & MASK_32) >> ((b as u64) & 0x1F)
}

/// The UTF-16 code units of `s`.
pub fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Read code unit `index` of a UTF-16 buffer.
///
/// Indices past the end are a [`Error::ContractViolation`]; callers are
/// expected to stay in range.
pub fn char_code_at(units: &[u16], index: usize) -> Result<u16, Error> {
    units.get(index).copied().ok_or_else(|| {
        Error::contract(format!("code unit index {index} out of range (len {})", units.len()))
    })
}

/// One byte per character, each code point masked to its low 8 bits.
///
/// This is how the firmware feeds text to MD5. It is deliberately not UTF-8.
pub fn latin1_masked(s: &str) -> Vec<u8> {
    s.chars().map(|c| (u32::from(c) & 0xFF) as u8).collect()
}

/// One byte per UTF-16 code unit, rejecting units above `0xFF`.
pub fn latin1_strict(s: &str) -> Result<Vec<u8>, Error> {
    let units = utf16(s);
    (0..units.len())
        .map(|i| {
            let unit = char_code_at(&units, i)?;
            u8::try_from(unit).map_err(|_| {
                Error::contract(format!("code unit {unit:#06x} at {i} does not fit in a byte"))
            })
        })
        .collect()
}
