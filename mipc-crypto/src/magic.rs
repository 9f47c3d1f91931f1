//! Numeric values to raw byte strings, as the device script encodes them.
//!
//! Integers drop their leading zero bytes (so `0` is empty and `256` is
//! `[1, 0]`). Hex literals (`"0x…"`) are decoded from the right, two digits
//! per byte; an odd digit count leaves a one-digit byte at the front.

use crate::Error;
use crate::bits::{char_code_at, right_shift_32, utf16};

/// A value accepted by [`encode`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Magic<'a> {
    Int(u64),
    /// Only `"0x"`-prefixed text carries a value; anything else encodes to
    /// nothing.
    Text(&'a str),
}

impl From<u64> for Magic<'_> {
    fn from(v: u64) -> Self { Self::Int(v) }
}
impl From<u32> for Magic<'_> {
    fn from(v: u32) -> Self { Self::Int(u64::from(v)) }
}
impl<'a> From<&'a str> for Magic<'a> {
    fn from(s: &'a str) -> Self { Self::Text(s) }
}
impl<'a> From<&'a String> for Magic<'a> {
    fn from(s: &'a String) -> Self { Self::Text(s) }
}

fn nibble(unit: u16) -> u8 {
    match unit {
        0x30..=0x39 => (unit - 0x30) as u8,
        0x41..=0x46 => (unit - 0x37) as u8,
        0x61..=0x66 => (unit - 0x57) as u8,
        _ => 0,
    }
}

fn encode_int(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    for shift in [24, 16, 8, 0] {
        if value >= 1u64 << shift {
            out.push((right_shift_32(value as i64, shift) & 0xFF) as u8);
        }
    }
    out
}

fn encode_hex(literal: &str) -> Result<Vec<u8>, Error> {
    let units = utf16(literal);
    let mut out = Vec::with_capacity(units.len() / 2);
    // index 0 and 1 hold the "0x" prefix
    let mut pos = units.len();
    while pos > 2 {
        let mut byte = 0u8;
        let mut shift = 0;
        while shift < 8 && pos > 2 {
            pos -= 1;
            byte |= nibble(char_code_at(&units, pos)?) << shift;
            shift += 4;
        }
        out.push(byte);
    }
    out.reverse();
    Ok(out)
}

/// Encode `value`, left-padding with `0x00` up to `pad_to` bytes.
pub fn encode<'a>(value: impl Into<Magic<'a>>, pad_to: usize) -> Result<Vec<u8>, Error> {
    let raw = match value.into() {
        Magic::Int(v) => encode_int(v),
        Magic::Text(s) if s.starts_with("0x") => encode_hex(s)?,
        Magic::Text(_) => Vec::new(),
    };
    if raw.len() >= pad_to {
        return Ok(raw);
    }
    let mut padded = vec![0u8; pad_to - raw.len()];
    padded.extend_from_slice(&raw);
    Ok(padded)
}
