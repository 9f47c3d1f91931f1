//! The device's base64 variant.
//!
//! Bits are accumulated MSB-first, up to 24 at a time, and emitted as 6-bit
//! groups for as long as a group starts inside the bits read. There is no
//! `=` padding: `n` input bytes always produce `ceil(8n / 6)` symbols.

use crate::Error;
use crate::bits::{left_shift_32, right_shift_32};

const STANDARD: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const ALT: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_.";

/// Symbol table selection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Alphabet {
    /// `+` and `/` as the last two symbols.
    #[default]
    Standard,
    /// `_` and `.` as the last two symbols; used for nid tokens.
    Alt,
}

impl Alphabet {
    /// The 64 indexable symbols.
    pub fn symbols(self) -> &'static [u8; 64] {
        match self {
            Self::Standard => STANDARD,
            Self::Alt => ALT,
        }
    }
}

/// Encode `input` with the given alphabet.
pub fn encode(input: &[u8], alphabet: Alphabet) -> String {
    let symbols = alphabet.symbols();
    let mut out = String::with_capacity((input.len() * 8).div_ceil(6));
    let mut acc: u64 = 0;

    for chunk in input.chunks(3) {
        let mut bits: i64 = 0;
        for &byte in chunk {
            acc = left_shift_32(acc as i64, 8) + u64::from(byte);
            bits += 8;
        }

        let mut group: i64 = 0;
        while group < 24 {
            if group < bits {
                let offset = bits - group - 6;
                let index = if offset < 0 {
                    left_shift_32(acc as i64, -offset)
                } else {
                    right_shift_32(acc as i64, offset)
                };
                out.push(char::from(symbols[index as usize]));
            }
            group += 6;
            acc &= left_shift_32(1, bits - group) - 1;
        }
    }
    out
}

/// Encode the UTF-16 code units of `s`, one byte per unit.
///
/// A unit above `0xFF` does not fit the byte-wide accumulator and is
/// rejected.
pub fn str_to_b64(s: &str, alphabet: Alphabet) -> Result<String, Error> {
    Ok(encode(&crate::bits::latin1_strict(s)?, alphabet))
}
