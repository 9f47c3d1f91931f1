//! Primitives for the MIPC camera web protocol.
//!
//! Provides:
//! - UTF-16 code unit access and 32-bit masked shifts
//! - The device's base64 variant (standard and `_.-` alphabets)
//! - "Magic" numeric encoding of integers and `0x` hex literals
//! - Diffie-Hellman over the firmware's fixed 120-bit prime
//! - DES-CBC credential proof keyed from the shared secret
//! - MD5 hash macro
//!
//! None of this is secure. It exists so a client can talk to the camera.

#![deny(unsafe_code)]

pub mod b64;
pub mod bits;
pub mod credential;
pub mod dh;
pub mod magic;
mod digest;

pub use b64::Alphabet;
pub use credential::{encrypt_password_hash, hash_password, prove_credential};
pub use dh::KeyPair;
pub use magic::Magic;
pub use digest::{md5_hex, md5_hex_literal};

// ─── Error ────────────────────────────────────────────────────────────────────

/// Errors from the encoding and key-exchange primitives.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Malformed input to an encoder. Always a programming error.
    ContractViolation { reason: String },
    /// The peer's public value is not a decimal integer.
    InvalidPublicKey { value: String },
    /// The OS random source failed.
    Randomness(getrandom::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContractViolation { reason } => write!(f, "contract violation: {reason}"),
            Self::InvalidPublicKey { value } => write!(f, "invalid DH public value {value:?}"),
            Self::Randomness(e) => write!(f, "random source failed: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<getrandom::Error> for Error {
    fn from(e: getrandom::Error) -> Self { Self::Randomness(e) }
}

impl Error {
    pub(crate) fn contract(reason: impl Into<String>) -> Self {
        Self::ContractViolation { reason: reason.into() }
    }
}
