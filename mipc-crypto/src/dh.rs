//! Diffie-Hellman over the camera firmware's fixed group.
//!
//! The prime is 120 bits wide and the private exponent at most 2^63. Both
//! values are baked into the device's web client and cannot be negotiated.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::Error;

/// The group modulus hard-coded in the device web client.
#[allow(clippy::unreadable_literal)]
pub const PRIME: u128 = 791658605174853458830696113306796803;

/// The group generator.
pub const GENERATOR: u32 = 5;

/// Upper bound (inclusive) of a private exponent.
pub const MAX_PRIVATE: u64 = 1 << 63;

/// [`PRIME`] as a big integer.
pub fn prime() -> BigUint {
    BigUint::from(PRIME)
}

/// Draw a private exponent uniformly from `[0, 2^63]`.
pub fn generate_private() -> Result<u64, Error> {
    let mut buf = [0u8; 8];
    loop {
        getrandom::getrandom(&mut buf)?;
        let candidate = u64::from_le_bytes(buf);
        if candidate <= MAX_PRIVATE {
            return Ok(candidate);
        }
    }
}

/// `G^private mod P`.
pub fn derive_public(private: u64) -> BigUint {
    BigUint::from(GENERATOR).modpow(&BigUint::from(private), &prime())
}

/// `peer^private mod P`, rendered as decimal text.
pub fn derive_shared(peer_public: &BigUint, private: u64) -> String {
    peer_public.modpow(&BigUint::from(private), &prime()).to_string()
}

/// Parse the decimal public value sent by the device.
pub fn parse_public(text: &str) -> Result<BigUint, Error> {
    let trimmed = text.trim();
    let value = BigUint::parse_bytes(trimmed.as_bytes(), 10)
        .ok_or_else(|| Error::InvalidPublicKey { value: text.to_string() })?;
    if value.is_zero() || value >= prime() {
        return Err(Error::InvalidPublicKey { value: text.to_string() });
    }
    Ok(value)
}

/// A private exponent and its public value.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyPair {
    private: u64,
    public: BigUint,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS random source.
    pub fn generate() -> Result<Self, Error> {
        Ok(Self::from_private(generate_private()?))
    }

    /// Build the key pair for a known private exponent.
    pub fn from_private(private: u64) -> Self {
        Self { private, public: derive_public(private) }
    }

    /// The private exponent.
    pub fn private(&self) -> u64 { self.private }

    /// The public value sent to the device.
    pub fn public(&self) -> &BigUint { &self.public }

    /// The shared secret text for the device's public value.
    pub fn shared_secret(&self, peer_public: &BigUint) -> String {
        derive_shared(peer_public, self.private)
    }
}
