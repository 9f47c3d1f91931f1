//! Password proof sent with the login request.
//!
//! `dpass = hex(DES-CBC(key = MD5(secret)[..8], iv = 0, md5(password)))`

use des::Des;
use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockEncrypt, KeyInit};

use crate::Error;
use crate::bits::latin1_masked;
use crate::digest::md5_hex;

const BLOCK: usize = 8;

/// MD5 of the password as lowercase hex, over its 8-bit-masked characters.
pub fn hash_password(password: &str) -> String {
    md5_hex(&latin1_masked(password))
}

/// DES-CBC encrypt `buffer` in place. `buffer` must be block-aligned.
fn cbc_encrypt(buffer: &mut [u8], key: &[u8; BLOCK], iv: &[u8; BLOCK]) {
    debug_assert_eq!(buffer.len() % BLOCK, 0);
    let cipher = Des::new(key.into());
    let mut chain = *iv;
    for block in buffer.chunks_exact_mut(BLOCK) {
        for (b, c) in block.iter_mut().zip(chain) {
            *b ^= c;
        }
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
        chain.copy_from_slice(block);
    }
}

/// Encrypt a 32-digit hex password hash under the shared secret.
pub fn encrypt_password_hash(hash_hex: &str, secret: &str) -> Result<String, Error> {
    let mut plain: [u8; 16] = hex::decode(hash_hex)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| Error::contract(format!("password hash {hash_hex:?} is not 16 hex bytes")))?;

    let digest = crate::md5!(secret.as_bytes());
    let mut key = [0u8; BLOCK];
    key.copy_from_slice(&digest[..BLOCK]);

    cbc_encrypt(&mut plain, &key, &[0u8; BLOCK]);
    Ok(hex::encode(plain))
}

/// Hash `password` and encrypt it under `secret`.
pub fn prove_credential(password: &str, secret: &str) -> Result<String, Error> {
    encrypt_password_hash(&hash_password(password), secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_masks_code_points() {
        assert_eq!(hash_password("admin"), "21232f297a57a5a743894a0e4a801fc3");
        // U+0161 masks to 0x61 ('a')
        assert_eq!(hash_password("\u{161}dmin"), hash_password("admin"));
    }

    #[test]
    fn cbc_chains_blocks() {
        let key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
        let mut two = [0u8; 16];
        cbc_encrypt(&mut two, &key, &[0u8; BLOCK]);
        // identical plaintext blocks must not give identical cipher-text blocks
        assert_ne!(two[..8], two[8..]);
    }

    #[test]
    fn des_known_answer() {
        // FIPS 81 style single block: key 133457799BBCDFF1, pt 0123456789ABCDEF
        let key = [0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
        let mut block = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
        cbc_encrypt(&mut block, &key, &[0u8; BLOCK]);
        assert_eq!(hex::encode(block), "85e813540f0ab405");
    }

    #[test]
    fn malformed_hash_rejected() {
        assert!(encrypt_password_hash("abc", "1").is_err());
        assert!(encrypt_password_hash(&"zz".repeat(16), "1").is_err());
        assert!(encrypt_password_hash(&"00".repeat(17), "1").is_err());
    }
}
