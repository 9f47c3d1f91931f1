//! The `nid` request token.
//!
//! # Layout
//!
//! ```text
//! prefix  = [64 + |seq|] seq  [96 + |ident|] ident  [128 + |kind|] kind  [160 + |extra|] extra
//! trailer = [|secret|] secret  [|hashed|] hashed
//! digest  = magic("0x" + md5(prefix ++ trailer))
//! nid     = b64_alt([32 + |digest|] digest ++ prefix)
//! ```
//!
//! Empty fields are left out together with their length marker. The trailer
//! only feeds the digest and is never sent.

use mipc_crypto::bits::{latin1_masked, latin1_strict};
use mipc_crypto::{Alphabet, Magic, b64, magic, md5_hex_literal};

use crate::Error;

const SEQ_BASE: usize = 64;
const IDENT_BASE: usize = 96;
const KIND_BASE: usize = 128;
const EXTRA_BASE: usize = 160;
const DIGEST_BASE: usize = 32;

/// Which flavour of token is minted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NidKind {
    /// Signs an ordinary call; keyed on the session id.
    Request,
    /// Signs the login call; keyed on the link id.
    Login,
}

impl NidKind {
    /// The discriminator carried inside the token.
    pub fn discriminator(self) -> u32 {
        match self {
            Self::Request => 0,
            Self::Login => 2,
        }
    }
}

/// Inputs of [`format_nid`]. Empty strings mean "absent".
#[derive(Clone, Copy, Debug)]
pub struct NidParams<'a> {
    /// Sequence value; an integer in practice.
    pub seq: Magic<'a>,
    /// Session or link id, a `0x` hex literal.
    pub identifier: &'a str,
    /// Shared secret as decimal text.
    pub secret: &'a str,
    /// Token discriminator; only encoded when `identifier` is present.
    pub kind: u32,
    /// Raw bytes appended to the prefix.
    pub extra: &'a str,
    /// Text whose MD5 is appended to the trailer.
    pub hash_input: &'a str,
}

impl<'a> NidParams<'a> {
    /// Parameters with only the sequence, identifier, secret and kind set.
    pub fn new(seq: impl Into<Magic<'a>>, identifier: &'a str, secret: &'a str, kind: u32) -> Self {
        Self { seq: seq.into(), identifier, secret, kind, extra: "", hash_input: "" }
    }
}

/// A minted token and the sequence value it carries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Nid {
    /// The sequence number consumed by this token.
    pub seq: u64,
    /// The encoded token string.
    pub value: String,
}

impl std::fmt::Display for Nid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

fn push_marked(out: &mut Vec<u8>, base: usize, field: &[u8]) -> Result<(), Error> {
    if field.is_empty() {
        return Ok(());
    }
    let marker = u8::try_from(base + field.len()).map_err(|_| {
        mipc_crypto::Error::ContractViolation {
            reason: format!("nid field of {} bytes overflows its length marker", field.len()),
        }
    })?;
    out.push(marker);
    out.extend_from_slice(field);
    Ok(())
}

fn push_trailer(out: &mut Vec<u8>, field: &[u8]) {
    if field.is_empty() {
        return;
    }
    // the digest sees one byte per character, so the marker wraps
    out.push(field.len() as u8);
    out.extend_from_slice(field);
}

/// Build a token from its parts.
pub fn format_nid(params: &NidParams<'_>) -> Result<String, Error> {
    let enc_seq = magic::encode(params.seq, 0)?;
    let (enc_ident, enc_kind) = if params.identifier.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        (magic::encode(params.identifier, 0)?, magic::encode(params.kind, 0)?)
    };
    let enc_hashed = if params.hash_input.is_empty() {
        Vec::new()
    } else {
        magic::encode(md5_hex_literal(&latin1_masked(params.hash_input)).as_str(), 0)?
    };
    let extra = latin1_strict(params.extra)?;

    let mut prefix = Vec::with_capacity(32);
    push_marked(&mut prefix, SEQ_BASE, &enc_seq)?;
    push_marked(&mut prefix, IDENT_BASE, &enc_ident)?;
    push_marked(&mut prefix, KIND_BASE, &enc_kind)?;
    push_marked(&mut prefix, EXTRA_BASE, &extra)?;

    let mut signed = prefix.clone();
    push_trailer(&mut signed, &latin1_masked(params.secret));
    push_trailer(&mut signed, &enc_hashed);

    let enc_digest = magic::encode(md5_hex_literal(&signed).as_str(), 0)?;

    let mut framed = Vec::with_capacity(1 + enc_digest.len() + prefix.len());
    push_marked(&mut framed, DIGEST_BASE, &enc_digest)?;
    framed.extend_from_slice(&prefix);

    Ok(b64::encode(&framed, Alphabet::Alt))
}
