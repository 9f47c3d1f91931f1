//! MIPC camera session and request signing.
//!
//! This crate handles:
//! * Session state (sequence counter, tid / lid / sid, shared secret)
//! * nid token minting before every signed call
//! * Sans-IO DH handshake and login steps
//! * The JSONP envelope around device responses
//!
//! It is intentionally transport-agnostic: bring your own HTTP client.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod authentication;
pub mod jsonp;
pub mod login;
pub mod nid;
pub mod rpc;
pub mod session;
pub mod transport;

pub use nid::{Nid, NidKind, NidParams, format_nid};
pub use rpc::{Format, Rpc};
pub use session::{Session, SharedSession};

use std::fmt;

// ─── Error ────────────────────────────────────────────────────────────────────

/// Errors raised while signing requests or interpreting device responses.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A token cannot be minted: no shared secret yet, or the sequence is
    /// exhausted.
    TokenMintFailure {
        /// What the session lacks.
        missing: &'static str,
    },
    /// The device refused the login; carries the raw response.
    LoginRejected {
        /// The response body as received.
        response: String,
    },
    /// The key exchange failed.
    Handshake(authentication::Error),
    /// An encoder was handed malformed input.
    Encoding(mipc_crypto::Error),
    /// The response could not be decoded or lacks a required field.
    Response(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenMintFailure { missing } => write!(f, "cannot mint nid: no {missing}"),
            Self::LoginRejected { response } => write!(f, "login rejected: [{response}]"),
            Self::Handshake(e) => write!(f, "handshake failed: {e}"),
            Self::Encoding(e) => write!(f, "{e}"),
            Self::Response(s) => write!(f, "bad response: {s}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Handshake(e) => Some(e),
            Self::Encoding(e) => Some(e),
            _ => None,
        }
    }
}

impl From<mipc_crypto::Error> for Error {
    fn from(e: mipc_crypto::Error) -> Self { Self::Encoding(e) }
}

impl From<authentication::Error> for Error {
    fn from(e: authentication::Error) -> Self { Self::Handshake(e) }
}
