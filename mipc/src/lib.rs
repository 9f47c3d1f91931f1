//! # mipc: MIPC IP camera protocol
//!
//! `mipc` wires together the focused sub-crates of the workspace:
//!
//! | Sub-crate     | Role                                                  |
//! |---------------|-------------------------------------------------------|
//! | `mipc-crypto` | base64 variant, magic encoder, DH, credential cipher  |
//! | `mipc-proto`  | Session state, nid tokens, handshake and login steps  |
//! | `mipc-client` | Client over a pluggable HTTP transport                |
//!
//! ## Quick start: signing by hand
//!
//! ```rust
//! use mipc::{Session, authentication, crypto::KeyPair};
//!
//! let keys = KeyPair::from_private(42);
//! let mut session = Session::new();
//! let (req, _step) = authentication::step1(&keys, session.tid());
//! assert_eq!(req.path(), "/ccm/cacs_dh_req.js");
//!
//! // Tokens need the shared secret from the DH ack.
//! assert!(session.next_nid().is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Re-export of [`mipc_crypto`]: encoders, DH and the credential cipher.
pub use mipc_crypto as crypto;

/// Re-export of [`mipc_proto`]: session, nid tokens, handshake, login, JSONP.
pub use mipc_proto as proto;

/// Re-export of [`mipc_client`] (requires `feature = "client"`).
#[cfg(feature = "client")]
pub use mipc_client as client;

// ─── Convenience re-exports ───────────────────────────────────────────────────

pub use mipc_crypto::{Alphabet, KeyPair, Magic, prove_credential};
pub use mipc_proto::{Nid, NidKind, NidParams, Rpc, Session, SharedSession, format_nid};
pub use mipc_proto::authentication::{self, Finished, step1, finish};
pub use mipc_proto::transport::Transport;

#[cfg(feature = "client")]
pub use mipc_client::{Client, Config, InvocationError, Profile, Ptz};
