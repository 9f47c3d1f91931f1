//! Sans-IO key exchange with the camera.
//!
//! # Flow
//!
//! ```text
//! let (req, s1) = authentication::step1(&keys, session.tid());
//! // send req (cacs_dh_req), receive resp
//! let done = authentication::finish(s1, &resp)?;
//! session.apply_handshake(done);
//! ```

use std::fmt;

use mipc_crypto::{KeyPair, dh};
use serde_json::Value;

use crate::jsonp;
use crate::rpc::Rpc;

/// The DH request message type.
pub const MSG_DH_REQ: &str = "cacs_dh_req";

// ─── Error ────────────────────────────────────────────────────────────────────

/// Errors that can occur during the key exchange.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The DH ack lacks a required field.
    HandshakeFailure {
        /// The missing field, e.g. `data.key_b2a`.
        missing: &'static str,
    },
    /// The device's public value is malformed.
    InvalidPeerKey(mipc_crypto::Error),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HandshakeFailure { missing } => write!(f, "DH ack is missing {missing}"),
            Self::InvalidPeerKey(e) => write!(f, "{e}"),
        }
    }
}

// ─── Step state ──────────────────────────────────────────────────────────────

/// State after step 1.
#[derive(Clone, Debug)]
pub struct Step1 {
    private: u64,
}

/// The final output of a successful key exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct Finished {
    /// Shared secret as decimal text.
    pub shared_secret: String,
    /// Transaction id assigned by the device.
    pub tid: String,
    /// Link id assigned by the device.
    pub lid: String,
}

// ─── Step 1: cacs_dh_req ─────────────────────────────────────────────────────

/// Build the `cacs_dh_req` call announcing our public value.
pub fn step1(keys: &KeyPair, tid: &str) -> (Rpc, Step1) {
    let req = Rpc::js(MSG_DH_REQ)
        .param("dbnum_prime", dh::PRIME)
        .param("droot_num", dh::GENERATOR)
        .param("dkey_a2b", keys.public())
        .param("dtid", tid);
    (req, Step1 { private: keys.private() })
}

// ─── finish: cacs_dh_ack ─────────────────────────────────────────────────────

/// Process the parsed `cacs_dh_ack` and derive the shared secret.
pub fn finish(data: Step1, response: &Value) -> Result<Finished, Error> {
    let Step1 { private } = data;

    let key_b2a = required(response, "key_b2a", "data.key_b2a")?;
    let tid = required(response, "tid", "data.tid")?;
    let lid = required(response, "lid", "data.lid")?;

    let peer = dh::parse_public(&key_b2a).map_err(Error::InvalidPeerKey)?;
    let shared_secret = dh::derive_shared(&peer, private);
    log::debug!("[mipc] DH ack: tid={tid} lid={lid}");

    Ok(Finished { shared_secret, tid, lid })
}

fn required(response: &Value, key: &str, name: &'static str) -> Result<String, Error> {
    jsonp::field(response, &["data", key])
        .and_then(jsonp::text)
        .ok_or(Error::HandshakeFailure { missing: name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn step1_carries_protocol_constants() {
        let keys = KeyPair::from_private(3);
        let (req, _) = step1(&keys, "0");
        assert_eq!(req.path(), "/ccm/cacs_dh_req.js");
        assert_eq!(req.get("dbnum_prime"), Some("791658605174853458830696113306796803"));
        assert_eq!(req.get("droot_num"), Some("5"));
        assert_eq!(req.get("dkey_a2b"), Some("125"));
        assert_eq!(req.get("dtid"), Some("0"));
    }

    #[test]
    fn finish_derives_secret() {
        let client = KeyPair::from_private(1234);
        let device = KeyPair::from_private(5678);
        let (_, s1) = step1(&client, "0");
        let resp = json!({"data": {"key_b2a": device.public().to_string(), "tid": 7, "lid": "0x4c"}});
        let done = finish(s1, &resp).unwrap();
        assert_eq!(done.shared_secret, device.shared_secret(client.public()));
        assert_eq!(done.tid, "7");
        assert_eq!(done.lid, "0x4c");
    }

    #[test]
    fn missing_fields_fail() {
        let keys = KeyPair::from_private(1);
        for (resp, missing) in [
            (json!({}), "data.key_b2a"),
            (json!({"data": {"tid": 1, "lid": "0x1"}}), "data.key_b2a"),
            (json!({"data": {"key_b2a": "5", "lid": "0x1"}}), "data.tid"),
            (json!({"data": {"key_b2a": "5", "tid": 1}}), "data.lid"),
        ] {
            let (_, s1) = step1(&keys, "0");
            assert_eq!(finish(s1, &resp), Err(Error::HandshakeFailure { missing }));
        }
    }

    #[test]
    fn malformed_peer_key() {
        let (_, s1) = step1(&KeyPair::from_private(1), "0");
        let resp = json!({"data": {"key_b2a": "nope", "tid": 1, "lid": "0x1"}});
        assert!(matches!(finish(s1, &resp), Err(Error::InvalidPeerKey(_))));
    }
}
