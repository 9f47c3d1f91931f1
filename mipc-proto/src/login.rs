//! Login request and ack handling.

use mipc_crypto::prove_credential;
use serde_json::Value;

use crate::nid::NidKind;
use crate::rpc::Rpc;
use crate::session::Session;
use crate::{Error, jsonp};

/// The login message type.
pub const MSG_LOGIN_REQ: &str = "cacs_login_req";

/// Fields taken from a successful login ack.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginAck {
    /// Session id for subsequent request tokens.
    pub sid: String,
    /// Sequence number to continue from.
    pub seq: u64,
    /// Link id, possibly reassigned.
    pub lid: String,
    /// Our address as seen by the device.
    pub addr: Option<String>,
}

/// Build the `cacs_login_req` call.
///
/// Mints a login token (advancing the sequence when `increment` is set) and
/// encrypts the password hash under the shared secret.
pub fn request(session: &mut Session, username: &str, password: &str, increment: bool) -> Result<Rpc, Error> {
    let nid = session.mint_nid(NidKind::Login, increment)?;
    let secret = session
        .shared_secret()
        .ok_or(Error::TokenMintFailure { missing: "shared secret" })?;
    let dpass = prove_credential(password, secret)?;

    Ok(Rpc::js(MSG_LOGIN_REQ)
        .param("dlid", session.lid())
        .param("dnid", nid)
        .param("duser", username)
        .param("dpass", dpass)
        .param("dsession_req", 1)
        .param("dparam__x_countz_", 1)
        .param("dparam", 1)
        .param("dparam_name", "spv")
        .param("dparam_value", "v1"))
}

/// Check the login ack. Success requires `data.result` to be the empty string.
pub fn parse_ack(response: &Value) -> Result<LoginAck, Error> {
    let rejected = || Error::LoginRejected { response: response.to_string() };

    match jsonp::field(response, &["data", "result"]) {
        Some(Value::String(result)) if result.is_empty() => {}
        _ => return Err(rejected()),
    }

    let field = |key: &str| jsonp::field(response, &["data", key]).and_then(jsonp::text);
    let sid = field("sid").ok_or_else(|| Error::Response("login ack is missing data.sid".into()))?;
    let lid = field("lid").ok_or_else(|| Error::Response("login ack is missing data.lid".into()))?;
    let seq = field("seq")
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| Error::Response("login ack has no usable data.seq".into()))?;

    Ok(LoginAck { sid, seq, lid, addr: field("addr") })
}

/// Check the login ack and apply it to `session`.
pub fn finish(session: &mut Session, response: &Value) -> Result<(), Error> {
    let ack = parse_ack(response)?;
    log::info!("[mipc] Logged in, sid={} seq={}", ack.sid, ack.seq);
    session.apply_login(ack);
    Ok(())
}
