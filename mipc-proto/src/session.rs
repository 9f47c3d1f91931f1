//! Camera client session state.

use std::sync::{Arc, Mutex, MutexGuard};

use mipc_crypto::Magic;

use crate::Error;
use crate::authentication::Finished;
use crate::login::LoginAck;
use crate::nid::{Nid, NidKind, NidParams, format_nid};

/// Tracks per-connection session state.
///
/// Mutated by the handshake (tid, lid, shared secret), by login (sid, seq,
/// lid, client address) and by every token mint (seq).
///
/// # Example
///
/// ```rust
/// use mipc_proto::{NidKind, Session};
///
/// let mut session = Session::new();
/// assert!(session.mint_nid(NidKind::Request, true).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    /// Sequence number of the last minted token.
    seq: u64,
    /// Transaction id; `"0"` until the device assigns one.
    tid: String,
    /// Session id from the login ack.
    sid: String,
    /// Link id from the DH ack.
    lid: String,
    /// DH shared secret as decimal text.
    shared_secret: Option<String>,
    /// Our address as seen by the device.
    client_addr: Option<String>,
}

impl Session {
    /// Create a fresh session.
    pub fn new() -> Self {
        Self {
            seq: 0,
            tid: "0".to_string(),
            sid: String::new(),
            lid: String::new(),
            shared_secret: None,
            client_addr: None,
        }
    }

    /// Sequence number of the last minted token.
    pub fn seq(&self) -> u64 { self.seq }
    /// Transaction id.
    pub fn tid(&self) -> &str { &self.tid }
    /// Session id; empty before login.
    pub fn sid(&self) -> &str { &self.sid }
    /// Link id; empty before the handshake.
    pub fn lid(&self) -> &str { &self.lid }
    /// Shared secret, once the handshake has completed.
    pub fn shared_secret(&self) -> Option<&str> { self.shared_secret.as_deref() }
    /// Client address reported by the login ack.
    pub fn client_addr(&self) -> Option<&str> { self.client_addr.as_deref() }

    /// Record the outcome of the key exchange.
    pub fn apply_handshake(&mut self, done: Finished) {
        self.shared_secret = Some(done.shared_secret);
        self.tid = done.tid;
        self.lid = done.lid;
    }

    /// Record the outcome of a successful login.
    pub fn apply_login(&mut self, ack: LoginAck) {
        self.sid = ack.sid;
        self.seq = ack.seq;
        self.lid = ack.lid;
        self.client_addr = ack.addr;
    }

    /// Mint a token of `kind`.
    ///
    /// Request tokens always advance the sequence; login tokens only when
    /// `increment` is set. The session is left untouched on error.
    pub fn mint_nid(&mut self, kind: NidKind, increment: bool) -> Result<Nid, Error> {
        let secret = self
            .shared_secret
            .as_deref()
            .ok_or(Error::TokenMintFailure { missing: "shared secret" })?;

        let seq = if kind == NidKind::Request || increment {
            self.seq
                .checked_add(1)
                .ok_or(Error::TokenMintFailure { missing: "sequence value after u64::MAX" })?
        } else {
            self.seq
        };
        let identifier = match kind {
            NidKind::Request => self.sid.as_str(),
            NidKind::Login => self.lid.as_str(),
        };
        let value = format_nid(&NidParams::new(Magic::Int(seq), identifier, secret, kind.discriminator()))?;

        self.seq = seq;
        Ok(Nid { seq, value })
    }

    /// Mint the token for an ordinary signed call.
    pub fn next_nid(&mut self) -> Result<Nid, Error> {
        self.mint_nid(NidKind::Request, true)
    }
}

impl Default for Session {
    fn default() -> Self { Self::new() }
}

/// A [`Session`] shared between request flows.
///
/// Minting holds the lock across the read-modify-write of the sequence, so
/// two flows never sign with the same value.
#[derive(Clone, Debug, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    /// Wrap `session`.
    pub fn new(session: Session) -> Self {
        Self { inner: Arc::new(Mutex::new(session)) }
    }

    /// Lock the session. A poisoned lock is recovered; the state is plain data.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// See [`Session::mint_nid`].
    pub fn mint_nid(&self, kind: NidKind, increment: bool) -> Result<Nid, Error> {
        self.lock().mint_nid(kind, increment)
    }

    /// See [`Session::next_nid`].
    pub fn next_nid(&self) -> Result<Nid, Error> {
        self.lock().next_nid()
    }
}

impl From<Session> for SharedSession {
    fn from(session: Session) -> Self { Self::new(session) }
}
