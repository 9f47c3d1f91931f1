//! # mipc-client
//!
//! Blocking client for MIPC-compatible IP cameras.
//!
//! ## Features
//! - DH key exchange and encrypted-credential login
//! - nid request signing, with the sequence shared across clones of the session
//! - JPEG snapshots, RTMP stream URLs and pan/tilt control
//! - Bring-your-own HTTP stack through [`Transport`]
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn run<T: mipc_proto::transport::Transport>(http: T) -> Result<(), mipc_client::InvocationError> {
//! use mipc_client::{Client, Config, Ptz};
//!
//! let mut client = Client::connect(Config::from_env(), http)?;
//! let jpeg = client.snapshot()?;
//! client.control_ptz(Ptz::new(10, 0))?;
//! # Ok(()) }
//! ```

#![deny(unsafe_code)]

mod errors;
pub mod transport;

pub use errors::InvocationError;
pub use mipc_proto::transport::Transport;
pub use transport::InMemoryTransport;

use mipc_crypto::KeyPair;
use mipc_proto::rpc::{Format, Rpc};
use mipc_proto::{SharedSession, authentication, jsonp, login};
use serde_json::Value;

// ─── Message types ───────────────────────────────────────────────────────────

const MSG_INFO_GET: &str = "ccm_info_get";
const MSG_PIC_GET:  &str = "ccm_pic_get";
const MSG_PLAY:     &str = "ccm_play";
const MSG_PTZ_CTL:  &str = "ccm_ptz_ctl";
const MSG_PTZ_ACK:  &str = "ccm_ptz_ctl_ack";

/// Snapshot token the firmware expects verbatim.
const SNAPSHOT_TOKEN: &str = "p0_xxxxxxxxxx";

// ─── Config ───────────────────────────────────────────────────────────────────

/// Configuration for [`Client::new`] and [`Client::connect`].
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Camera address, `host` or `host:port`.
    pub host:        String,
    /// Account name sent as `duser`.
    pub username:    String,
    /// Plain password; only its encrypted hash leaves the client.
    pub password:    String,
    /// Fixed DH private exponent; a random one is drawn when `None`.
    pub private_key: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host:        "192.168.1.1".to_string(),
            username:    "admin".to_string(),
            password:    String::new(),
            private_key: None,
        }
    }
}

impl Config {
    /// Defaults overridden by `CAMERA_HOST`, `CAMERA_USER` and `CAMERA_PASSWORD`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("CAMERA_HOST")     { config.host = v; }
        if let Ok(v) = std::env::var("CAMERA_USER")     { config.username = v; }
        if let Ok(v) = std::env::var("CAMERA_PASSWORD") { config.password = v; }
        config
    }
}

// ─── Stream profile ──────────────────────────────────────────────────────────

/// Stream quality selector for [`Client::rtmp_stream`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Profile {
    /// Token `p0`, the device default.
    #[default]
    P0,
    /// Token `p1`.
    P1,
    /// Token `p2`.
    P2,
    /// Token `p3`.
    P3,
}

impl Profile {
    /// The `dtoken` value for this profile.
    pub fn token(self) -> &'static str {
        match self {
            Self::P0 => "p0",
            Self::P1 => "p1",
            Self::P2 => "p2",
            Self::P3 => "p3",
        }
    }
}

// ─── Ptz ─────────────────────────────────────────────────────────────────────

/// A pan/tilt move for [`Client::control_ptz`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ptz {
    /// Pan step.
    pub x:       i32,
    /// Tilt step.
    pub y:       i32,
    /// Pan motor speed.
    pub speed_x: u32,
    /// Tilt motor speed.
    pub speed_y: u32,
}

impl Ptz {
    /// A move by `(x, y)` at the default speeds.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y, speed_x: 48, speed_y: 16 }
    }

    /// Override both speeds.
    pub fn speed(mut self, x: u32, y: u32) -> Self {
        self.speed_x = x;
        self.speed_y = y;
        self
    }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// The camera client.
///
/// Owns the transport. The session is a [`SharedSession`], so tokens may be
/// minted from clones of it on other threads without reusing a sequence value.
pub struct Client<T: Transport> {
    transport: T,
    host:      String,
    username:  String,
    password:  String,
    keys:      KeyPair,
    session:   SharedSession,
    sn:        Option<String>,
}

impl<T: Transport> Client<T> {
    // ── Setup ──────────────────────────────────────────────────────────────

    /// Create a client. No request is sent.
    pub fn new(config: Config, transport: T) -> Result<Self, InvocationError> {
        let keys = key_pair(config.private_key)?;
        Ok(Self {
            transport,
            host:     config.host,
            username: config.username,
            password: config.password,
            keys,
            session:  SharedSession::default(),
            sn:       None,
        })
    }

    /// Create a client and log in with the configured credentials.
    pub fn connect(config: Config, transport: T) -> Result<Self, InvocationError> {
        let mut client = Self::new(config, transport)?;
        let (username, password) = (client.username.clone(), client.password.clone());
        client.login(&username, &password)?;
        Ok(client)
    }

    /// Replace the DH key pair, drawing a random exponent when `private` is `None`.
    pub fn init_keys(&mut self, private: Option<u64>) -> Result<(), InvocationError> {
        self.keys = key_pair(private)?;
        Ok(())
    }

    /// The configured camera address.
    pub fn host(&self) -> &str { &self.host }

    /// The DH key pair used by the next handshake.
    pub fn keys(&self) -> &KeyPair { &self.keys }

    /// The session shared with this client.
    pub fn session(&self) -> &SharedSession { &self.session }

    /// The underlying transport.
    pub fn transport(&self) -> &T { &self.transport }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T { &mut self.transport }

    // ── Auth ───────────────────────────────────────────────────────────────

    /// Run the DH key exchange.
    pub fn handshake(&mut self) -> Result<(), InvocationError> {
        let tid = self.session.lock().tid().to_string();
        let (req, step) = authentication::step1(&self.keys, &tid);
        let resp = self.call(&req)?;
        let done = authentication::finish(step, &resp)?;
        self.session.lock().apply_handshake(done);
        tracing::debug!("[mipc] Handshake with {} complete", self.host);
        Ok(())
    }

    /// Log in, running the handshake first when no shared secret is held.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), InvocationError> {
        if self.session.lock().shared_secret().is_none() {
            self.handshake()?;
        }
        let req = login::request(&mut self.session.lock(), username, password, true)?;
        let resp = self.call(&req)?;
        login::finish(&mut self.session.lock(), &resp)?;
        tracing::info!("[mipc] Logged in to {} as {username}", self.host);
        Ok(())
    }

    /// Mint the next request token.
    pub fn nid(&self) -> Result<String, InvocationError> {
        Ok(self.session.next_nid()?.value)
    }

    // ── Raw calls ──────────────────────────────────────────────────────────

    /// Send `msg_type` with `params` and parse the JSONP answer.
    pub fn rpc(&mut self, msg_type: &'static str, params: Vec<(&'static str, String)>) -> Result<Value, InvocationError> {
        let rpc = Rpc { msg_type, format: Format::Js, params };
        self.call(&rpc)
    }

    /// Send `msg_type` with `params` and return the body untouched.
    pub fn rpc_raw(&mut self, msg_type: &'static str, params: Vec<(&'static str, String)>, format: Format) -> Result<Vec<u8>, InvocationError> {
        let rpc = Rpc { msg_type, format, params };
        self.send(&rpc)
    }

    fn send(&mut self, rpc: &Rpc) -> Result<Vec<u8>, InvocationError> {
        tracing::debug!("[mipc] {} {} {:?}", self.host, rpc.path(), rpc.params);
        self.transport
            .send(rpc)
            .map_err(|e| InvocationError::Transport(Box::new(e)))
    }

    fn call(&mut self, rpc: &Rpc) -> Result<Value, InvocationError> {
        let body = self.send(rpc)?;
        let value = jsonp::parse(&String::from_utf8_lossy(&body))?;
        tracing::trace!("[mipc] {} -> {value}", rpc.msg_type);
        Ok(value)
    }

    // ── Camera calls ───────────────────────────────────────────────────────

    /// The camera serial number, fetched once and cached.
    pub fn device_sn(&mut self) -> Result<String, InvocationError> {
        if let Some(sn) = &self.sn {
            return Ok(sn.clone());
        }
        let resp = self.call(&Rpc::js(MSG_INFO_GET))?;
        match jsonp::field(&resp, &["data", "sn"]).and_then(jsonp::text).filter(|s| !s.is_empty()) {
            Some(sn) => {
                self.sn = Some(sn.clone());
                Ok(sn)
            }
            None => {
                tracing::warn!("[mipc] {MSG_INFO_GET} did not contain a camera SN: {resp}");
                Err(InvocationError::UnexpectedResponse(resp.to_string()))
            }
        }
    }

    /// Start a signed call: mint a token, then attach the serial number.
    fn signed(&mut self, rpc: Rpc) -> Result<Rpc, InvocationError> {
        let nid = self.nid()?;
        let sn = self.device_sn()?;
        Ok(rpc.param("dsess", 1).param("dsess_nid", nid).param("dsess_sn", sn))
    }

    /// A JPEG snapshot of the current view.
    pub fn snapshot(&mut self) -> Result<Vec<u8>, InvocationError> {
        let rpc = self.signed(Rpc::jpg(MSG_PIC_GET))?.param("dtoken", SNAPSHOT_TOKEN);
        self.send(&rpc)
    }

    /// The RTMP URL of the live stream for `profile`.
    pub fn rtmp_stream(&mut self, profile: Profile) -> Result<String, InvocationError> {
        let rpc = self
            .signed(Rpc::js(MSG_PLAY))?
            .param("dsetup", 1)
            .param("dsetup_stream", "RTP_Unicast")
            .param("dsetup_trans", 1)
            .param("dsetup_trans_proto", "rtmp")
            .param("dtoken", profile.token());
        let resp = self.call(&rpc)?;
        jsonp::field(&resp, &["data", "uri", "url"])
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| InvocationError::UnexpectedResponse(resp.to_string()))
    }

    /// Move the camera. An unexpected ack is logged, not treated as failure.
    pub fn control_ptz(&mut self, ptz: Ptz) -> Result<(), InvocationError> {
        let rpc = self
            .signed(Rpc::js(MSG_PTZ_CTL))?
            .param("dtoken", "ptz0")
            .param("dtrans", 1)
            .param("dtrans_pan_tilt", 1)
            .param("dtrans_pan_tilt_x", ptz.x)
            .param("dtrans_pan_tilt_y", ptz.y)
            .param("dtrans_pan_tilt_z", 0)
            .param("dspeed", 1)
            .param("dspeed_pan_tilt", 1)
            .param("dspeed_pan_tilt_x", ptz.speed_x)
            .param("dspeed_pan_tilt_y", ptz.speed_y)
            .param("ddome_cmd", 0);
        let resp = self.call(&rpc)?;
        if resp.get("type").and_then(Value::as_str) != Some(MSG_PTZ_ACK) {
            tracing::warn!("[mipc] Unexpected response to {MSG_PTZ_CTL}: {resp}");
        }
        Ok(())
    }
}

impl<T: Transport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("host", &self.host).finish_non_exhaustive()
    }
}

fn key_pair(private: Option<u64>) -> Result<KeyPair, InvocationError> {
    match private {
        Some(p) => Ok(KeyPair::from_private(p)),
        None    => Ok(KeyPair::generate()?),
    }
}
