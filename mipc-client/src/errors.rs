//! Error types for mipc-client.

use std::fmt;

// ─── InvocationError ──────────────────────────────────────────────────────────

/// The error type returned from any `Client` method that talks to the camera.
#[derive(Debug)]
pub enum InvocationError {
    /// The transport failed (connection, non-2xx status, …).
    Transport(Box<dyn std::error::Error + Send + Sync>),
    /// Signing, handshake or login failed, or the body could not be decoded.
    Protocol(mipc_proto::Error),
    /// The device answered, but not with what the call expects.
    UnexpectedResponse(String),
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e)          => write!(f, "transport error: {e}"),
            Self::Protocol(e)           => write!(f, "{e}"),
            Self::UnexpectedResponse(s) => write!(f, "unexpected response: {s}"),
        }
    }
}

impl std::error::Error for InvocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e)          => Some(e.as_ref()),
            Self::Protocol(e)           => Some(e),
            Self::UnexpectedResponse(_) => None,
        }
    }
}

impl From<mipc_proto::Error> for InvocationError {
    fn from(e: mipc_proto::Error) -> Self { Self::Protocol(e) }
}

impl From<mipc_proto::authentication::Error> for InvocationError {
    fn from(e: mipc_proto::authentication::Error) -> Self { Self::Protocol(e.into()) }
}

impl From<mipc_crypto::Error> for InvocationError {
    fn from(e: mipc_crypto::Error) -> Self { Self::Protocol(e.into()) }
}

impl InvocationError {
    /// Returns `true` if the device refused the login.
    pub fn is_login_rejected(&self) -> bool {
        matches!(self, Self::Protocol(mipc_proto::Error::LoginRejected { .. }))
    }
}
