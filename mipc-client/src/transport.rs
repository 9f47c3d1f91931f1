//! An in-memory [`Transport`] that replays canned device responses.
//!
//! Useful for testing, or for driving a [`crate::Client`] against captured
//! traffic.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use mipc_proto::transport::Transport;

/// A request seen by [`InMemoryTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    /// Request path, e.g. `/ccm/cacs_dh_req.js`.
    pub path: String,
    /// Query parameters in the order sent.
    pub query: Vec<(&'static str, String)>,
}

impl Request {
    /// The value of query parameter `key`, if sent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }
}

/// No response was queued for a path.
#[derive(Clone, Debug, PartialEq)]
pub struct NoResponse {
    /// The path that was requested.
    pub path: String,
}

impl fmt::Display for NoResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no response queued for {}", self.path)
    }
}

impl std::error::Error for NoResponse {}

/// Answers each path from its own queue of bodies and records every request.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    responses: HashMap<String, VecDeque<Vec<u8>>>,
    requests:  Vec<Request>,
}

impl InMemoryTransport {
    /// An empty transport with no queued responses.
    pub fn new() -> Self { Self::default() }

    /// Queue `body` as the next answer for `path`.
    pub fn respond(&mut self, path: &str, body: impl Into<Vec<u8>>) -> &mut Self {
        self.responses.entry(path.to_string()).or_default().push_back(body.into());
        self
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> &[Request] { &self.requests }

    /// The most recent request to `path`.
    pub fn last(&self, path: &str) -> Option<&Request> {
        self.requests.iter().rev().find(|r| r.path == path)
    }
}

impl Transport for InMemoryTransport {
    type Error = NoResponse;

    fn get(&mut self, path: &str, query: &[(&'static str, String)]) -> Result<Vec<u8>, NoResponse> {
        self.requests.push(Request { path: path.to_string(), query: query.to_vec() });
        self.responses
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| NoResponse { path: path.to_string() })
    }
}
