//! Pluggable transport layer.
//!
//! Implement [`Transport`] over any HTTP client to drive the camera. The
//! protocol layer only needs plain GET requests with query parameters.

use crate::rpc::Rpc;

/// An HTTP GET round-trip to the camera.
///
/// Implementations own the host, timeouts and connection reuse, and should
/// treat non-2xx statuses as errors.
pub trait Transport {
    /// The error type returned by a round-trip.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue `GET {path}?{query}` and return the response body.
    fn get(&mut self, path: &str, query: &[(&'static str, String)]) -> Result<Vec<u8>, Self::Error>;

    /// Send `rpc` and return the raw response body.
    fn send(&mut self, rpc: &Rpc) -> Result<Vec<u8>, Self::Error> {
        self.get(&rpc.path(), &rpc.params)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn get(&mut self, path: &str, query: &[(&'static str, String)]) -> Result<Vec<u8>, Self::Error> {
        (**self).get(path, query)
    }
}
