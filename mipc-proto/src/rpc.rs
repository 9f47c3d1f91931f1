//! `/ccm/` call framing.

/// The response format requested through the path extension.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    /// JSONP text (`.js`).
    Js,
    /// Raw JPEG bytes (`.jpg`).
    Jpg,
}

impl Format {
    /// Path extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Jpg => "jpg",
        }
    }
}

/// A device call ready to be sent as an HTTP GET.
#[derive(Clone, Debug, PartialEq)]
pub struct Rpc {
    /// The message type, e.g. `cacs_dh_req`.
    pub msg_type: &'static str,
    /// Requested response format.
    pub format: Format,
    /// Query parameters, in insertion order.
    pub params: Vec<(&'static str, String)>,
}

impl Rpc {
    /// A call answered with JSONP.
    pub fn js(msg_type: &'static str) -> Self {
        Self { msg_type, format: Format::Js, params: Vec::new() }
    }

    /// A call answered with raw JPEG bytes.
    pub fn jpg(msg_type: &'static str) -> Self {
        Self { msg_type, format: Format::Jpg, params: Vec::new() }
    }

    /// Append a query parameter.
    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    /// The value of parameter `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    /// The request path:
    ///
    /// ```text
    /// /ccm/{msg_type}.{js|jpg}
    /// ```
    pub fn path(&self) -> String {
        format!("/ccm/{}.{}", self.msg_type, self.format.extension())
    }
}
