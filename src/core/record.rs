//! The normalized transaction record every source adapter produces.

use crate::encoder;

/// Status reported for a transaction that has no response.
pub const NO_RESPONSE_STATUS: &str = "N/A";

/// A request or response message body as carried by a [`Record`].
///
/// Live captures carry raw bytes; XML exports may carry text that is already
/// base64. Both resolve to the same encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw message bytes, encoded on serialization.
    Raw(Vec<u8>),
    /// Text trusted to be base64 already; passed through unchanged.
    Encoded(String),
}

impl Payload {
    /// The payload in its embedded (base64) form.
    pub fn to_encoded(&self) -> String {
        match self {
            Payload::Raw(bytes) => encoder::encode(bytes),
            Payload::Encoded(text) => text.clone(),
        }
    }
}

/// One normalized HTTP transaction. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    host: String,
    url: String,
    method: String,
    status: String,
    observed_time: String,
    request: Payload,
    response: Option<Payload>,
}

impl Record {
    pub fn new(
        host: impl Into<String>,
        url: impl Into<String>,
        method: impl Into<String>,
        status: impl Into<String>,
        observed_time: impl Into<String>,
        request: Payload,
        response: Option<Payload>,
    ) -> Self {
        Record {
            host: host.into(),
            url: url.into(),
            method: method.into(),
            status: status.into(),
            observed_time: observed_time.into(),
            request,
            response,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn observed_time(&self) -> &str {
        &self.observed_time
    }

    pub fn request(&self) -> &Payload {
        &self.request
    }

    pub fn response(&self) -> Option<&Payload> {
        self.response.as_ref()
    }
}
