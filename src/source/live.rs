//! Adapter for live, already-structured transactions.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::core::{NO_RESPONSE_STATUS, Payload, Record, clock};
use crate::encoder::bytes_b64;
use crate::{ReportError, ReportResult};

use super::TransactionSource;

/// Request view exposed by a transaction handle.
#[derive(Debug, Clone, Copy)]
pub struct RequestParts<'a> {
    pub method: &'a str,
    pub url: &'a str,
    /// Full request message: start line, headers and body.
    pub raw: &'a [u8],
}

/// Response view exposed by a transaction handle.
#[derive(Debug, Clone, Copy)]
pub struct ResponseParts<'a> {
    pub status_code: u16,
    pub raw: &'a [u8],
}

/// A captured transaction as exposed by a host application.
pub trait TransactionHandle {
    /// Host of the associated service, if any.
    fn host(&self) -> Option<&str>;

    /// The request. A transaction without a readable request is an error.
    fn request(&self) -> Result<RequestParts<'_>, String>;

    /// The response, if one was captured.
    fn response(&self) -> Option<ResponseParts<'_>>;

    /// 1-based position named in a `SourceRead` error. `index` is the
    /// handle's place in the batch; handles read from a file report their line.
    fn position(&self, index: usize) -> usize {
        index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    #[serde(with = "bytes_b64")]
    pub raw: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub status_code: u16,
    #[serde(with = "bytes_b64")]
    pub raw: Vec<u8>,
}

/// Owned transaction handle, as stored in capture logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default)]
    pub request: Option<CapturedRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<CapturedResponse>,
}

impl CapturedTransaction {
    pub fn new(host: Option<&str>, request: CapturedRequest, response: Option<CapturedResponse>) -> Self {
        CapturedTransaction {
            host: host.map(str::to_string),
            request: Some(request),
            response,
        }
    }
}

impl TransactionHandle for CapturedTransaction {
    fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    fn request(&self) -> Result<RequestParts<'_>, String> {
        let request = self
            .request
            .as_ref()
            .ok_or_else(|| "transaction has no request".to_string())?;
        Ok(RequestParts {
            method: &request.method,
            url: &request.url,
            raw: &request.raw,
        })
    }

    fn response(&self) -> Option<ResponseParts<'_>> {
        self.response.as_ref().map(|r| ResponseParts {
            status_code: r.status_code,
            raw: &r.raw,
        })
    }
}

/// Normalizes a slice of live transaction handles.
///
/// Each record is stamped with the wall-clock time (`HH:mm:ss`) at which it
/// was normalized. Message bytes are copied verbatim.
pub struct LiveSource<'a, T> {
    handles: &'a [T],
    clock: Box<dyn Fn() -> OffsetDateTime + 'a>,
}

impl<'a, T: TransactionHandle> LiveSource<'a, T> {
    pub fn new(handles: &'a [T]) -> Self {
        Self::with_clock(handles, clock::now)
    }

    /// Use a custom clock for observed times.
    pub fn with_clock(handles: &'a [T], clock: impl Fn() -> OffsetDateTime + 'a) -> Self {
        LiveSource {
            handles,
            clock: Box::new(clock),
        }
    }
}

impl<T: TransactionHandle> TransactionSource for LiveSource<'_, T> {
    fn kind(&self) -> &'static str {
        "live"
    }

    fn normalize(self) -> ReportResult<Vec<Record>> {
        let mut records = Vec::with_capacity(self.handles.len());

        for (idx, handle) in self.handles.iter().enumerate() {
            let position = handle.position(idx + 1);
            let request = handle.request().map_err(|reason| ReportError::SourceRead {
                index: position,
                reason,
            })?;
            let response = handle.response();

            let status = response
                .map(|r| r.status_code.to_string())
                .unwrap_or_else(|| NO_RESPONSE_STATUS.to_string());
            let observed_time = clock::time_of_day(&(self.clock)());

            debug!(index = position, method = request.method, url = request.url, "normalized live transaction");
            records.push(Record::new(
                handle.host().unwrap_or_default(),
                request.url,
                request.method,
                status,
                observed_time,
                Payload::Raw(request.raw.to_vec()),
                response.map(|r| Payload::Raw(r.raw.to_vec())),
            ));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn fixed_clock() -> OffsetDateTime {
        datetime!(2024-01-15 12:34:56 UTC)
    }

    fn get(url: &str) -> CapturedRequest {
        CapturedRequest {
            method: "GET".to_string(),
            url: url.to_string(),
            raw: format!("GET {url} HTTP/1.1\r\nHost: example.com\r\n\r\n").into_bytes(),
        }
    }

    #[test]
    fn test_normalize_preserves_order_and_fields() {
        let handles = vec![
            CapturedTransaction::new(
                Some("example.com"),
                get("https://example.com/a"),
                Some(CapturedResponse { status_code: 200, raw: b"HTTP/1.1 200 OK\r\n\r\n".to_vec() }),
            ),
            CapturedTransaction::new(Some("example.com"), get("https://example.com/b"), None),
        ];

        let records = LiveSource::with_clock(&handles, fixed_clock).normalize().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url(), "https://example.com/a");
        assert_eq!(records[0].status(), "200");
        assert_eq!(records[0].observed_time(), "12:34:56");
        assert_eq!(
            records[0].response(),
            Some(&Payload::Raw(b"HTTP/1.1 200 OK\r\n\r\n".to_vec()))
        );
        assert_eq!(records[1].url(), "https://example.com/b");
        assert_eq!(records[1].status(), NO_RESPONSE_STATUS);
        assert!(records[1].response().is_none());
    }

    #[test]
    fn test_missing_host_is_empty() {
        let handles = vec![CapturedTransaction::new(None, get("/x"), None)];
        let records = LiveSource::with_clock(&handles, fixed_clock).normalize().unwrap();
        assert_eq!(records[0].host(), "");
    }

    #[test]
    fn test_binary_request_copied_verbatim() {
        let mut request = get("/upload");
        request.raw.extend_from_slice(&[0x00, 0xff, 0xfe]);
        let handles = vec![CapturedTransaction::new(Some("h"), request.clone(), None)];

        let records = LiveSource::with_clock(&handles, fixed_clock).normalize().unwrap();
        assert_eq!(records[0].request(), &Payload::Raw(request.raw));
    }

    #[test]
    fn test_missing_request_aborts_batch() {
        let handles = vec![
            CapturedTransaction::new(Some("h"), get("/ok"), None),
            CapturedTransaction { host: Some("h".to_string()), request: None, response: None },
        ];

        let err = LiveSource::with_clock(&handles, fixed_clock).normalize().unwrap_err();
        match err {
            ReportError::SourceRead { index, reason } => {
                assert_eq!(index, 2);
                assert!(reason.contains("no request"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_source() {
        let handles: Vec<CapturedTransaction> = Vec::new();
        let records = LiveSource::new(&handles).normalize().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_captured_transaction_json_uses_base64() {
        let tx = CapturedTransaction::new(Some("h"), get("/"), None);
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains(&format!("\"raw\":\"{}\"", crate::encoder::encode(&tx.request.as_ref().unwrap().raw))));
        let back: CapturedTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }
}
