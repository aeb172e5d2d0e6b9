//! Dataset serialization: records to the JSON blob embedded in a report.
//!
//! The blob is a JSON array of fixed-key objects:
//!
//! ```text
//! [{"id":1,"h":"...","u":"...","m":"...","s":"...","t":"...","q":"...","r":"..."}, ...]
//! ```
//!
//! `id` is the 1-based position of the record. Every other value is base64:
//! `h`ost, `u`rl, `m`ethod, `s`tatus and `t`ime decode to UTF-8 text, `q`
//! (request) and `r` (response) decode to the original message bytes. `r` is
//! empty when there is no response.

use serde::{Deserialize, Serialize};

use crate::core::Record;
use crate::encoder;
use crate::{ReportError, ReportResult};

/// The serialized form of one [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub id: usize,
    pub h: String,
    pub u: String,
    pub m: String,
    pub s: String,
    pub t: String,
    pub q: String,
    pub r: String,
}

impl DatasetEntry {
    pub fn from_record(id: usize, record: &Record) -> Self {
        DatasetEntry {
            id,
            h: encoder::encode(record.host()),
            u: encoder::encode(record.url()),
            m: encoder::encode(record.method()),
            s: encoder::encode(record.status()),
            t: encoder::encode(record.observed_time()),
            q: record.request().to_encoded(),
            r: record.response().map(|p| p.to_encoded()).unwrap_or_default(),
        }
    }

    /// Decode every field back to its original value.
    pub fn decode(&self) -> ReportResult<DecodedEntry> {
        let bytes = |field: &'static str, value: &str| {
            encoder::decode(value).map_err(|e| ReportError::InvalidEntry {
                id: self.id,
                reason: format!("field '{field}': {e}"),
            })
        };
        let text = |field: &'static str, value: &str| {
            String::from_utf8(bytes(field, value)?).map_err(|e| ReportError::InvalidEntry {
                id: self.id,
                reason: format!("field '{field}': {e}"),
            })
        };

        Ok(DecodedEntry {
            id: self.id,
            host: text("h", &self.h)?,
            url: text("u", &self.u)?,
            method: text("m", &self.m)?,
            status: text("s", &self.s)?,
            time: text("t", &self.t)?,
            request: bytes("q", &self.q)?,
            response: bytes("r", &self.r)?,
        })
    }
}

/// A dataset entry with every field decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    pub id: usize,
    pub host: String,
    pub url: String,
    pub method: String,
    pub status: String,
    pub time: String,
    pub request: Vec<u8>,
    pub response: Vec<u8>,
}

/// Build entries in record order, numbering them from 1.
pub fn build_dataset(records: &[Record]) -> Vec<DatasetEntry> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| DatasetEntry::from_record(idx + 1, record))
        .collect()
}

/// Serialize records into the compact JSON blob embedded in reports.
pub fn serialize_dataset(records: &[Record]) -> ReportResult<String> {
    Ok(serde_json::to_string(&build_dataset(records))?)
}

/// Parse a blob produced by [`serialize_dataset`].
pub fn parse_dataset(json: &str) -> ReportResult<Vec<DatasetEntry>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NO_RESPONSE_STATUS, Payload};

    fn record(url: &str, response: Option<&[u8]>) -> Record {
        Record::new(
            "example.com",
            url,
            "GET",
            if response.is_some() { "200" } else { NO_RESPONSE_STATUS },
            "10:00:00",
            Payload::Raw(format!("GET {url} HTTP/1.1\r\n\r\n").into_bytes()),
            response.map(|r| Payload::Raw(r.to_vec())),
        )
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(serialize_dataset(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_ids_are_dense_and_ordered() {
        for n in [1usize, 2, 7] {
            let records: Vec<Record> = (0..n).map(|i| record(&format!("/{i}"), None)).collect();
            let entries = parse_dataset(&serialize_dataset(&records).unwrap()).unwrap();
            let ids: Vec<usize> = entries.iter().map(|e| e.id).collect();
            assert_eq!(ids, (1..=n).collect::<Vec<_>>());
            for (i, entry) in entries.iter().enumerate() {
                assert_eq!(entry.decode().unwrap().url, format!("/{i}"));
            }
        }
    }

    #[test]
    fn test_fixed_keys() {
        let json = serialize_dataset(&[record("/", Some(&b"HTTP/1.1 200 OK\r\n\r\n"[..]))]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value[0].as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["h", "id", "m", "q", "r", "s", "t", "u"]);
        assert!(obj["id"].is_u64());
    }

    #[test]
    fn test_missing_response_is_empty_string() {
        let entries = build_dataset(&[record("/", None)]);
        assert_eq!(entries[0].r, "");
        let decoded = entries[0].decode().unwrap();
        assert_eq!(decoded.status, "N/A");
        assert!(decoded.response.is_empty());
    }

    #[test]
    fn test_binary_response_roundtrips() {
        let body: &[u8] = &[0x00, 0xff, 0xc3, 0x28, 0x0a];
        let entries = build_dataset(&[record("/", Some(body))]);
        assert_eq!(entries[0].decode().unwrap().response, body);
    }

    #[test]
    fn test_blob_needs_no_escaping() {
        let r = Record::new(
            "h\u{1}",
            "/\"quote\"\\back</script>",
            "GET",
            "200",
            "10:00:00",
            Payload::Raw(b"\"\\<>".to_vec()),
            None,
        );
        let json = serialize_dataset(&[r]).unwrap();
        assert!(!json.contains('\\'));
        assert!(!json.contains('<'));
        assert_eq!(json.matches('"').count(), 2 * 8 + 2 * 7);
    }

    #[test]
    fn test_encoded_payload_passes_through() {
        let r = Record::new("", "", "", "", "", Payload::Encoded("aGVsbG8=".to_string()), None);
        assert_eq!(build_dataset(&[r])[0].q, "aGVsbG8=");
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let mut entry = build_dataset(&[record("/", None)]).remove(0);
        entry.q = "***".to_string();
        assert!(matches!(entry.decode(), Err(ReportError::InvalidEntry { id: 1, .. })));
    }
}
