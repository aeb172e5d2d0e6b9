//! Adapter for exported XML documents.
//!
//! Expected shape:
//!
//! ```xml
//! <items>
//!   <item>
//!     <time>Mon Jan 15 12:00:00 UTC 2024</time>
//!     <url><![CDATA[https://example.com/]]></url>
//!     <host>example.com</host>
//!     <method>GET</method>
//!     <status>200</status>
//!     <request base64="true"><![CDATA[R0VUIC8gSFRUUC8xLjENCg0K]]></request>
//!     <response base64="false">HTTP/1.1 200 OK</response>
//!   </item>
//! </items>
//! ```
//!
//! Missing children resolve to empty strings. A `request`/`response` flagged
//! `base64="true"` is trusted as already encoded; otherwise its text is
//! encoded as opaque UTF-8.
//!
//! Documents in any ASCII-compatible encoding named by the XML declaration
//! (for example ISO-8859-1) are decoded to UTF-8 text before use.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::core::{Payload, Record};
use crate::{ReportError, ReportResult};

use super::TransactionSource;

const ITEM: &[u8] = b"item";
const BASE64_ATTR: &str = "base64";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Time,
    Url,
    Host,
    Method,
    Status,
    Request,
    Response,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"time" => Some(Field::Time),
            b"url" => Some(Field::Url),
            b"host" => Some(Field::Host),
            b"method" => Some(Field::Method),
            b"status" => Some(Field::Status),
            b"request" => Some(Field::Request),
            b"response" => Some(Field::Response),
            _ => None,
        }
    }
}

/// Text of a `request`/`response` element plus its encoding flag.
#[derive(Debug, Clone)]
struct PayloadText {
    text: String,
    base64: bool,
}

impl PayloadText {
    fn into_payload(self) -> Payload {
        if self.base64 {
            Payload::Encoded(self.text)
        } else {
            Payload::Raw(self.text.into_bytes())
        }
    }
}

#[derive(Debug, Default)]
struct ItemFields {
    time: String,
    url: String,
    host: String,
    method: String,
    status: String,
    request: Option<PayloadText>,
    response: Option<PayloadText>,
}

impl ItemFields {
    fn set(&mut self, field: Field, text: String, base64: bool) {
        match field {
            Field::Time => self.time = text,
            Field::Url => self.url = text,
            Field::Host => self.host = text,
            Field::Method => self.method = text,
            Field::Status => self.status = text,
            Field::Request => self.request = Some(PayloadText { text, base64 }),
            Field::Response => self.response = Some(PayloadText { text, base64 }),
        }
    }

    fn into_record(self) -> Record {
        // A missing <request> yields an empty payload rather than an error,
        // unlike the live source.
        let request = self
            .request
            .map(PayloadText::into_payload)
            .unwrap_or_else(|| Payload::Raw(Vec::new()));
        Record::new(
            self.host,
            self.url,
            self.method,
            self.status,
            self.time,
            request,
            self.response.map(PayloadText::into_payload),
        )
    }
}

/// Field element currently being read.
#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    base64: bool,
    text: String,
}

/// Normalizes an exported XML document read from any buffered reader.
pub struct ExportedXmlSource<R> {
    input: R,
}

impl<R: BufRead> ExportedXmlSource<R> {
    pub fn new(input: R) -> Self {
        ExportedXmlSource { input }
    }
}

impl ExportedXmlSource<BufReader<File>> {
    /// Open an export file from disk.
    pub fn open(path: &Path) -> ReportResult<Self> {
        let file = File::open(path).map_err(|source| ReportError::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TransactionSource for ExportedXmlSource<R> {
    fn kind(&self) -> &'static str {
        "xml"
    }

    fn normalize(self) -> ReportResult<Vec<Record>> {
        parse_items(self.input)
    }
}

fn malformed<R>(reader: &Reader<R>, message: impl std::fmt::Display) -> ReportError {
    ReportError::MalformedDocument(format!(
        "{message} (at byte {})",
        reader.buffer_position()
    ))
}

/// Check an opening tag for well-formedness and return its `base64` flag.
///
/// quick-xml reads attributes lazily, so every attribute is walked here with
/// duplicate checks on. Names and values are decoded with the document's
/// declared encoding.
fn read_start<R>(reader: &Reader<R>, start: &BytesStart<'_>) -> ReportResult<bool> {
    let decoder = reader.decoder();
    let qname = start.name();
    let name = decoder
        .decode(qname.as_ref())
        .map_err(|e| malformed(reader, e))?;
    if !is_xml_name(&name) {
        return Err(malformed(reader, format!("invalid element name {name:?}")));
    }

    let mut base64 = false;
    for attr in start.attributes().with_checks(true) {
        let attr = attr.map_err(|e| malformed(reader, e))?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(|e| malformed(reader, e))?;
        if !is_xml_name(&key) {
            return Err(malformed(reader, format!("invalid attribute name {key:?} on <{name}>")));
        }
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| malformed(reader, e))?;
        if key == BASE64_ATTR {
            base64 = value.trim().eq_ignore_ascii_case("true");
        }
    }
    Ok(base64)
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// XML 1.0 `Name` production.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

fn parse_items<R: BufRead>(input: R) -> ReportResult<Vec<Record>> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().check_end_names = true;

    let mut buf = Vec::new();
    // Names of currently open elements, outermost first.
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    let mut item: Option<ItemFields> = None;
    let mut capture: Option<Capture> = None;
    let mut records = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(&reader, e))?;

        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let is_empty = matches!(event, Event::Empty(_));
                let flag = read_start(&reader, start)?;
                if open.is_empty() {
                    if seen_root {
                        return Err(malformed(&reader, "multiple root elements"));
                    }
                    seen_root = true;
                }

                let depth = open.len() + 1;
                let local = start.local_name();
                if depth == 2 && local.as_ref() == ITEM {
                    item = Some(ItemFields::default());
                } else if depth == 3 && item.is_some() {
                    if let Some(field) = Field::from_name(local.as_ref()) {
                        let base64 = matches!(field, Field::Request | Field::Response) && flag;
                        capture = Some(Capture { field, depth, base64, text: String::new() });
                    }
                }

                if is_empty {
                    close_element(depth, &mut item, &mut capture, &mut records);
                } else {
                    open.push(start.name().as_ref().to_vec());
                }
            }
            Event::End(ref end) => {
                let Some(name) = open.pop() else {
                    return Err(malformed(&reader, "closing tag without matching opening tag"));
                };
                if name != end.name().as_ref() {
                    return Err(malformed(
                        &reader,
                        format!(
                            "expected </{}>, found </{}>",
                            String::from_utf8_lossy(&name),
                            String::from_utf8_lossy(end.name().as_ref())
                        ),
                    ));
                }
                close_element(open.len() + 1, &mut item, &mut capture, &mut records);
            }
            Event::Text(ref text) => {
                if open.is_empty() {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(malformed(&reader, "text outside the root element"));
                    }
                } else if let Some(capture) = capture.as_mut().filter(|c| c.depth == open.len()) {
                    let unescaped = text.unescape().map_err(|e| malformed(&reader, e))?;
                    capture.text.push_str(&unescaped);
                }
            }
            Event::CData(ref data) => {
                if open.is_empty() {
                    return Err(malformed(&reader, "CDATA outside the root element"));
                }
                if let Some(capture) = capture.as_mut().filter(|c| c.depth == open.len()) {
                    let text = data.decode().map_err(|e| malformed(&reader, e))?;
                    capture.text.push_str(&text);
                }
            }
            Event::Eof => {
                if let Some(name) = open.last() {
                    return Err(malformed(
                        &reader,
                        format!("unclosed element <{}>", String::from_utf8_lossy(name)),
                    ));
                }
                if !seen_root {
                    return Err(malformed(&reader, "document has no root element"));
                }
                break;
            }
            // Declarations, comments, processing instructions and doctypes carry no data.
            _ => {}
        }
        buf.clear();
    }

    debug!(items = records.len(), "parsed exported XML");
    Ok(records)
}

/// Finish whatever the element at `depth` was collecting.
fn close_element(
    depth: usize,
    item: &mut Option<ItemFields>,
    capture: &mut Option<Capture>,
    records: &mut Vec<Record>,
) {
    if capture.as_ref().is_some_and(|c| c.depth == depth) {
        if let (Some(fields), Some(done)) = (item.as_mut(), capture.take()) {
            fields.set(done.field, done.text, done.base64);
        }
    } else if depth == 2 {
        if let Some(fields) = item.take() {
            records.push(fields.into_record());
        }
    }
}
