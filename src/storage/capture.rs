//! JSONL (JSON Lines) capture logs of live transactions.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::source::{CapturedTransaction, RequestParts, ResponseParts, TransactionHandle};
use crate::{ReportError, ReportResult};

/// A transaction read back from a log, with the line it was stored on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedTransaction {
    pub line: usize,
    pub transaction: CapturedTransaction,
}

impl TransactionHandle for LoggedTransaction {
    fn host(&self) -> Option<&str> {
        self.transaction.host()
    }

    fn request(&self) -> Result<RequestParts<'_>, String> {
        self.transaction.request()
    }

    fn response(&self) -> Option<ResponseParts<'_>> {
        self.transaction.response()
    }

    fn position(&self, _index: usize) -> usize {
        self.line
    }
}

/// Append-only log of captured transactions.
///
/// Each transaction is stored as a single JSON line with raw message bytes
/// base64-encoded, so a capture can be appended to while it is being recorded
/// and replayed later as a live source.
#[derive(Debug, Clone)]
pub struct CaptureLog {
    path: PathBuf,
}

impl CaptureLog {
    /// Create a new CaptureLog for the given path.
    ///
    /// The file will be created if it doesn't exist when writing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        CaptureLog {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single transaction to the log.
    ///
    /// # Errors
    /// Returns `DestinationWrite` if the file or its parent directory cannot
    /// be created or written.
    pub fn append(&self, tx: &CapturedTransaction) -> ReportResult<()> {
        let write_err = |source| ReportError::DestinationWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        let json = serde_json::to_string(tx)?;
        writeln!(file, "{}", json).map_err(write_err)?;

        Ok(())
    }

    /// Read every transaction in the log, in order, tagged with its 1-based
    /// line number. Blank lines are skipped.
    ///
    /// # Errors
    /// - `InputOpen` if the file cannot be opened
    /// - `SourceRead` naming the 1-based line that cannot be read or parsed
    pub fn read_all(&self) -> ReportResult<Vec<LoggedTransaction>> {
        let file = File::open(&self.path).map_err(|source| ReportError::InputOpen {
            path: self.path.clone(),
            source,
        })?;

        let reader = BufReader::new(file);
        let mut transactions = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|e| ReportError::SourceRead {
                index: line_num + 1,
                reason: format!("failed to read line: {e}"),
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let transaction: CapturedTransaction =
                serde_json::from_str(&line).map_err(|e| ReportError::SourceRead {
                    index: line_num + 1,
                    reason: format!("failed to parse line: {e}"),
                })?;
            transactions.push(LoggedTransaction {
                line: line_num + 1,
                transaction,
            });
        }

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{CapturedRequest, CapturedResponse, LiveSource, TransactionSource};

    fn make_tx(path: &str, status: Option<u16>) -> CapturedTransaction {
        CapturedTransaction::new(
            Some("example.com"),
            CapturedRequest {
                method: "GET".to_string(),
                url: format!("https://example.com{path}"),
                raw: format!("GET {path} HTTP/1.1\r\n\r\n").into_bytes(),
            },
            status.map(|code| CapturedResponse {
                status_code: code,
                raw: vec![0x00, 0x9f, 0x92, 0x96],
            }),
        )
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let log = CaptureLog::new(dir.path().join("nested/capture.jsonl"));

        log.append(&make_tx("/a", Some(200))).unwrap();
        log.append(&make_tx("/b", None)).unwrap();

        let txs: Vec<CapturedTransaction> = log.read_all().unwrap().into_iter().map(|l| l.transaction).collect();
        assert_eq!(txs, vec![make_tx("/a", Some(200)), make_tx("/b", None)]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.jsonl");
        let line = serde_json::to_string(&make_tx("/a", None)).unwrap();
        std::fs::write(&path, format!("\n{line}\n   \n")).unwrap();

        let txs = CaptureLog::new(&path).read_all().unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].line, 2);
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.jsonl");
        let line = serde_json::to_string(&make_tx("/a", None)).unwrap();
        std::fs::write(&path, format!("{line}\n{{not json\n")).unwrap();

        let err = CaptureLog::new(&path).read_all().unwrap_err();
        assert!(matches!(err, ReportError::SourceRead { index: 2, .. }), "got {err}");
    }

    #[test]
    fn test_missing_request_names_file_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.jsonl");
        let good = serde_json::to_string(&make_tx("/a", Some(200))).unwrap();
        let no_request = serde_json::to_string(&CapturedTransaction { host: None, request: None, response: None }).unwrap();
        std::fs::write(&path, format!("{good}\n\n\n{no_request}\n")).unwrap();

        let logged = CaptureLog::new(&path).read_all().unwrap();
        let err = LiveSource::new(&logged).normalize().unwrap_err();
        assert!(matches!(err, ReportError::SourceRead { index: 4, .. }), "got {err}");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = CaptureLog::new(dir.path().join("missing.jsonl"));
        assert!(matches!(log.read_all(), Err(ReportError::InputOpen { .. })));
    }
}
