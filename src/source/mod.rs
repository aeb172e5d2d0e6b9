//! Input adapters that normalize transactions into [`Record`]s.
//!
//! Two sources exist:
//! - `LiveSource`: already-structured transaction handles held in memory
//! - `ExportedXmlSource`: an exported XML document of `<item>` elements
//!
//! The dataset serializer only ever sees `Record`s, never the source.

pub mod live;
pub mod xml;

use crate::ReportResult;
use crate::core::Record;

// Re-export key types
pub use live::{CapturedRequest, CapturedResponse, CapturedTransaction, LiveSource, RequestParts, ResponseParts, TransactionHandle};
pub use xml::ExportedXmlSource;

/// A source of transactions that can be normalized into records.
pub trait TransactionSource {
    /// Short label used in log messages.
    fn kind(&self) -> &'static str;

    /// Normalize the whole source, in order. Any failure aborts the batch.
    fn normalize(self) -> ReportResult<Vec<Record>>;
}
