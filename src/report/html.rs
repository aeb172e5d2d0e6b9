//! Single-file HTML report composition and output.
//!
//! The dataset is embedded into a `<script type="application/json">` block of
//! the template and the generation time is written into the header. Output is
//! written atomically: either the whole document lands at the destination or
//! nothing does.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::report::Template;
use crate::{ReportError, ReportResult};

/// Escape JSON for safe embedding inside an HTML `<script type="application/json">` tag.
///
/// `<` is replaced with `\u003c` so that `</script>` or `<!--` can never end the
/// block early. The result is still valid JSON. Datasets built from base64
/// fields never contain `<`, so for them this is the identity.
fn escape_json_for_html_script(json: &str) -> String {
    json.replace('<', "\\u003c")
}

/// Compose the final document from a template, a dataset blob and a
/// generation timestamp.
pub fn render_html(template: &Template, dataset_json: &str, generated_at: &str) -> String {
    template.fill(&escape_json_for_html_script(dataset_json), generated_at)
}

/// Append `.html` unless the path already ends with it (any case).
pub fn normalize_output_path(path: &Path) -> PathBuf {
    let has_html_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    if has_html_ext {
        path.to_path_buf()
    } else {
        let mut os = path.as_os_str().to_os_string();
        os.push(".html");
        PathBuf::from(os)
    }
}

/// Write a rendered report, returning the final (normalized) path.
///
/// The document goes to a temporary file next to the destination that is
/// then renamed over it, so a failure never leaves a partial report.
pub fn write_html(path: &Path, html: &str) -> ReportResult<PathBuf> {
    let path = normalize_output_path(path);
    let write_err = |source| ReportError::DestinationWrite {
        path: path.clone(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(html.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(&path).map_err(|e| write_err(e.error))?;

    Ok(path)
}
