//! Report templates and their placeholder tokens.

use std::borrow::Cow;
use std::path::Path;

use tracing::debug;

use crate::{ReportError, ReportResult};

/// Replaced by the serialized dataset.
pub const DATA_PLACEHOLDER: &str = "<!-- JSON_DATA -->";
/// Replaced by the generation timestamp.
pub const GEN_TIME_PLACEHOLDER: &str = "<!-- GEN_TIME -->";

const BUNDLED_TEMPLATE: &str = include_str!("../../assets/template.html");

/// A static HTML document containing both placeholder tokens.
#[derive(Debug, Clone)]
pub struct Template {
    text: Cow<'static, str>,
}

impl Default for Template {
    fn default() -> Self {
        Self::bundled()
    }
}

impl Template {
    /// The template compiled into the crate.
    pub fn bundled() -> Self {
        Template {
            text: Cow::Borrowed(BUNDLED_TEMPLATE),
        }
    }

    /// Load a template from disk.
    ///
    /// # Errors
    /// - `TemplateMissing` if the file cannot be read
    /// - `TemplatePlaceholder` if a placeholder token is absent
    pub fn load(path: &Path) -> ReportResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "template read failed");
            ReportError::TemplateMissing(path.to_path_buf())
        })?;
        Self::from_text(text)
    }

    /// Build a template from text, checking that both placeholders are present.
    pub fn from_text(text: impl Into<String>) -> ReportResult<Self> {
        let text = text.into();
        for token in [DATA_PLACEHOLDER, GEN_TIME_PLACEHOLDER] {
            if !text.contains(token) {
                return Err(ReportError::TemplatePlaceholder(token));
            }
        }
        Ok(Template {
            text: Cow::Owned(text),
        })
    }

    /// Substitute both placeholders.
    ///
    /// Every occurrence of each token is replaced. The timestamp goes in first
    /// so the dataset text is never rescanned for tokens.
    pub fn fill(&self, dataset: &str, generated_at: &str) -> String {
        self.text
            .replace(GEN_TIME_PLACEHOLDER, generated_at)
            .replace(DATA_PLACEHOLDER, dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_has_placeholders() {
        assert!(BUNDLED_TEMPLATE.contains(DATA_PLACEHOLDER));
        assert!(BUNDLED_TEMPLATE.contains(GEN_TIME_PLACEHOLDER));
        assert!(Template::from_text(BUNDLED_TEMPLATE).is_ok());
    }

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let template = Template::from_text(format!(
            "{DATA_PLACEHOLDER}|{GEN_TIME_PLACEHOLDER}|{GEN_TIME_PLACEHOLDER}"
        ))
        .unwrap();
        assert_eq!(template.fill("[]", "2024-01-01 00:00:00"), "[]|2024-01-01 00:00:00|2024-01-01 00:00:00");
    }

    #[test]
    fn test_dataset_not_rescanned() {
        let template = Template::from_text(format!("{DATA_PLACEHOLDER} {GEN_TIME_PLACEHOLDER}")).unwrap();
        let filled = template.fill(GEN_TIME_PLACEHOLDER, "now");
        assert_eq!(filled, format!("{GEN_TIME_PLACEHOLDER} now"));
    }

    #[test]
    fn test_missing_placeholder_rejected() {
        let err = Template::from_text(format!("<html>{DATA_PLACEHOLDER}</html>")).unwrap_err();
        assert!(matches!(err, ReportError::TemplatePlaceholder(GEN_TIME_PLACEHOLDER)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.html");
        match Template::load(&path) {
            Err(ReportError::TemplateMissing(p)) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.html");
        std::fs::write(&path, format!("<p>{GEN_TIME_PLACEHOLDER}</p><script>{DATA_PLACEHOLDER}</script>")).unwrap();
        let template = Template::load(&path).unwrap();
        assert_eq!(template.fill("[]", "t"), "<p>t</p><script>[]</script>");
    }
}
