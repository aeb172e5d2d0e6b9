use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{ReportError, ReportResult};

pub const DEFAULT_FILE_PREFIX: &str = "http_report";

/// Settings for report generation, usually loaded from a TOML file:
///
/// ```toml
/// [report]
/// template = "templates/custom.html"
/// output_dir = "reports"
/// file_prefix = "pentest"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    #[serde(default)]
    template: Option<PathBuf>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
    #[serde(default)]
    file_prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    report: RawReport,
}

impl ReportConfig {
    pub fn new() -> Self {
        ReportConfig {
            template: None,
            output_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }

    pub fn from_toml_str(s: &str) -> ReportResult<Self> {
        let raw: RawConfig = toml::from_str(s).map_err(|e| ReportError::Config(e.to_string()))?;
        let prefix = raw.report.file_prefix.unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string());
        if prefix.trim().is_empty() || prefix.contains(['/', '\\']) {
            return Err(ReportError::Config(format!("invalid file_prefix '{prefix}'")));
        }
        Ok(ReportConfig {
            template: raw.report.template,
            output_dir: raw.report.output_dir,
            file_prefix: prefix,
        })
    }
}

/// Load a report config from a TOML file.
///
/// Relative `template` and `output_dir` paths are resolved against the
/// directory containing the config file.
pub fn load_report_config(path: &Path) -> ReportResult<ReportConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| ReportError::Config(format!("{}: {e}", path.display())))?;
    let mut cfg = ReportConfig::from_toml_str(&s)?;

    if let Some(base) = path.parent() {
        cfg.template = cfg.template.map(|p| base.join(p));
        cfg.output_dir = cfg.output_dir.map(|p| base.join(p));
    }
    Ok(cfg)
}
