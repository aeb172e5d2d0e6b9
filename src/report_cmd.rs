//! CLI command handlers for `from-xml` and `from-capture`.
//!
//! Generation is all-or-nothing: the source is normalized, serialized and
//! composed in memory, and only a complete document is written. The outcome
//! (saved path or terminal error) is sent to the injected [`Reporter`].

use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tracing::{debug, info};

use crate::config::{ReportConfig, load_report_config};
use crate::core::clock;
use crate::logging::Reporter;
use crate::report::{Template, render_html, serialize_dataset, write_html};
use crate::source::{ExportedXmlSource, LiveSource, TransactionSource};
use crate::storage::CaptureLog;
use crate::{ReportError, ReportResult};

/// Options shared by every report command. CLI values win over the config file.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    pub output: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Normalize a source and compose the final document.
pub fn generate_report<S: TransactionSource>(
    source: S,
    template: &Template,
    generated_at: &OffsetDateTime,
) -> ReportResult<String> {
    let kind = source.kind();
    let records = source.normalize()?;
    info!(source = kind, records = records.len(), "normalized transactions");

    let dataset = serialize_dataset(&records)?;
    debug!(bytes = dataset.len(), "serialized dataset");

    Ok(render_html(template, &dataset, &clock::generated_at(generated_at)))
}

/// Generate a report from `source` and write it to `output`.
///
/// Returns the path actually written (with `.html` appended if needed).
pub fn run<S: TransactionSource>(
    source: S,
    output: &Path,
    template: &Template,
    reporter: &dyn Reporter,
) -> ReportResult<PathBuf> {
    report_outcome(generate_and_write(source, output, template, None), reporter)
}

/// Run the `from-xml` command.
pub fn run_xml(input: PathBuf, opts: CommandOptions, reporter: &dyn Reporter) -> ReportResult<PathBuf> {
    report_outcome(xml_report(&input, &opts), reporter)
}

/// Run the `from-capture` command.
pub fn run_capture(input: PathBuf, opts: CommandOptions, reporter: &dyn Reporter) -> ReportResult<PathBuf> {
    report_outcome(capture_report(&input, &opts), reporter)
}

fn xml_report(input: &Path, opts: &CommandOptions) -> ReportResult<PathBuf> {
    let plan = resolve(opts)?;
    info!(input = %input.display(), "reading XML export");
    let source = ExportedXmlSource::open(input)?;
    generate_and_write(source, &plan.output, &plan.template, plan.create_dir.as_deref())
}

fn capture_report(input: &Path, opts: &CommandOptions) -> ReportResult<PathBuf> {
    let plan = resolve(opts)?;
    info!(input = %input.display(), "reading capture log");
    let transactions = CaptureLog::new(input).read_all()?;
    generate_and_write(
        LiveSource::new(&transactions),
        &plan.output,
        &plan.template,
        plan.create_dir.as_deref(),
    )
}

/// Default file name: `<prefix>_MMddyyyy_HHmmss.html`, inside the configured
/// output directory if there is one.
pub fn default_output_path(config: &ReportConfig, at: &OffsetDateTime) -> PathBuf {
    let name = format!("{}_{}.html", config.file_prefix, clock::file_stamp(at));
    match &config.output_dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Nothing is created on disk until the report has been generated.
fn generate_and_write<S: TransactionSource>(
    source: S,
    output: &Path,
    template: &Template,
    create_dir: Option<&Path>,
) -> ReportResult<PathBuf> {
    let html = generate_report(source, template, &clock::now())?;
    if let Some(dir) = create_dir {
        std::fs::create_dir_all(dir).map_err(|source| ReportError::DestinationWrite {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    write_html(output, &html)
}

fn report_outcome(result: ReportResult<PathBuf>, reporter: &dyn Reporter) -> ReportResult<PathBuf> {
    match &result {
        Ok(path) => reporter.info(&format!("Report saved to: {}", path.display())),
        Err(e) => reporter.error(&format!("Error generating report: {e}")),
    }
    result
}

/// Template and destination for one command run.
struct Plan {
    template: Template,
    output: PathBuf,
    /// Configured output directory, created only once the report is ready.
    create_dir: Option<PathBuf>,
}

/// Work out the template and destination from CLI options and config.
fn resolve(opts: &CommandOptions) -> ReportResult<Plan> {
    let config = match &opts.config {
        Some(path) => load_report_config(path)?,
        None => ReportConfig::new(),
    };

    let template = match opts.template.as_ref().or(config.template.as_ref()) {
        Some(path) => Template::load(path)?,
        None => Template::bundled(),
    };

    let (output, create_dir) = match &opts.output {
        Some(path) => (path.clone(), None),
        None => (default_output_path(&config, &clock::now()), config.output_dir.clone()),
    };
    debug!(output = %output.display(), "resolved report destination");

    Ok(Plan {
        template,
        output,
        create_dir,
    })
}
