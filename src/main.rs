#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use http_report::logging::TracingReporter;
use http_report::report_cmd::{self, CommandOptions};

#[derive(Parser, Debug)]
#[command(name = "http-report")]
#[command(about = "Generate self-contained HTML reports from captured HTTP transactions", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set HTTP_REPORT_LOG)
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Report path (".html" is appended if missing). Defaults to <prefix>_MMddyyyy_HHmmss.html
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// HTML template to use instead of the bundled one
    #[arg(long)]
    template: Option<PathBuf>,
    /// Report config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl From<OutputArgs> for CommandOptions {
    fn from(args: OutputArgs) -> Self {
        CommandOptions {
            output: args.output,
            template: args.template,
            config: args.config,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a report from an exported XML document of <item> elements
    FromXml {
        /// Path to the XML export
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Build a report from a JSONL capture log of live transactions
    FromCapture {
        /// Path to the capture log (one transaction per line)
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("HTTP_REPORT_LOG").unwrap_or_else(|_| {
        if verbose { "http_report=debug".to_string() } else { "http_report=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let reporter = TracingReporter;
    let result = match cli.command {
        Commands::FromXml { input, out } => report_cmd::run_xml(input, out.into(), &reporter),
        Commands::FromCapture { input, out } => report_cmd::run_capture(input, out.into(), &reporter),
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
