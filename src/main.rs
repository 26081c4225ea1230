//! `webpdf <url> [-o <path>]`: render a web page with headless Chrome and
//! save it as a PDF.
//!
//! Prints `Successfully created PDF: <path>` and exits `0` on success; prints
//! `Error: <message>` to stderr and exits `1` otherwise. Logs go to stderr.

use clap::{ArgAction, Parser};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use webpdf_config::Config;
use webpdf_convert::{Converter, ErrorKind};
use webpdf_render::{Chrome, DocumentFormatter, PageRenderer};

#[derive(Debug, Parser)]
#[command(name = "webpdf", version, about = "Convert a URL to PDF")]
struct Cli {
    /// The URL to convert
    url: String,
    /// Output file path (derived from the URL when omitted)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Chrome/Chromium executable to use instead of discovering one
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,
    /// Seconds a single Chrome invocation may run before it is killed
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Milliseconds the page may sit without network activity before it counts as loaded
    #[arg(long, value_name = "MS")]
    idle_budget: Option<u64>,
    /// Run Chrome without its sandbox (required when running as root)
    #[arg(long)]
    no_sandbox: bool,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Command-line flags win over the environment.
    fn apply(&self, config: &mut Config) {
        if let Some(chrome) = &self.chrome {
            config.chrome.executable = Some(chrome.clone());
        }
        if let Some(timeout) = self.timeout {
            config.chrome.timeout = timeout;
        }
        if let Some(idle_budget) = self.idle_budget {
            config.chrome.idle_budget = idle_budget;
        }
        if self.no_sandbox {
            config.chrome.sandbox = false;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let outcome = run(&cli);
    ExitCode::from(report(outcome, &mut io::stdout().lock(), &mut io::stderr().lock()))
}

fn init_logging(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).try_init();
}

fn run(cli: &Cli) -> Result<PathBuf, String> {
    let mut config = Config::load().map_err(|err| {
        tracing::debug!(error = ?err, "Configuration failed");
        (*err).to_string()
    })?;
    cli.apply(&mut config);
    // Reject bad input before spending time looking for a browser.
    webpdf_convert::parse(&cli.url).map_err(describe)?;
    let chrome = Chrome::discover(config.chrome.clone()).map_err(|err| describe(ErrorKind::render(&cli.url, err)))?;
    convert(Converter::new(&chrome, &chrome).with_output_dir(config.output_dir), cli)
}

fn convert<R: PageRenderer, F: DocumentFormatter>(converter: Converter<R, F>, cli: &Cli) -> Result<PathBuf, String> {
    converter.convert(&cli.url, cli.output.as_deref()).map_err(describe)
}

/// Logs the full error tree and keeps the top-level message for the user.
fn describe(err: webpdf_convert::error::Error) -> String {
    tracing::debug!(error = ?err, "Conversion failed");
    (*err).to_string()
}

/// Prints the outcome and picks the exit code. A success that cannot be
/// reported (closed stdout, full disk) still exits 1.
fn report(outcome: Result<PathBuf, String>, out: &mut impl Write, err: &mut impl Write) -> u8 {
    match outcome {
        Ok(path) => match writeln!(out, "Successfully created PDF: {}", path.display()).and_then(|()| out.flush()) {
            Ok(()) => 0,
            Err(write_err) => {
                tracing::debug!(error = %write_err, "Could not report success");
                let _ = writeln!(err, "Error: cannot write to stdout: {write_err}");
                1
            },
        },
        Err(message) => {
            let _ = writeln!(err, "Error: {message}");
            1
        },
    }
}
