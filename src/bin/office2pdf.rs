//! CLI binary for office2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConverterConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use office2pdf::{BackendVariant, ConversionReport, ConverterConfig, OfficeConverter};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: office2pdf <FROM_FILE> <TO_FILE>";

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Spreadsheet (exported with calc_pdf_Export)
  office2pdf Budget.xlsx Budget.pdf

  # Anything else goes through writer_pdf_Export
  office2pdf Letter.docx Letter.pdf

  # Only try LibreOffice after the direct connection, 20 s per attempt
  office2pdf --backend libreoffice --connect-timeout 20 a.odt a.pdf

  # Is an office suite reachable at all?
  office2pdf --check

  # Machine-readable report
  office2pdf --json Report.doc Report.pdf

DISCOVERY ORDER:
  1. direct        soffice via --soffice, UNO_PATH or PATH as they are
  2. openoffice    OpenOffice.org registry keys (Layers\URE\1)
  3. libreoffice   LibreOffice registry keys (Layers_\URE\1)
  Each resolved variant appends its program directory to PATH and sets
  UNO_PATH before connecting. Off Windows the registry is emulated from
  well-known install directories.

ENVIRONMENT VARIABLES:
  OFFICE2PDF_CONNECT_TIMEOUT  Seconds per connection attempt (default 60)
  OFFICE2PDF_BACKEND          Fallback variants, comma separated
  OFFICE2PDF_SOFFICE          Explicit soffice executable
  RUST_LOG                    Overrides --verbose / --quiet log filtering
"#;

/// Convert office documents to PDF through OpenOffice.org or LibreOffice.
#[derive(Parser, Debug)]
#[command(
    name = "office2pdf",
    version,
    about = "Convert office documents to PDF through OpenOffice.org or LibreOffice",
    override_usage = "office2pdf [OPTIONS] <FROM_FILE> <TO_FILE>",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// <FROM_FILE> <TO_FILE>
    #[arg(value_name = "FILE", num_args = 0..)]
    files: Vec<PathBuf>,

    /// Seconds to wait for each connection attempt.
    #[arg(long, env = "OFFICE2PDF_CONNECT_TIMEOUT", default_value_t = 60,
          value_parser = clap::value_parser!(u64).range(1..))]
    connect_timeout: u64,

    /// Fallback variants in order: openoffice, libreoffice.
    #[arg(long, env = "OFFICE2PDF_BACKEND", value_delimiter = ',')]
    backend: Vec<BackendVariant>,

    /// Path to the soffice executable (skips the UNO_PATH / PATH search).
    #[arg(long, env = "OFFICE2PDF_SOFFICE")]
    soffice: Option<PathBuf>,

    /// Print the conversion report as JSON.
    #[arg(long, env = "OFFICE2PDF_JSON")]
    json: bool,

    /// Connect to the backend and exit without converting.
    #[arg(long)]
    check: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OFFICE2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OFFICE2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    let converter = OfficeConverter::new(config);

    // ── Check mode ───────────────────────────────────────────────────────
    if cli.check {
        let spinner = spinner(!cli.quiet && !cli.json, "Connecting to office backend…");
        let result = converter.connect().await;
        spinner.finish_and_clear();
        let name = result.context("No office backend reachable")?;
        if cli.json {
            println!("{}", serde_json::json!({ "backend": name }));
        } else if !cli.quiet {
            eprintln!("{} {}", green("✔"), bold(&name));
        }
        return Ok(());
    }

    let (from, to) = match cli.files.as_slice() {
        [from, to] => (from, to),
        _ => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    // ── Run conversion ───────────────────────────────────────────────────
    let spinner = spinner(
        !cli.quiet && !cli.json,
        &format!("Converting {}…", from.display()),
    );
    let result = converter.convert(from, to).await;
    spinner.finish_and_clear();
    let report = result.context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&report);
    }

    Ok(())
}

/// Map CLI args to `ConverterConfig`.
fn build_config(cli: &Cli) -> Result<ConverterConfig> {
    let mut builder = ConverterConfig::builder().connect_timeout_secs(cli.connect_timeout);
    if !cli.backend.is_empty() {
        builder = builder.variants(cli.backend.iter().copied());
    }
    if let Some(ref path) = cli.soffice {
        builder = builder.soffice_path(path);
    }
    builder.build().context("Invalid configuration")
}

/// Stderr spinner, hidden when `visible` is false.
fn spinner(visible: bool, message: &str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_summary(report: &ConversionReport) {
    eprintln!(
        "{}  {}  →  {}",
        green("✔"),
        report.source.display(),
        bold(&report.destination.display().to_string()),
    );
    eprintln!(
        "   {}  {} bytes  {}ms{}",
        dim(&report.filter),
        report.output_bytes,
        report.duration_ms,
        if report.session_rebuilt {
            dim("  (session rebuilt)")
        } else {
            String::new()
        },
    );
}
