//! # office2pdf
//!
//! Convert office documents (spreadsheets, word-processing documents, …) to
//! PDF by driving an installed OpenOffice.org or LibreOffice suite.
//!
//! ## Why this crate?
//!
//! Rendering is the suite's job. What this crate gets right is everything
//! around it: finding an installation across registry layouts and bit-width
//! quirks, connecting with a hard deadline, sharing one control channel
//! between any number of concurrent callers, and recovering when the suite
//! is restarted underneath a running process.
//!
//! ## Lifecycle Overview
//!
//! ```text
//! convert(src, dst)
//!  │
//!  ├─ 1. Job       source must exist; profile from extension
//!  ├─ 2. Gate      one conversion at a time, process-wide
//!  ├─ 3. Session   lazy bootstrap: direct → OpenOffice.org → LibreOffice
//!  │               (60 s per attempt, PATH/UNO_PATH prepared per variant)
//!  ├─ 4. Open      hidden load; stale handle → rebuild + retry once
//!  ├─ 5. Export    calc_pdf_Export or writer_pdf_Export
//!  └─ 6. Close     always, before the gate is released
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = office2pdf::convert("Budget.xlsx", "Budget.pdf").await?;
//!     eprintln!("{} bytes via {}", report.output_bytes, report.filter);
//!
//!     let bytes = std::fs::read("Letter.docx")?;
//!     let pdf = office2pdf::convert_bytes(&bytes, "docx").await?;
//!     std::fs::write("Letter.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `office2pdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! office2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod convert;
pub mod error;
pub mod job;
pub mod output;
pub mod profile;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ConverterConfigBuilder, DEFAULT_CONNECT_TIMEOUT};
pub use convert::{convert, convert_bytes, convert_sync, global, OfficeConverter};
pub use error::{ChannelError, ConvertError, Stage};
pub use job::ConversionJob;
pub use output::ConversionReport;
pub use profile::ExportProfile;

pub use office_locator::{
    BackendVariant, EnvironmentResolver, InstallationInfo, Locator, LocatorError, RegistryRoot,
};
