//! Export profile selection.
//!
//! The suite needs to be told which exporter to run: the spreadsheet
//! application's PDF filter behaves differently from the word processor's
//! (sheet ranges, print areas), and asking the wrong one fails the export.
//! The choice is made purely from the source file extension.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Extensions opened by the spreadsheet application.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &[
    "xls", "xlsx", "xlsm", "xlsb", "xlt", "xltx", "ods", "ots", "fods", "csv",
];

/// Exporter used to write the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportProfile {
    /// Spreadsheets.
    Calc,
    /// Everything else (default, also for unknown or missing extensions).
    #[default]
    Writer,
}

impl ExportProfile {
    /// Backend filter identifier.
    pub fn filter_name(self) -> &'static str {
        match self {
            ExportProfile::Calc => "calc_pdf_Export",
            ExportProfile::Writer => "writer_pdf_Export",
        }
    }

    /// Case-insensitive; a leading dot is ignored.
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim().trim_start_matches('.');
        if SPREADSHEET_EXTENSIONS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(ext))
        {
            ExportProfile::Calc
        } else {
            ExportProfile::Writer
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .map(|e| Self::from_extension(&e.to_string_lossy()))
            .unwrap_or_default()
    }
}

impl fmt::Display for ExportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter_name())
    }
}
