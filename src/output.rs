//! Output types returned by the conversion entry points.

use crate::profile::ExportProfile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of one successful file-to-file conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Absolute source path.
    pub source: PathBuf,
    /// Absolute path of the written PDF.
    pub destination: PathBuf,
    pub profile: ExportProfile,
    /// Backend filter that produced the PDF.
    pub filter: String,
    /// Size of the PDF on disk.
    pub output_bytes: u64,
    /// Wall time including waiting on the gate and any bootstrap.
    pub duration_ms: u64,
    /// A stale channel was discarded and rebuilt during this call.
    pub session_rebuilt: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serialises_profile_lowercase() {
        let report = ConversionReport {
            source: PathBuf::from("/in/a.xlsx"),
            destination: PathBuf::from("/out/a.pdf"),
            profile: ExportProfile::Calc,
            filter: ExportProfile::Calc.filter_name().to_string(),
            output_bytes: 1024,
            duration_ms: 15,
            session_rebuilt: false,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["profile"], "calc");
        assert_eq!(json["filter"], "calc_pdf_Export");
        assert_eq!(json["output_bytes"], 1024);
    }
}
