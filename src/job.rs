//! One conversion request and the `file://` URLs handed to the backend.

use crate::error::ConvertError;
use crate::profile::ExportProfile;
use std::path::{Path, PathBuf};

/// An ephemeral conversion request. Built per call, never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Absolute path of the source document.
    pub source: PathBuf,
    /// Absolute path the PDF is written to.
    pub destination: PathBuf,
    /// Lowercased source extension without the dot (may be empty).
    pub extension: String,
}

impl ConversionJob {
    /// Validate the source and normalise both paths.
    ///
    /// The source must be an existing file; anything else is reported as
    /// [`ConvertError::FileNotFound`] before the backend is involved.
    pub fn new(source: &Path, destination: &Path) -> Result<Self, ConvertError> {
        if !source.is_file() {
            return Err(ConvertError::FileNotFound {
                path: source.to_path_buf(),
            });
        }
        let abs_source = std::path::absolute(source).map_err(|_| ConvertError::FileNotFound {
            path: source.to_path_buf(),
        })?;
        let abs_destination = std::path::absolute(destination).map_err(|e| {
            ConvertError::Internal(format!(
                "Cannot resolve destination '{}': {e}",
                destination.display()
            ))
        })?;
        let extension = abs_source
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        Ok(Self {
            source: abs_source,
            destination: abs_destination,
            extension,
        })
    }

    pub fn profile(&self) -> ExportProfile {
        ExportProfile::from_extension(&self.extension)
    }

    pub fn source_url(&self) -> String {
        path_to_file_url(&self.source)
    }

    pub fn destination_url(&self) -> String {
        path_to_file_url(&self.destination)
    }
}

/// `file://` URL for an absolute path. Backslashes become slashes; `%`,
/// space, `#` and `?` are percent-encoded.
pub fn path_to_file_url(path: &Path) -> String {
    let normalised = path.to_string_lossy().replace('\\', "/");
    let mut url = String::with_capacity(normalised.len() + 8);
    url.push_str("file://");
    // Drive-letter paths (`C:/...`) need the third slash added.
    if !normalised.starts_with('/') {
        url.push('/');
    }
    for ch in normalised.chars() {
        match ch {
            '%' => url.push_str("%25"),
            ' ' => url.push_str("%20"),
            '#' => url.push_str("%23"),
            '?' => url.push_str("%3F"),
            c => url.push(c),
        }
    }
    url
}

/// Inverse of [`path_to_file_url`]. Returns `None` for non-`file` URLs.
pub fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("file://")?;
    let bytes = rest.as_bytes();
    // `/C:/dir` -> `C:/dir`
    let is_drive = bytes.len() >= 3
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b':';
    let rest = if is_drive { &rest[1..] } else { rest };

    let mut decoded = Vec::with_capacity(rest.len());
    let raw = rest.as_bytes();
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' && i + 2 < raw.len() {
            let hex = std::str::from_utf8(&raw[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(raw[i]);
        i += 1;
    }
    Some(PathBuf::from(String::from_utf8_lossy(&decoded).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_path_to_url() {
        assert_eq!(
            path_to_file_url(Path::new("/tmp/My Report#1.docx")),
            "file:///tmp/My%20Report%231.docx"
        );
    }

    #[test]
    fn drive_path_to_url() {
        assert_eq!(
            path_to_file_url(Path::new(r"C:\Documents\Book 1.xlsx")),
            "file:///C:/Documents/Book%201.xlsx"
        );
    }

    #[test]
    fn url_back_to_path() {
        assert_eq!(
            file_url_to_path("file:///tmp/My%20Report%231.docx"),
            Some(PathBuf::from("/tmp/My Report#1.docx"))
        );
        assert_eq!(
            file_url_to_path("file:///C:/Documents/100%25.xlsx"),
            Some(PathBuf::from("C:/Documents/100%.xlsx"))
        );
        assert_eq!(file_url_to_path("https://example.com/a.docx"), None);
    }

    #[test]
    fn trailing_percent_is_kept_literally() {
        assert_eq!(file_url_to_path("file:///tmp/a%"), Some(PathBuf::from("/tmp/a%")));
        assert_eq!(file_url_to_path("file:///tmp/a%2"), Some(PathBuf::from("/tmp/a%2")));
    }

    #[test]
    fn missing_source_is_file_not_found() {
        let err = ConversionJob::new(
            Path::new("/definitely/not/a/real/file.xlsx"),
            Path::new("/tmp/out.pdf"),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn directory_source_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConversionJob::new(dir.path(), Path::new("out.pdf")).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn job_normalises_paths_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Budget.XLSX");
        std::fs::write(&src, b"x").unwrap();

        let job = ConversionJob::new(&src, Path::new("relative/out.pdf")).unwrap();
        assert_eq!(job.extension, "xlsx");
        assert_eq!(job.profile(), ExportProfile::Calc);
        assert!(job.destination.is_absolute());
        assert!(job.source_url().starts_with("file://"));
        assert!(job.source_url().ends_with("/Budget.XLSX"));
    }
}
