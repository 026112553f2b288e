//! Configuration for the conversion executor.
//!
//! All knobs live in [`ConverterConfig`], built via
//! [`ConverterConfigBuilder`]. The defaults reproduce the classic
//! behaviour: a one-minute connection deadline and OpenOffice.org before
//! LibreOffice.

use crate::error::ConvertError;
use office_locator::BackendVariant;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-attempt connection deadline.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for an [`crate::OfficeConverter`].
///
/// # Example
/// ```rust
/// use office2pdf::{BackendVariant, ConverterConfig};
/// use std::time::Duration;
///
/// let config = ConverterConfig::builder()
///     .connect_timeout(Duration::from_secs(20))
///     .variants([BackendVariant::LibreOffice])
///     .build()
///     .unwrap();
/// assert_eq!(config.variants, vec![BackendVariant::LibreOffice]);
/// ```
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Deadline for a single connection attempt. Default: 60 s.
    ///
    /// This is the only timeout in the system. A bootstrap makes at most
    /// `1 + variants.len()` attempts, so it gives up after roughly that many
    /// deadlines. An attempt that overruns is abandoned, not cancelled.
    pub connect_timeout: Duration,

    /// Installation flavours to fall back to, in order, when a direct
    /// connection fails. Default: OpenOffice.org, then LibreOffice.
    pub variants: Vec<BackendVariant>,

    /// Directory for the byte-array entry point's scratch files.
    /// If None, uses `std::env::temp_dir()`.
    pub temp_dir: Option<PathBuf>,

    /// Explicit path to the suite's `soffice` executable. Skips the
    /// `UNO_PATH` / `PATH` search when set.
    pub soffice_path: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            variants: BackendVariant::DEFAULT_ORDER.to_vec(),
            temp_dir: None,
            soffice_path: None,
        }
    }
}

impl ConverterConfig {
    /// Create a new builder for `ConverterConfig`.
    pub fn builder() -> ConverterConfigBuilder {
        ConverterConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scratch directory actually used.
    pub fn scratch_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for [`ConverterConfig`].
#[derive(Debug)]
pub struct ConverterConfigBuilder {
    config: ConverterConfig,
}

impl ConverterConfigBuilder {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout = Duration::from_secs(secs);
        self
    }

    /// Replace the fallback order. Duplicates are dropped, first one wins.
    pub fn variants(mut self, variants: impl IntoIterator<Item = BackendVariant>) -> Self {
        let mut ordered: Vec<BackendVariant> = Vec::new();
        for v in variants {
            if !ordered.contains(&v) {
                ordered.push(v);
            }
        }
        self.config.variants = ordered;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.soffice_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConverterConfig, ConvertError> {
        let c = &self.config;
        if c.connect_timeout.is_zero() {
            return Err(ConvertError::InvalidConfig(
                "Connect timeout must be greater than zero".into(),
            ));
        }
        if let Some(ref dir) = c.temp_dir {
            if !dir.is_dir() {
                return Err(ConvertError::InvalidConfig(format!(
                    "Temp dir '{}' is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_behaviour() {
        let c = ConverterConfig::default();
        assert_eq!(c.connect_timeout, Duration::from_secs(60));
        assert_eq!(
            c.variants,
            vec![BackendVariant::OpenOffice, BackendVariant::LibreOffice]
        );
        assert_eq!(c.scratch_dir(), std::env::temp_dir());
    }

    #[test]
    fn variants_are_deduplicated_in_order() {
        let c = ConverterConfig::builder()
            .variants([
                BackendVariant::LibreOffice,
                BackendVariant::OpenOffice,
                BackendVariant::LibreOffice,
            ])
            .build()
            .unwrap();
        assert_eq!(
            c.variants,
            vec![BackendVariant::LibreOffice, BackendVariant::OpenOffice]
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ConverterConfig::builder()
            .connect_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn missing_temp_dir_is_rejected() {
        let err = ConverterConfig::builder()
            .temp_dir("/definitely/not/a/real/dir")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn empty_variant_list_means_direct_only() {
        let c = ConverterConfig::builder()
            .variants(std::iter::empty())
            .build()
            .unwrap();
        assert!(c.variants.is_empty());
    }
}
