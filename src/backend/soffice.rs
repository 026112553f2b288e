//! Control channel backed by the suite's own `soffice` executable.
//!
//! "Connecting" means finding an `soffice` that answers `--version`: first an
//! explicit path, then the program directory named by `UNO_PATH`, then every
//! `PATH` entry. Those are exactly the variables the environment resolver
//! sets, so a failed direct attempt followed by a successful resolution makes
//! the retry succeed.
//!
//! Each export runs the suite headless with `--convert-to pdf:<filter>` into
//! a scratch directory, then moves the result to the destination. The
//! channel owns a private user profile directory for its lifetime so it never
//! contends for the lock on the interactive user's profile.

use super::{Connector, ControlChannel, LoadProperties, OfficeDocument, StoreProperties};
use crate::error::ChannelError;
use crate::job::{file_url_to_path, path_to_file_url};
use office_locator::SOFFICE_EXE;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};

/// Environment variable naming the suite's program directory.
const UNO_PATH_VAR: &str = "UNO_PATH";

/// [`Connector`] that finds and checks an `soffice` executable.
#[derive(Debug, Clone, Default)]
pub struct SofficeConnector {
    explicit: Option<PathBuf>,
}

impl SofficeConnector {
    /// `explicit` bypasses the `UNO_PATH` / `PATH` search when set.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// Executable the next [`Connector::connect`] would use.
    pub fn locate(&self) -> Option<PathBuf> {
        locate_soffice(
            self.explicit.as_deref(),
            std::env::var_os(UNO_PATH_VAR),
            std::env::var_os("PATH"),
        )
    }
}

impl Connector for SofficeConnector {
    fn connect(&self) -> Result<Arc<dyn ControlChannel>, ChannelError> {
        let binary = self.locate().ok_or_else(|| {
            ChannelError::Failed(format!("{SOFFICE_EXE} not found via {UNO_PATH_VAR} or PATH"))
        })?;
        debug!("Checking {}", binary.display());

        let output = Command::new(&binary)
            .args(["--headless", "--version"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ChannelError::Failed(format!("{}: {e}", binary.display())))?;
        if !output.status.success() {
            return Err(ChannelError::Failed(format!(
                "{} --version exited with {}: {}",
                binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let version = if version.is_empty() {
            SOFFICE_EXE.to_string()
        } else {
            version
        };

        let profile = tempfile::Builder::new()
            .prefix("office2pdf-profile-")
            .tempdir()
            .map_err(|e| ChannelError::Failed(format!("profile dir: {e}")))?;

        info!("Connected to {} ({})", version, binary.display());
        Ok(Arc::new(SofficeChannel {
            binary,
            version,
            profile,
        }))
    }
}

/// Explicit path, else `<UNO_PATH>/soffice`, else the first `PATH` hit.
pub fn locate_soffice(
    explicit: Option<&Path>,
    uno_path: Option<OsString>,
    search_path: Option<OsString>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }
    if let Some(dir) = uno_path {
        let candidate = PathBuf::from(dir).join(SOFFICE_EXE);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    search_path.and_then(|p| {
        std::env::split_paths(&p)
            .map(|dir| dir.join(SOFFICE_EXE))
            .find(|candidate| candidate.is_file())
    })
}

/// A verified `soffice` executable plus a private user profile.
pub struct SofficeChannel {
    binary: PathBuf,
    version: String,
    profile: TempDir,
}

impl SofficeChannel {
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl ControlChannel for SofficeChannel {
    fn load_component_from_url(
        &self,
        url: &str,
        props: &LoadProperties,
    ) -> Result<Box<dyn OfficeDocument>, ChannelError> {
        if !self.is_alive() {
            return Err(ChannelError::StaleHandle(format!(
                "{} is gone",
                self.binary.display()
            )));
        }
        let source = file_url_to_path(url)
            .ok_or_else(|| ChannelError::Failed(format!("unsupported URL '{url}'")))?;
        if !source.is_file() {
            return Err(ChannelError::Failed(format!(
                "cannot load '{}'",
                source.display()
            )));
        }
        debug!("Loaded {}", source.display());
        Ok(Box::new(SofficeDocument {
            binary: self.binary.clone(),
            profile_url: path_to_file_url(self.profile.path()),
            source,
            hidden: props.hidden,
        }))
    }

    fn is_alive(&self) -> bool {
        self.binary.is_file() && self.profile.path().is_dir()
    }

    fn name(&self) -> &str {
        &self.version
    }
}

struct SofficeDocument {
    binary: PathBuf,
    profile_url: String,
    source: PathBuf,
    hidden: bool,
}

impl SofficeDocument {
    fn run_export(&self, filter: &str, outdir: &Path) -> Result<Output, ChannelError> {
        let mut cmd = Command::new(&self.binary);
        if self.hidden {
            cmd.arg("--headless");
        }
        cmd.args(["--norestore", "--nologo", "--nodefault"])
            .arg(format!("-env:UserInstallation={}", self.profile_url))
            .arg("--convert-to")
            .arg(format!("pdf:{filter}"))
            .arg("--outdir")
            .arg(outdir)
            .arg(&self.source)
            .stdin(Stdio::null());

        cmd.output().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ChannelError::StaleHandle(format!("{}: {e}", self.binary.display()))
            }
            _ => ChannelError::Failed(format!("{}: {e}", self.binary.display())),
        })
    }
}

impl OfficeDocument for SofficeDocument {
    fn store_to_url(&mut self, url: &str, props: &StoreProperties) -> Result<(), ChannelError> {
        let destination = file_url_to_path(url)
            .ok_or_else(|| ChannelError::Failed(format!("unsupported URL '{url}'")))?;
        let outdir = tempfile::Builder::new()
            .prefix("office2pdf-out-")
            .tempdir()
            .map_err(|e| ChannelError::Failed(format!("scratch dir: {e}")))?;

        let output = self.run_export(&props.filter_name, outdir.path())?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ChannelError::Failed(format!(
                "export exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stem = self
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let produced = outdir.path().join(format!("{stem}.pdf"));
        if !produced.is_file() {
            return Err(ChannelError::Failed(format!(
                "{} produced no PDF: {}",
                props.filter_name,
                stderr.trim()
            )));
        }

        move_file(&produced, &destination)
            .map_err(|e| ChannelError::Failed(format!("{}: {e}", destination.display())))?;
        debug!("Stored {} via {}", destination.display(), props.filter_name);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), ChannelError> {
        debug!("Closed {}", self.source.display());
        Ok(())
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)
}
