//! # office-locator
//!
//! Find an installed OpenOffice.org or LibreOffice suite and prepare the
//! process environment so a connection attempt can reach it.
//!
//! ## How it works
//!
//! For one [`BackendVariant`] at a time, [`Locator::resolve`]:
//!
//! 1. Picks the registry root for the process bit-width
//!    ([`RegistryRoot::for_process`]).
//! 2. Reads `UREINSTALLLOCATION` from the variant's URE layer key, per-user
//!    scope first, then machine-wide.
//! 3. If that fails and the process started on the native (32-bit style)
//!    root, retries once under `Wow6432Node`.
//! 4. Derives the binary directory from the URE location and reads the UNO
//!    install path from the default value of `UNO\InstallPath`.
//!
//! [`EnvironmentResolver::prepare`] then appends the binary directory to
//! `PATH` and points `UNO_PATH` at the install path. That mutation is
//! process-global and not deduplicated.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use office_locator::{BackendVariant, EnvironmentResolver, Locator};
//!
//! let locator = Locator::new();
//! for variant in BackendVariant::DEFAULT_ORDER {
//!     match locator.prepare(variant) {
//!         Ok(info) => println!("{variant}: {}", info.install_path.display()),
//!         Err(e) => println!("{variant}: {e}"),
//!     }
//! }
//! ```
//!
//! ## Platform support
//!
//! | OS          | Source of install metadata                  | Binary subdir |
//! |-------------|---------------------------------------------|---------------|
//! | Windows     | registry (`HKCU`, then `HKLM`)              | `bin`         |
//! | Linux / BSD | searched directories (`/usr/lib`, `/opt`, …) | `program`     |
//! | macOS       | searched app bundles (`/Applications`, `~`) | `MacOS`       |

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod layout;
pub mod registry;
pub mod variant;

pub use layout::discover_layouts;
pub use registry::{
    platform_registry, InstallRegistry, MemoryRegistry, RegistryRoot, RegistryScope,
};
pub use variant::{BackendVariant, URE_INSTALL_VALUE};

#[cfg(windows)]
pub use registry::WindowsRegistry;

// ── Platform constants ───────────────────────────────────────────────────────

/// Directory below the URE install location holding the suite's binaries.
#[cfg(windows)]
pub const BINARY_SUBDIR: &str = "bin";
#[cfg(target_os = "macos")]
pub const BINARY_SUBDIR: &str = "MacOS";
#[cfg(not(any(windows, target_os = "macos")))]
pub const BINARY_SUBDIR: &str = "program";

/// File name of the suite's main executable.
#[cfg(windows)]
pub const SOFFICE_EXE: &str = "soffice.exe";
#[cfg(not(windows))]
pub const SOFFICE_EXE: &str = "soffice";

/// Process search-path variable extended on successful resolution.
pub const SEARCH_PATH_VAR: &str = "PATH";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by locator operations.
///
/// `NotFound` is the expected outcome when a variant simply is not installed;
/// callers move on to the next variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No install metadata for this variant in any scope or root.
    #[error("{variant} is not installed (no value at '{key}')")]
    NotFound { variant: BackendVariant, key: String },

    /// The resolved directory could not be added to the search path.
    #[error("Cannot extend PATH: {0}")]
    Environment(String),
}

// ── Resolved installation ────────────────────────────────────────────────────

/// Where a variant lives on this machine. Produced by [`Locator::resolve`]
/// and consumed once to adjust the process environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationInfo {
    pub variant: BackendVariant,
    /// Root the URE key was found under (differs from the process root when
    /// the compatibility fallback kicked in).
    pub root: RegistryRoot,
    /// Directory appended to `PATH`.
    pub binary_dir: PathBuf,
    /// Value assigned to the variant's locator variable.
    pub install_path: PathBuf,
}

impl InstallationInfo {
    /// Append `binary_dir` to `PATH` and set the locator variable.
    pub fn apply_to_process_env(&self) -> Result<(), LocatorError> {
        let path = extended_search_path(std::env::var_os(SEARCH_PATH_VAR), &self.binary_dir)?;
        std::env::set_var(SEARCH_PATH_VAR, &path);
        std::env::set_var(self.variant.locator_var(), &self.install_path);
        info!(
            "Prepared environment for {}: {}={}, {} += {}",
            self.variant,
            self.variant.locator_var(),
            self.install_path.display(),
            SEARCH_PATH_VAR,
            self.binary_dir.display()
        );
        Ok(())
    }
}

/// `current` with `dir` appended, joined with the platform separator.
pub fn extended_search_path(
    current: Option<OsString>,
    dir: &Path,
) -> Result<OsString, LocatorError> {
    let mut entries: Vec<PathBuf> = current
        .as_deref()
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();
    entries.push(dir.to_path_buf());
    std::env::join_paths(entries).map_err(|e| LocatorError::Environment(e.to_string()))
}

// ── Resolver seam ────────────────────────────────────────────────────────────

/// Makes a backend variant reachable, or reports that it is not installed.
///
/// Implemented by [`Locator`]; tests substitute fakes.
pub trait EnvironmentResolver: Send + Sync {
    fn prepare(&self, variant: BackendVariant) -> Result<InstallationInfo, LocatorError>;
}

/// Registry-backed [`EnvironmentResolver`].
pub struct Locator {
    registry: Box<dyn InstallRegistry>,
    root: RegistryRoot,
}

impl Locator {
    /// Platform registry, root chosen from the process bit-width.
    pub fn new() -> Self {
        Self::with_registry(platform_registry(), RegistryRoot::for_process())
    }

    pub fn with_registry(registry: Box<dyn InstallRegistry>, root: RegistryRoot) -> Self {
        Self { registry, root }
    }

    /// Root the search starts from.
    pub fn root(&self) -> RegistryRoot {
        self.root
    }

    /// Look the variant up without touching the environment.
    ///
    /// The UNO install path is read under the root where the URE key was
    /// found, so after a Native → Wow6432 fallback both values come from the
    /// redirected node rather than from the starting root.
    pub fn resolve(&self, variant: BackendVariant) -> Result<InstallationInfo, LocatorError> {
        let (root, ure_location) = match self.read_ure_location(self.root, variant) {
            Ok(found) => (self.root, found),
            // A native-root process may still find a 32-bit suite under the
            // redirected node.
            Err(_) if self.root == RegistryRoot::Native => {
                debug!("{variant}: retrying under {}", RegistryRoot::Wow6432.prefix());
                let found = self.read_ure_location(RegistryRoot::Wow6432, variant)?;
                (RegistryRoot::Wow6432, found)
            }
            Err(e) => return Err(e),
        };

        let binary_dir = PathBuf::from(ure_location).join(BINARY_SUBDIR);

        let uno_key = root.key(variant, variant.uno_install_key());
        let install_path = self
            .read_scoped(&uno_key, None)
            .ok_or_else(|| LocatorError::NotFound {
                variant,
                key: uno_key.clone(),
            })?;

        Ok(InstallationInfo {
            variant,
            root,
            binary_dir,
            install_path: PathBuf::from(install_path),
        })
    }

    fn read_ure_location(
        &self,
        root: RegistryRoot,
        variant: BackendVariant,
    ) -> Result<String, LocatorError> {
        let key = root.key(variant, variant.ure_layer_key());
        self.read_scoped(&key, Some(URE_INSTALL_VALUE))
            .ok_or(LocatorError::NotFound { variant, key })
    }

    /// Per-user value first, then machine-wide.
    fn read_scoped(&self, key: &str, value: Option<&str>) -> Option<String> {
        RegistryScope::SEARCH_ORDER.iter().find_map(|&scope| {
            let found = self.registry.read_string(scope, key, value)?;
            debug!("{key} [{scope:?}] = {found}");
            Some(found)
        })
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentResolver for Locator {
    fn prepare(&self, variant: BackendVariant) -> Result<InstallationInfo, LocatorError> {
        let info = self.resolve(variant)?;
        info.apply_to_process_env()?;
        Ok(info)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
