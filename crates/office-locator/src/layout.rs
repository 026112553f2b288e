//! Install-layout probing for platforms without a registry.
//!
//! Package managers and the vendor installers put the suite in a handful of
//! well-known places. Each hit is recorded in a [`MemoryRegistry`] under the
//! same keys (and under both roots) the Windows installer would write, so the
//! resolver does not need to know which platform it runs on.

use crate::registry::{MemoryRegistry, RegistryRoot, RegistryScope};
use crate::variant::{BackendVariant, URE_INSTALL_VALUE};
use crate::{BINARY_SUBDIR, SOFFICE_EXE};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Search the default install locations of every variant.
pub fn discover_layouts() -> MemoryRegistry {
    discover_layouts_in(&candidate_dirs)
}

/// Search the directories produced by `candidates`; the first directory that
/// holds an executable suite wins per (variant, scope).
pub fn discover_layouts_in(
    candidates: &dyn Fn(BackendVariant, RegistryScope) -> Vec<PathBuf>,
) -> MemoryRegistry {
    let mut registry = MemoryRegistry::new();
    for variant in BackendVariant::DEFAULT_ORDER {
        for scope in RegistryScope::SEARCH_ORDER {
            if let Some(install_dir) = candidates(variant, scope)
                .into_iter()
                .find(|d| is_install_dir(d))
            {
                debug!(
                    "Found {} install ({:?}) at {}",
                    variant,
                    scope,
                    install_dir.display()
                );
                record_install(&mut registry, variant, scope, &install_dir);
            }
        }
    }
    registry
}

/// `true` if `dir` contains the suite's program directory with an
/// executable in it.
pub fn is_install_dir(dir: &Path) -> bool {
    dir.join(BINARY_SUBDIR).join(SOFFICE_EXE).is_file()
}

/// Write the URE location and UNO install path for `install_dir`.
pub fn record_install(
    registry: &mut MemoryRegistry,
    variant: BackendVariant,
    scope: RegistryScope,
    install_dir: &Path,
) {
    let program_dir = install_dir.join(BINARY_SUBDIR);
    for root in [RegistryRoot::Native, RegistryRoot::Wow6432] {
        registry.insert(
            scope,
            &root.key(variant, variant.ure_layer_key()),
            Some(URE_INSTALL_VALUE),
            install_dir.to_string_lossy(),
        );
        registry.insert(
            scope,
            &root.key(variant, variant.uno_install_key()),
            None,
            program_dir.to_string_lossy(),
        );
    }
}

/// Default candidate install directories, most specific first.
pub fn candidate_dirs(variant: BackendVariant, scope: RegistryScope) -> Vec<PathBuf> {
    match scope {
        RegistryScope::CurrentUser => user_candidates(variant),
        RegistryScope::LocalMachine => machine_candidates(variant),
    }
}

#[cfg(target_os = "macos")]
fn user_candidates(variant: BackendVariant) -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    vec![home.join("Applications").join(app_bundle(variant)).join("Contents")]
}

#[cfg(target_os = "macos")]
fn machine_candidates(variant: BackendVariant) -> Vec<PathBuf> {
    vec![PathBuf::from("/Applications")
        .join(app_bundle(variant))
        .join("Contents")]
}

#[cfg(target_os = "macos")]
fn app_bundle(variant: BackendVariant) -> &'static str {
    match variant {
        BackendVariant::OpenOffice => "OpenOffice.app",
        BackendVariant::LibreOffice => "LibreOffice.app",
    }
}

#[cfg(not(target_os = "macos"))]
fn user_candidates(variant: BackendVariant) -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    let opt = home.join(".local").join("opt");
    match variant {
        BackendVariant::OpenOffice => expand_prefixed(&opt, "openoffice"),
        BackendVariant::LibreOffice => expand_prefixed(&opt, "libreoffice"),
    }
}

#[cfg(not(target_os = "macos"))]
fn machine_candidates(variant: BackendVariant) -> Vec<PathBuf> {
    let opt = Path::new("/opt");
    match variant {
        BackendVariant::OpenOffice => {
            let mut dirs = expand_prefixed(opt, "openoffice");
            dirs.push(PathBuf::from("/usr/lib/openoffice"));
            dirs
        }
        BackendVariant::LibreOffice => {
            let mut dirs = vec![
                PathBuf::from("/usr/lib/libreoffice"),
                PathBuf::from("/usr/lib64/libreoffice"),
                PathBuf::from("/usr/local/lib/libreoffice"),
            ];
            dirs.extend(expand_prefixed(opt, "libreoffice"));
            dirs.push(PathBuf::from("/snap/libreoffice/current/lib/libreoffice"));
            dirs
        }
    }
}

/// Children of `parent` whose name starts with `prefix`, in reverse
/// lexicographic order. Vendor tarballs install into versioned directories
/// such as `/opt/libreoffice24.8`.
#[cfg_attr(target_os = "macos", allow(dead_code))]
fn expand_prefixed(parent: &Path, prefix: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(parent) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .to_ascii_lowercase()
                .starts_with(prefix)
        })
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs.reverse();
    dirs
}
