//! Known office-suite installation flavours.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value name holding the URE install directory under the layer key.
pub const URE_INSTALL_VALUE: &str = "UREINSTALLLOCATION";

/// An installation flavour of the office suite, each with its own registry
/// namespace and locator variable.
///
/// The order in [`BackendVariant::DEFAULT_ORDER`] is the order in which the
/// bootstrapper falls back from one flavour to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendVariant {
    /// OpenOffice.org 3.x / Apache OpenOffice.
    OpenOffice,
    /// LibreOffice.
    LibreOffice,
}

impl BackendVariant {
    /// Variant A, then variant B.
    pub const DEFAULT_ORDER: [BackendVariant; 2] =
        [BackendVariant::OpenOffice, BackendVariant::LibreOffice];

    /// Short lowercase identifier, also accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            BackendVariant::OpenOffice => "openoffice",
            BackendVariant::LibreOffice => "libreoffice",
        }
    }

    /// Vendor segment below `SOFTWARE\`.
    pub fn vendor_key(self) -> &'static str {
        match self {
            BackendVariant::OpenOffice => "OpenOffice.org",
            BackendVariant::LibreOffice => "LibreOffice",
        }
    }

    /// Key (relative to the vendor segment) holding [`URE_INSTALL_VALUE`].
    ///
    /// LibreOffice installers write `Layers_` rather than `Layers`.
    pub fn ure_layer_key(self) -> &'static str {
        match self {
            BackendVariant::OpenOffice => r"Layers\URE\1",
            BackendVariant::LibreOffice => r"Layers_\URE\1",
        }
    }

    /// Key (relative to the vendor segment) whose default value is the UNO
    /// install path.
    pub fn uno_install_key(self) -> &'static str {
        r"UNO\InstallPath"
    }

    /// Environment variable the suite's bootstrap code reads to find its
    /// program directory.
    pub fn locator_var(self) -> &'static str {
        "UNO_PATH"
    }
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openoffice" | "openoffice.org" | "ooo" => Ok(BackendVariant::OpenOffice),
            "libreoffice" | "lo" => Ok(BackendVariant::LibreOffice),
            other => Err(format!(
                "unknown office backend '{other}' (expected openoffice or libreoffice)"
            )),
        }
    }
}
