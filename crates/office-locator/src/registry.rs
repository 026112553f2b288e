//! Read-only access to installation metadata.
//!
//! On Windows the installers record their locations in the registry and
//! [`WindowsRegistry`] reads them directly. Elsewhere there is no registry,
//! so [`crate::layout::discover_layouts`] searches the usual install
//! directories and fills a [`MemoryRegistry`] with the keys an installer
//! would have written. The resolver runs the same algorithm either way.

use crate::variant::BackendVariant;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a key is looked up. Searched in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryScope {
    CurrentUser,
    LocalMachine,
}

impl RegistryScope {
    pub const SEARCH_ORDER: [RegistryScope; 2] =
        [RegistryScope::CurrentUser, RegistryScope::LocalMachine];
}

/// Registry root the vendor keys live under.
///
/// The suite is a 32-bit application, so on a 64-bit OS its keys are
/// redirected below `Wow6432Node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryRoot {
    /// `SOFTWARE\`
    Native,
    /// `SOFTWARE\Wow6432Node\`
    Wow6432,
}

impl RegistryRoot {
    /// Root matching the bit-width of the running process.
    pub fn for_process() -> Self {
        if cfg!(target_pointer_width = "64") {
            RegistryRoot::Wow6432
        } else {
            RegistryRoot::Native
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            RegistryRoot::Native => r"SOFTWARE\",
            RegistryRoot::Wow6432 => r"SOFTWARE\Wow6432Node\",
        }
    }

    /// Full key path for `subkey` below the variant's vendor segment.
    pub fn key(self, variant: BackendVariant, subkey: &str) -> String {
        format!(r"{}{}\{}", self.prefix(), variant.vendor_key(), subkey)
    }
}

/// Source of string values keyed like the Windows registry.
///
/// `value == None` reads the key's default (unnamed) value.
pub trait InstallRegistry: Send + Sync {
    fn read_string(&self, scope: RegistryScope, key: &str, value: Option<&str>) -> Option<String>;
}

/// In-memory registry. Key paths and value names compare case-insensitively,
/// as they do in the Windows registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    entries: HashMap<(RegistryScope, String, String), String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        scope: RegistryScope,
        key: &str,
        value: Option<&str>,
        data: impl Into<String>,
    ) {
        self.entries
            .insert(Self::entry_key(scope, key, value), data.into());
    }

    /// Builder-style [`MemoryRegistry::insert`].
    pub fn with(
        mut self,
        scope: RegistryScope,
        key: &str,
        value: Option<&str>,
        data: impl Into<String>,
    ) -> Self {
        self.insert(scope, key, value, data);
        self
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry_key(scope: RegistryScope, key: &str, value: Option<&str>) -> (RegistryScope, String, String) {
        (
            scope,
            key.to_ascii_lowercase(),
            value.unwrap_or_default().to_ascii_lowercase(),
        )
    }
}

impl InstallRegistry for MemoryRegistry {
    fn read_string(&self, scope: RegistryScope, key: &str, value: Option<&str>) -> Option<String> {
        self.entries
            .get(&Self::entry_key(scope, key, value))
            .cloned()
    }
}

/// The native Windows registry (`HKEY_CURRENT_USER` / `HKEY_LOCAL_MACHINE`).
#[cfg(windows)]
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

#[cfg(windows)]
impl InstallRegistry for WindowsRegistry {
    fn read_string(&self, scope: RegistryScope, key: &str, value: Option<&str>) -> Option<String> {
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};
        use winreg::RegKey;

        let hive = match scope {
            RegistryScope::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
            RegistryScope::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
        };
        let subkey = hive.open_subkey(key).ok()?;
        subkey.get_value::<String, _>(value.unwrap_or("")).ok()
    }
}

/// Registry appropriate for the target OS.
#[cfg(windows)]
pub fn platform_registry() -> Box<dyn InstallRegistry> {
    Box::new(WindowsRegistry)
}

/// Registry appropriate for the target OS.
#[cfg(not(windows))]
pub fn platform_registry() -> Box<dyn InstallRegistry> {
    Box::new(crate::layout::discover_layouts())
}
