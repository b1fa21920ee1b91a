//! Recognized archive file extensions.
//!
//! Extraction only accepts archives whose extension is recognized. `zip`
//! and `cbz` are always recognized; further extensions can be registered at
//! runtime. The built-ins are never stored in the custom set, so removing
//! them has no effect.
//!
//! A process-wide registry is available through the free functions
//! [`add_custom_file_extension`], [`remove_custom_file_extension`] and
//! [`is_valid_file_extension`]. An [`ExtensionRegistry`] value can also be
//! created and handed to an extractor directly.

use parking_lot::{Mutex, const_mutex};
use std::collections::BTreeSet;

/// Extensions recognized without registration.
pub const BUILTIN_EXTENSIONS: [&str; 2] = ["zip", "cbz"];

/// A set of recognized archive extensions, safe to share between threads.
#[derive(Debug)]
pub struct ExtensionRegistry {
    custom: Mutex<BTreeSet<String>>,
}

static GLOBAL: ExtensionRegistry = ExtensionRegistry::new();

impl ExtensionRegistry {
    /// Create a registry with no custom extensions.
    pub const fn new() -> Self {
        Self {
            custom: const_mutex(BTreeSet::new()),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Register a custom extension.
    pub fn add(&self, extension: impl Into<String>) {
        self.custom.lock().insert(extension.into());
    }

    /// Unregister a custom extension. Built-ins cannot be removed.
    pub fn remove(&self, extension: &str) {
        self.custom.lock().remove(extension);
    }

    /// Check if an extension (without the leading dot) is recognized.
    pub fn is_valid(&self, extension: &str) -> bool {
        BUILTIN_EXTENSIONS.contains(&extension) || self.custom.lock().contains(extension)
    }

    /// Snapshot of the custom extensions.
    pub fn custom_extensions(&self) -> Vec<String> {
        self.custom.lock().iter().cloned().collect()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register a custom extension in the process-wide registry.
pub fn add_custom_file_extension(extension: impl Into<String>) {
    GLOBAL.add(extension);
}

/// Unregister a custom extension from the process-wide registry.
pub fn remove_custom_file_extension(extension: &str) {
    GLOBAL.remove(extension);
}

/// Check an extension against the process-wide registry.
pub fn is_valid_file_extension(extension: &str) -> bool {
    GLOBAL.is_valid(extension)
}
