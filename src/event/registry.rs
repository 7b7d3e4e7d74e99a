//! Registry of loaded modules.
//!
//! The resolver needs to know whether a dotted name is bound to a loaded
//! module, and the edge filter needs that module's file. Both questions are
//! answered by [`ModuleRegistry::status`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Answer to "is this name a loaded module, and where does it live?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus<'a> {
    /// A loaded module backed by a file on disk.
    Located(&'a Path),
    /// A loaded module without a file (builtins, namespace packages).
    Unlocated,
    /// Not a loaded module.
    Missing,
}

impl<'a> ModuleStatus<'a> {
    /// Returns true for both located and unlocated modules.
    pub fn is_module(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// Returns the module's file, if it has one.
    pub fn location(&self) -> Option<&'a Path> {
        match self {
            Self::Located(path) => Some(path),
            _ => None,
        }
    }
}

/// Query interface over the set of currently loaded modules.
pub trait ModuleRegistry {
    /// Looks up a fully-qualified module name.
    fn status(&self, name: &str) -> ModuleStatus<'_>;

    /// Returns true if `name` is currently a loaded module.
    fn is_module(&self, name: &str) -> bool {
        self.status(name).is_module()
    }

    /// Returns the on-disk location of `name`, if it is a module with a file.
    fn location(&self, name: &str) -> Option<&Path> {
        self.status(name).location()
    }
}

/// A loaded module as announced by the trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    /// Fully-qualified module name.
    pub name: String,
    /// Source file, absent for builtins and namespace packages.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl ModuleEntry {
    pub fn new(name: impl Into<String>, file: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file,
        }
    }
}

/// In-memory registry that grows as modules are loaded.
///
/// # Example
///
/// ```rust
/// use importgraph::event::{ModuleRegistry, RegistrySnapshot};
///
/// let mut registry = RegistrySnapshot::new();
/// registry.insert("some.module", Some("/src/some/module.py".into()));
/// registry.insert("sys", None);
///
/// assert!(registry.is_module("sys"));
/// assert!(registry.location("sys").is_none());
/// assert!(registry.location("some.module").is_some());
/// assert!(!registry.is_module("some.module.SomeClass"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    modules: HashMap<String, Option<PathBuf>>,
}

impl RegistrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a loaded module, replacing any previous location.
    pub fn insert(&mut self, name: impl Into<String>, file: Option<PathBuf>) {
        self.modules.insert(name.into(), file);
    }

    /// Records a module announced by the trace.
    pub fn register(&mut self, entry: ModuleEntry) {
        self.insert(entry.name, entry.file);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Option<PathBuf>)> for RegistrySnapshot {
    fn from_iter<T: IntoIterator<Item = (N, Option<PathBuf>)>>(iter: T) -> Self {
        Self {
            modules: iter
                .into_iter()
                .map(|(name, file)| (name.into(), file))
                .collect(),
        }
    }
}

impl ModuleRegistry for RegistrySnapshot {
    fn status(&self, name: &str) -> ModuleStatus<'_> {
        match self.modules.get(name) {
            Some(Some(path)) => ModuleStatus::Located(path),
            Some(None) => ModuleStatus::Unlocated,
            None => ModuleStatus::Missing,
        }
    }
}
