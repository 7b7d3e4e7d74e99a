//! Module discovery for directory mode.
//!
//! Every `.py` file below a directory becomes a module named after its
//! relative path. Sub-directories only count as packages, and are only
//! descended into, when they contain an `__init__.py`.

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::error::Result;

const PACKAGE_MARKER: &str = "__init__.py";
const BYTECODE_CACHE: &str = "__pycache__";

/// Returns true for directories that are packages (and for the walk root).
fn is_package_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    entry.file_name() != BYTECODE_CACHE && entry.path().join(PACKAGE_MARKER).is_file()
}

/// Derives the dotted module name of a source file relative to `root`.
fn module_name(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut parts: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();

    let stem = relative.file_stem()?.to_string_lossy().into_owned();
    if stem != "__init__" || parts.is_empty() {
        parts.push(stem);
    }
    Some(parts.join("."))
}

/// Collects the module names importable from `root`, sorted.
///
/// # Example
///
/// ```rust
/// use importgraph::discover::collect_module_names;
/// use std::fs;
///
/// let dir = tempfile::tempdir().unwrap();
/// fs::create_dir(dir.path().join("pkg")).unwrap();
/// fs::write(dir.path().join("pkg/__init__.py"), "").unwrap();
/// fs::write(dir.path().join("pkg/core.py"), "").unwrap();
/// fs::write(dir.path().join("main.py"), "").unwrap();
///
/// let modules = collect_module_names(dir.path()).unwrap();
/// assert_eq!(modules, vec!["main", "pkg", "pkg.core"]);
/// ```
pub fn collect_module_names(root: &Path) -> Result<Vec<String>> {
    let mut modules = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_entry(is_package_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some("py") {
            continue;
        }
        if let Some(name) = module_name(root, entry.path()) {
            modules.push(name);
        }
    }

    modules.sort();
    modules.dedup();
    tracing::debug!(root = %root.display(), modules = modules.len(), "discovered modules");
    Ok(modules)
}

/// Collects module names from several directories, in argument order.
pub fn collect_from_dirs<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<String>> {
    let mut modules = Vec::new();
    for root in roots {
        modules.extend(collect_module_names(root.as_ref())?);
    }
    Ok(modules)
}
