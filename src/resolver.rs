//! Resolution of load events into dependency targets.
//!
//! A plain `import a.b` depends on exactly `a.b`. A `from X import a, b`
//! load names items that may be submodules or plain attributes of `X`, so
//! each item is expanded into a candidate path and trimmed back to the
//! longest prefix that is actually a loaded module.

use std::collections::BTreeSet;

use crate::event::{LoadEvent, ModulePath, ModuleRegistry};

/// Builds one candidate path per item of a `from ... import ...` load.
///
/// Relative levels strip trailing segments from the requester's name before
/// the target is appended. Absolute loads (level 0) start from an empty base.
/// Plain imports yield no candidates.
///
/// # Example
///
/// ```rust
/// use importgraph::event::{LoadEvent, ModulePath};
/// use importgraph::resolver::candidate_paths;
///
/// // from .module2 import SomeClass  (inside some.module)
/// let event = LoadEvent::from_import("some.module", "module2", ["SomeClass"], 1);
/// assert_eq!(
///     candidate_paths(&event),
///     vec![ModulePath::from_dotted("some.module2.SomeClass")]
/// );
/// ```
pub fn candidate_paths(event: &LoadEvent) -> Vec<ModulePath> {
    let Some(items) = event.items.as_ref() else {
        return Vec::new();
    };

    let mut base = if event.level == 0 {
        ModulePath::default()
    } else {
        let mut requester = ModulePath::from_dotted(&event.requester);
        requester.truncate_tail(event.level);
        requester
    };
    base.extend_dotted(&event.target);

    items
        .iter()
        .map(|item| {
            let mut candidate = base.clone();
            candidate.push(item.as_str());
            candidate
        })
        .collect()
}

/// Returns the longest prefix of `path` that names a loaded module.
///
/// The empty path is returned when no prefix is a module.
pub fn last_module_in_path<R>(path: &ModulePath, registry: &R) -> ModulePath
where
    R: ModuleRegistry + ?Sized,
{
    (1..=path.len())
        .rev()
        .map(|len| path.prefix(len))
        .find(|prefix| registry.is_module(&prefix.dotted()))
        .unwrap_or_default()
}

/// Resolves a load event into the set of modules the requester depends on.
///
/// Misses are dropped silently, and items resolving to the same module
/// collapse into one target.
///
/// # Example
///
/// ```rust
/// use importgraph::event::{LoadEvent, RegistrySnapshot};
/// use importgraph::resolver::imported_names;
///
/// let registry: RegistrySnapshot = [
///     ("some", None),
///     ("some.module", None),
///     ("some.module2", None),
/// ]
/// .into_iter()
/// .collect();
///
/// // from .module2 import SomeClass, helper
/// let event = LoadEvent::from_import("some.module", "module2", ["SomeClass", "helper"], 1);
/// let names = imported_names(&event, &registry);
///
/// assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["some.module2".to_string()]);
/// ```
pub fn imported_names<R>(event: &LoadEvent, registry: &R) -> BTreeSet<String>
where
    R: ModuleRegistry + ?Sized,
{
    if !event.is_from_import() {
        if event.target.is_empty() {
            tracing::trace!(requester = %event.requester, "plain import without a target");
            return BTreeSet::new();
        }
        return BTreeSet::from([event.target.clone()]);
    }

    let modules: BTreeSet<ModulePath> = candidate_paths(event)
        .iter()
        .map(|candidate| {
            let module = last_module_in_path(candidate, registry);
            if module.is_empty() {
                tracing::trace!(
                    requester = %event.requester,
                    candidate = %candidate,
                    "no loaded module along candidate path"
                );
            }
            module
        })
        .filter(|module| !module.is_empty())
        .collect();

    modules.iter().map(ModulePath::dotted).collect()
}
