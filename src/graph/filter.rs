//! Location-based edge filtering.
//!
//! Patterns are matched against the file each endpoint module was loaded
//! from, and must match the whole path.

use regex::Regex;

use crate::error::{ImportGraphError, Result};
use crate::event::ModuleRegistry;

/// Decides which import edges are kept in the graph.
///
/// # Example
///
/// ```rust
/// use importgraph::event::RegistrySnapshot;
/// use importgraph::graph::EdgeFilter;
///
/// let filter = EdgeFilter::new(Some("/src/.*"), &[r".*/tests/.*"]).unwrap();
///
/// let mut registry = RegistrySnapshot::new();
/// registry.insert("app", Some("/src/app.py".into()));
/// registry.insert("app.util", Some("/src/app/util.py".into()));
/// registry.insert("app.tests", Some("/src/app/tests/__init__.py".into()));
///
/// assert!(filter.keeps("app", "app.util", &registry));
/// assert!(!filter.keeps("app", "app.tests", &registry));
/// assert!(!filter.keeps("app", "json", &registry));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeFilter {
    include: Option<Regex>,
    exclude: Vec<Regex>,
}

impl EdgeFilter {
    /// A filter that keeps every edge.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Compiles an optional inclusion pattern and any number of exclusion patterns.
    pub fn new<S: AsRef<str>>(include: Option<&str>, exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: include.map(compile_full_match).transpose()?,
            exclude: exclude
                .iter()
                .map(|pattern| compile_full_match(pattern.as_ref()))
                .collect::<Result<_>>()?,
        })
    }

    /// Returns true when no patterns are configured.
    pub fn is_permissive(&self) -> bool {
        self.include.is_none() && self.exclude.is_empty()
    }

    /// Returns true if both endpoints pass the inclusion pattern.
    ///
    /// Endpoints without a location fail a configured pattern.
    pub fn includes<R>(&self, source: &str, target: &str, registry: &R) -> bool
    where
        R: ModuleRegistry + ?Sized,
    {
        let Some(include) = &self.include else {
            return true;
        };
        [source, target].iter().all(|name| {
            registry
                .location(name)
                .is_some_and(|path| include.is_match(&path.to_string_lossy()))
        })
    }

    /// Returns true if either endpoint matches any exclusion pattern.
    ///
    /// Endpoints without a location are never excluded.
    pub fn excludes<R>(&self, source: &str, target: &str, registry: &R) -> bool
    where
        R: ModuleRegistry + ?Sized,
    {
        if self.exclude.is_empty() {
            return false;
        }
        [source, target].iter().any(|name| {
            registry.location(name).is_some_and(|path| {
                let path = path.to_string_lossy();
                self.exclude.iter().any(|pattern| pattern.is_match(&path))
            })
        })
    }

    /// Returns true if the edge `source -> target` should be recorded.
    pub fn keeps<R>(&self, source: &str, target: &str, registry: &R) -> bool
    where
        R: ModuleRegistry + ?Sized,
    {
        self.includes(source, target, registry) && !self.excludes(source, target, registry)
    }
}

/// Anchors a pattern so it only matches an entire path.
fn compile_full_match(pattern: &str) -> Result<Regex> {
    let anchored = format!("^(?:{})$", pattern);
    Regex::new(&anchored).map_err(|source| ImportGraphError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
