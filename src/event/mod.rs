//! Load events observed while a program runs.
//!
//! A [`LoadEvent`] describes one executed import: who asked, what was asked
//! for, and which names were pulled out of it. Events are consumed by the
//! [`resolver`](crate::resolver) as soon as they arrive and then dropped.

pub mod registry;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub use registry::{ModuleRegistry, ModuleStatus, RegistrySnapshot};

/// Placeholder identity for loads issued from a context without a module name.
pub const UNKNOWN_MODULE_NAME: &str = "<unknown>";

/// One observed module load.
///
/// # Example
///
/// ```rust
/// use importgraph::event::LoadEvent;
///
/// // from . import module2  (inside some.module)
/// let event = LoadEvent::from_import("some.module", "", ["module2"], 1);
/// assert!(event.is_from_import());
/// assert_eq!(event.level, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadEvent {
    /// Fully-qualified name of the importing module.
    #[serde(
        default = "unknown_requester",
        deserialize_with = "deserialize_requester"
    )]
    pub requester: String,

    /// The requested target as written, possibly empty for `from . import x`.
    #[serde(default)]
    pub target: String,

    /// Names listed after `import` in a `from X import a, b` load.
    #[serde(default)]
    pub items: Option<Vec<String>>,

    /// Number of leading dots of a relative import; 0 for absolute imports.
    #[serde(default)]
    pub level: usize,

    /// Name of the module object the load returned, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

fn unknown_requester() -> String {
    UNKNOWN_MODULE_NAME.to_string()
}

fn deserialize_requester<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.unwrap_or_else(unknown_requester))
}

impl LoadEvent {
    /// Creates a plain `import target` event.
    pub fn import(requester: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            requester: requester.into(),
            target: target.into(),
            items: None,
            level: 0,
            resolved: None,
        }
    }

    /// Creates a `from target import items` event with the given relative level.
    pub fn from_import<I, S>(
        requester: impl Into<String>,
        target: impl Into<String>,
        items: I,
        level: usize,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            requester: requester.into(),
            target: target.into(),
            items: Some(items.into_iter().map(Into::into).collect()),
            level,
            resolved: None,
        }
    }

    /// Returns true for `from X import ...` loads.
    ///
    /// An empty item list counts as a plain import.
    pub fn is_from_import(&self) -> bool {
        self.items.as_ref().is_some_and(|items| !items.is_empty())
    }

    /// Returns true when the importing module could not be identified.
    pub fn has_unknown_requester(&self) -> bool {
        self.requester == UNKNOWN_MODULE_NAME
    }
}

/// A module name split into its dotted segments.
///
/// The empty path marks a resolution miss.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// Splits a dotted name. The empty string yields the empty path.
    ///
    /// ```rust
    /// use importgraph::event::ModulePath;
    ///
    /// let path = ModulePath::from_dotted("some.module");
    /// assert_eq!(path.len(), 2);
    /// assert!(ModulePath::from_dotted("").is_empty());
    /// ```
    pub fn from_dotted(name: &str) -> Self {
        if name.is_empty() {
            return Self::default();
        }
        Self(name.split('.').map(str::to_string).collect())
    }

    /// Builds a path from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops the last `count` segments, saturating at the empty path.
    pub fn truncate_tail(&mut self, count: usize) {
        let keep = self.0.len().saturating_sub(count);
        self.0.truncate(keep);
    }

    /// Appends every segment of a dotted name. Empty names append nothing.
    pub fn extend_dotted(&mut self, name: &str) {
        if !name.is_empty() {
            self.0.extend(name.split('.').map(str::to_string));
        }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Returns the first `len` segments.
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Joins the segments with dots.
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dotted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_null_requester() {
        let json = r#"{"requester": null, "target": "os", "items": null, "level": 0}"#;
        let event: LoadEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.requester, UNKNOWN_MODULE_NAME);
        assert!(event.has_unknown_requester());
        assert!(!event.is_from_import());
    }

    #[test]
    fn test_deserialize_missing_requester() {
        let json = r#"{"target": "os"}"#;
        let event: LoadEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.requester, UNKNOWN_MODULE_NAME);
        assert_eq!(event.level, 0);
        assert!(event.resolved.is_none());
    }

    #[test]
    fn test_deserialize_from_import() {
        let json = r#"{"requester": "pkg.a", "target": "b", "items": ["C", "d"], "level": 1, "resolved": "pkg.b"}"#;
        let event: LoadEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event, {
            let mut expected = LoadEvent::from_import("pkg.a", "b", ["C", "d"], 1);
            expected.resolved = Some("pkg.b".to_string());
            expected
        });
    }

    #[test]
    fn test_empty_items_is_plain_import() {
        let event = LoadEvent::from_import("a", "b", Vec::<String>::new(), 0);
        assert!(!event.is_from_import());
    }

    #[test]
    fn test_module_path_truncate_saturates() {
        let mut path = ModulePath::from_dotted("some.module");
        path.truncate_tail(5);
        assert!(path.is_empty());
    }

    #[test]
    fn test_module_path_extend_and_prefix() {
        let mut path = ModulePath::from_dotted("some");
        path.extend_dotted("module2.inner");
        path.extend_dotted("");
        path.push("Item");

        assert_eq!(path.dotted(), "some.module2.inner.Item");
        assert_eq!(
            path.prefix(2),
            ModulePath::from_segments(["some", "module2"])
        );
        assert_eq!(path.prefix(10), path);
        assert_eq!(path.to_string(), "some.module2.inner.Item");
    }
}
