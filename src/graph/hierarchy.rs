//! Hierarchy levels for layered layouts.
//!
//! Every root (a module nobody imports) starts its own breadth-first
//! traversal at level 0. When a traversal runs into a module already placed
//! by another root, the other root's whole subtree is shifted so the shared
//! module agrees with the current traversal, and the two subtrees continue
//! as one. Levels are normalized so the smallest is 0.
//!
//! Import cycles without any entry point have no root. The first such module
//! in insertion order is used as a root instead, repeated until every module
//! has a level.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Level assigned to every module of an [`ImportGraph`](super::ImportGraph).
///
/// # Example
///
/// ```rust
/// use importgraph::graph::ImportGraph;
///
/// let mut graph = ImportGraph::new();
/// graph.record_edge("app", "app.views");
/// graph.record_edge("app.views", "app.models");
///
/// let hierarchy = graph.hierarchy();
/// assert_eq!(hierarchy.level("app"), Some(0));
/// assert_eq!(hierarchy.level("app.models"), Some(2));
/// assert_eq!(hierarchy.max_level(), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    levels: BTreeMap<String, usize>,
}

impl Hierarchy {
    /// Returns the level of a module, or `None` if it is not in the graph.
    pub fn level(&self, name: &str) -> Option<usize> {
        self.levels.get(name).copied()
    }

    /// Returns the deepest level, or `None` for an empty hierarchy.
    pub fn max_level(&self) -> Option<usize> {
        self.levels.values().copied().max()
    }

    /// Groups module names by level. Names within a level are sorted.
    pub fn layers(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut layers: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for (name, &level) in &self.levels {
            layers.entry(level).or_default().push(name.as_str());
        }
        layers
    }

    /// Iterates over `(module, level)` pairs sorted by module name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.levels
            .iter()
            .map(|(name, &level)| (name.as_str(), level))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Level and owning root of a placed module.
#[derive(Debug, Clone, Copy)]
struct Placement {
    level: i64,
    root: NodeIndex,
}

struct HierarchyBuilder<'g> {
    graph: &'g DiGraph<String, ()>,
    placements: Vec<Option<Placement>>,
    subtrees: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl<'g> HierarchyBuilder<'g> {
    fn new(graph: &'g DiGraph<String, ()>) -> Self {
        Self {
            graph,
            placements: vec![None; graph.node_count()],
            subtrees: HashMap::new(),
        }
    }

    fn traverse(&mut self, root: NodeIndex) {
        self.subtrees.entry(root).or_default();
        let mut queue = VecDeque::from([(root, 0i64)]);

        while let Some((node, level)) = queue.pop_front() {
            let placement = self.placements[node.index()];
            match placement {
                Some(placed) if placed.root == root => continue,
                Some(placed) => {
                    self.merge(root, placed, level);
                    continue;
                }
                None => {}
            }

            self.placements[node.index()] = Some(Placement { level, root });
            self.subtrees.entry(root).or_default().push(node);

            let mut children: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .collect();
            children.sort_unstable();
            queue.extend(children.into_iter().map(|child| (child, level + 1)));
        }
    }

    /// Shifts the subtree owning a shared module so that module sits at
    /// `level`, then hands the subtree over to `root`.
    fn merge(&mut self, root: NodeIndex, shared: Placement, level: i64) {
        let offset = shared.level - level;
        let moved = self.subtrees.remove(&shared.root).unwrap_or_default();
        tracing::trace!(
            from = %self.graph[shared.root],
            into = %self.graph[root],
            offset,
            modules = moved.len(),
            "merging hierarchy subtrees"
        );

        for &node in &moved {
            if let Some(placement) = self.placements[node.index()].as_mut() {
                placement.level -= offset;
                placement.root = root;
            }
        }
        self.subtrees.entry(root).or_default().extend(moved);
    }

    fn first_unplaced(&self) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|idx| self.placements[idx.index()].is_none())
    }

    fn finish(self) -> Hierarchy {
        let Some(min) = self.placements.iter().flatten().map(|p| p.level).min() else {
            return Hierarchy::default();
        };
        let levels = self
            .graph
            .node_indices()
            .filter_map(|idx| {
                self.placements[idx.index()]
                    .map(|p| (self.graph[idx].clone(), (p.level - min) as usize))
            })
            .collect();
        Hierarchy { levels }
    }
}

/// Assigns a level to every node of `graph`.
pub(crate) fn build_hierarchy(graph: &DiGraph<String, ()>) -> Hierarchy {
    let mut builder = HierarchyBuilder::new(graph);

    let roots: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&idx| {
            graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
        .collect();
    for root in roots {
        builder.traverse(root);
    }

    while let Some(start) = builder.first_unplaced() {
        tracing::warn!(
            module = %graph[start],
            "import cycle has no entry point; treating it as a root"
        );
        builder.traverse(start);
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use crate::graph::ImportGraph;

    fn graph(edges: &[(&str, &str)]) -> ImportGraph {
        let mut graph = ImportGraph::new();
        for (source, target) in edges {
            graph.record_edge(source, target);
        }
        graph
    }

    fn assert_levels(graph: &ImportGraph, expected: &[(&str, usize)]) {
        let hierarchy = graph.hierarchy();
        for (name, level) in expected {
            assert_eq!(hierarchy.level(name), Some(*level), "level of {}", name);
        }
        assert_eq!(hierarchy.len(), graph.node_count());
    }

    #[test]
    fn test_empty_graph() {
        let hierarchy = ImportGraph::new().hierarchy();
        assert!(hierarchy.is_empty());
        assert_eq!(hierarchy.max_level(), None);
        assert!(hierarchy.layers().is_empty());
    }

    #[test]
    fn test_chain() {
        let graph = graph(&[("a", "b"), ("b", "c")]);
        assert_levels(&graph, &[("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn test_diamond_uses_shortest_distance() {
        let graph = graph(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("a", "d")]);
        assert_levels(&graph, &[("a", 0), ("b", 1), ("c", 1), ("d", 1)]);
    }

    #[test]
    fn test_merge_shifts_earlier_subtree() {
        // r1 -> x -> shared, r2 -> shared
        let graph = graph(&[("r1", "x"), ("x", "shared"), ("r2", "shared")]);
        assert_levels(&graph, &[("r1", 0), ("x", 1), ("shared", 2), ("r2", 1)]);
    }

    #[test]
    fn test_merge_shifts_whole_subtree_downward() {
        // r1 -> shared -> leaf, r2 -> m1 -> m2 -> shared
        let graph = graph(&[
            ("r1", "shared"),
            ("shared", "leaf"),
            ("r2", "m1"),
            ("m1", "m2"),
            ("m2", "shared"),
        ]);
        assert_levels(
            &graph,
            &[
                ("r2", 0),
                ("m1", 1),
                ("m2", 2),
                ("r1", 2),
                ("shared", 3),
                ("leaf", 4),
            ],
        );
    }

    #[test]
    fn test_merged_subtrees_move_together() {
        // r1 and r2 merge over s1, then r3 reaches s1's subtree through s2.
        let graph = graph(&[
            ("r1", "s1"),
            ("r2", "a"),
            ("a", "s1"),
            ("s1", "s2"),
            ("r3", "b"),
            ("b", "c"),
            ("c", "s2"),
        ]);
        let hierarchy = graph.hierarchy();
        let level = |name: &str| hierarchy.level(name).unwrap() as i64;

        assert_eq!(level("s1") - level("r1"), 1);
        assert_eq!(level("s1") - level("a"), 1);
        assert_eq!(level("a") - level("r2"), 1);
        assert_eq!(level("s2") - level("s1"), 1);
        assert_eq!(level("s2") - level("c"), 1);
        assert_eq!(level("c") - level("r3"), 2);
        assert_eq!(hierarchy.iter().map(|(_, l)| l).min(), Some(0));
    }

    #[test]
    fn test_rootless_cycle_gets_synthetic_root() {
        let graph = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_levels(&graph, &[("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn test_rootless_cycle_merges_into_rooted_part() {
        let graph = graph(&[("main", "lib"), ("x", "y"), ("y", "x"), ("y", "lib")]);
        assert_levels(&graph, &[("x", 0), ("y", 1), ("main", 1), ("lib", 2)]);
    }

    #[test]
    fn test_self_import_only() {
        let graph = graph(&[("a", "a")]);
        assert_levels(&graph, &[("a", 0)]);
    }

    #[test]
    fn test_cycle_below_root_terminates() {
        let graph = graph(&[("r", "a"), ("a", "b"), ("b", "a")]);
        assert_levels(&graph, &[("r", 0), ("a", 1), ("b", 2)]);
    }

    #[test]
    fn test_every_node_has_level_and_min_is_zero() {
        let graph = graph(&[
            ("app", "app.cli"),
            ("app", "app.core"),
            ("app.cli", "argparse"),
            ("app.core", "json"),
            ("tool", "json"),
            ("tool", "app.core"),
            ("loop1", "loop2"),
            ("loop2", "loop1"),
        ]);
        let hierarchy = graph.hierarchy();

        for name in graph.nodes() {
            assert!(hierarchy.level(name).is_some(), "{} has no level", name);
        }
        assert_eq!(hierarchy.iter().map(|(_, l)| l).min(), Some(0));
    }

    #[test]
    fn test_layers_group_sorted_names() {
        let graph = graph(&[("a", "c"), ("a", "b")]);
        let hierarchy = graph.hierarchy();
        let layers = hierarchy.layers();

        assert_eq!(layers.get(&0), Some(&vec!["a"]));
        assert_eq!(layers.get(&1), Some(&vec!["b", "c"]));
    }
}
