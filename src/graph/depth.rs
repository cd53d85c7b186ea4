//! Longest containment path in the process-group hierarchy.

use std::collections::{HashMap, HashSet};

use super::ProcessGroupTree;

/// Longest path, in edges, from any group down to a leaf.
///
/// Terminates on cyclic input: a group already on the current DFS stack
/// contributes 0 instead of being entered again.
///
/// # Example
///
/// ```
/// use flowscore::graph::{max_path_depth, ProcessGroupNode, ProcessGroupTree};
///
/// let mut tree = ProcessGroupTree::new("root");
/// let mut root = ProcessGroupNode::new("root", "Root");
/// root.children.push("child".into());
/// tree.insert(root);
/// tree.insert(ProcessGroupNode::new("child", "Child"));
///
/// assert_eq!(max_path_depth(&tree), 1);
/// ```
pub fn max_path_depth(tree: &ProcessGroupTree) -> usize {
    let mut resolver = DepthResolver::new(tree);
    tree.ids()
        .map(|id| resolver.depth(id))
        .max()
        .unwrap_or(0)
}

/// Memoised depth-first depth computation over one tree.
///
/// The memo is shared across every starting group; the `visiting` set is
/// reset for each top-level call.
#[derive(Debug)]
pub struct DepthResolver<'a> {
    tree: &'a ProcessGroupTree,
    memo: HashMap<String, usize>,
}

impl<'a> DepthResolver<'a> {
    pub fn new(tree: &'a ProcessGroupTree) -> Self {
        Self {
            tree,
            memo: HashMap::new(),
        }
    }

    /// Depth below `id`: 0 for leaves and unknown ids.
    pub fn depth(&mut self, id: &str) -> usize {
        let mut visiting = HashSet::new();
        self.visit(id, &mut visiting)
    }

    fn visit(&mut self, id: &str, visiting: &mut HashSet<String>) -> usize {
        if let Some(&depth) = self.memo.get(id) {
            return depth;
        }
        let Some(node) = self.tree.get(id) else {
            return 0;
        };
        if !visiting.insert(id.to_string()) {
            return 0;
        }

        let mut best = 0;
        for child in &node.children {
            best = best.max(1 + self.visit(child, visiting));
        }

        visiting.remove(id);
        self.memo.insert(id.to_string(), best);
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ProcessGroupNode;

    fn tree(edges: &[(&str, &[&str])]) -> ProcessGroupTree {
        let mut tree = ProcessGroupTree::new(edges.first().map(|e| e.0).unwrap_or("root"));
        for (id, children) in edges {
            let mut node = ProcessGroupNode::new(*id, *id);
            node.children = children.iter().map(|c| c.to_string()).collect();
            tree.insert(node);
        }
        tree
    }

    #[test]
    fn test_single_group_has_depth_zero() {
        assert_eq!(max_path_depth(&tree(&[("root", &[])])), 0);
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(max_path_depth(&ProcessGroupTree::new("root")), 0);
    }

    #[test]
    fn test_longest_branch_wins() {
        // root -> a -> b -> c, root -> d
        let t = tree(&[
            ("root", &["a", "d"]),
            ("a", &["b"]),
            ("b", &["c"]),
            ("c", &[]),
            ("d", &[]),
        ]);
        assert_eq!(max_path_depth(&t), 3);

        let mut resolver = DepthResolver::new(&t);
        assert_eq!(resolver.depth("a"), 2);
        assert_eq!(resolver.depth("d"), 0);
    }

    #[test]
    fn test_unknown_child_counts_one_edge() {
        let t = tree(&[("root", &["ghost"])]);
        assert_eq!(max_path_depth(&t), 1);
    }

    #[test]
    fn test_cycle_terminates() {
        let t = tree(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let depth = max_path_depth(&t);
        assert!(depth <= 3);

        let mut resolver = DepthResolver::new(&t);
        for id in ["a", "b", "c"] {
            assert!(resolver.depth(id) <= 3);
        }
    }

    #[test]
    fn test_self_loop_terminates() {
        let t = tree(&[("a", &["a"])]);
        assert_eq!(max_path_depth(&t), 1);
    }
}
