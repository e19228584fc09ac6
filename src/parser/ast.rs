// Syntax tree for the Pascal subset
//
// Nodes live in an arena and refer to each other by index. A node owns its
// left and right children; the parent index is only a navigation aid for the
// expression builder and never implies ownership.

use std::fmt::Write as _;
use std::ops::Index;

/// Index of a node inside a [`SyntaxTree`]
pub type NodeId = usize;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Value of the sentinel leaf that terminates the declaration chain
pub const DECL_SENTINEL: &str = "$";

/// A single tree node
#[derive(Debug, Clone)]
pub struct Node {
    value: String,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    precedence: i32,
}

impl Node {
    fn new(value: String, precedence: i32) -> Self {
        Node {
            value,
            left: None,
            right: None,
            parent: None,
            precedence,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Arena-backed binary syntax tree
///
/// Freed slots are recycled by later allocations. Dropping the tree releases
/// every node at once.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        SyntaxTree::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a node, returning `None` for freed or unknown ids
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).and_then(|slot| slot.as_ref())
    }

    /// Create a detached node with the default precedence
    pub fn create_node(&mut self, value: impl Into<String>) -> NodeId {
        self.create_op_node(value, 0)
    }

    /// Create a detached node carrying an explicit precedence
    pub fn create_op_node(&mut self, value: impl Into<String>, precedence: i32) -> NodeId {
        let node = Node::new(value.into(), precedence);
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Create a node and hang it under `parent` as its left child
    pub fn add_left_node(&mut self, parent: NodeId, value: impl Into<String>) -> NodeId {
        let child = self.create_node(value);
        self.replace_left(parent, child);
        child
    }

    /// Create a node and hang it under `parent` as its right child
    pub fn add_right_node(&mut self, parent: NodeId, value: impl Into<String>) -> NodeId {
        let child = self.create_node(value);
        self.replace_right(parent, child);
        child
    }

    /// Attach an existing subtree as the left child of `parent`.
    ///
    /// A subtree previously attached there is freed.
    pub fn attach_left(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.replace_left(parent, child) {
            self.free_subtree(old);
        }
    }

    /// Attach an existing subtree as the right child of `parent`.
    ///
    /// A subtree previously attached there is freed.
    pub fn attach_right(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.replace_right(parent, child) {
            self.free_subtree(old);
        }
    }

    /// Detach and return the right child of `parent`
    pub fn take_right(&mut self, parent: NodeId) -> Option<NodeId> {
        let child = self.slot_mut(parent).right.take()?;
        self.slot_mut(child).parent = None;
        Some(child)
    }

    /// Unlink `id` from its parent, leaving it as the root of a detached subtree
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(Node::parent) else {
            return;
        };
        let parent_node = self.slot_mut(parent);
        if parent_node.left == Some(id) {
            parent_node.left = None;
        }
        if parent_node.right == Some(id) {
            parent_node.right = None;
        }
        self.slot_mut(id).parent = None;
    }

    /// Release `id` and every descendant, returning how many nodes were freed.
    ///
    /// Unknown or already freed ids release nothing.
    pub fn free_subtree(&mut self, id: NodeId) -> usize {
        if self.get(id).is_none() {
            return 0;
        }
        self.detach(id);
        if self.root == Some(id) {
            self.root = None;
        }

        let mut released = 0;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.nodes.get_mut(current).and_then(Option::take) else {
                continue;
            };
            pending.extend(node.left);
            pending.extend(node.right);
            self.free.push(current);
            released += 1;
        }
        released
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
    }

    /// Deep-copy the subtree rooted at `id`, returning the detached copy
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let copy = self.copy_node(id);
        let mut pending = vec![(id, copy)];
        while let Some((source, target)) = pending.pop() {
            let (left, right) = (self[source].left, self[source].right);
            if let Some(left) = left {
                let left_copy = self.copy_node(left);
                self.replace_left(target, left_copy);
                pending.push((left, left_copy));
            }
            if let Some(right) = right {
                let right_copy = self.copy_node(right);
                self.replace_right(target, right_copy);
                pending.push((right, right_copy));
            }
        }
        copy
    }

    /// Fresh childless node with the value and precedence of `id`
    fn copy_node(&mut self, id: NodeId) -> NodeId {
        let source = &self[id];
        let (value, precedence) = (source.value.clone(), source.precedence);
        self.create_op_node(value, precedence)
    }

    /// Indented dump of the subtree rooted at `id`, right children first
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut pending = vec![(id, 0usize, ' ')];
        while let Some((current, depth, side)) = pending.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            let _ = writeln!(out, "{}{} {}", "    ".repeat(depth), side, node.value);
            if let Some(left) = node.left {
                pending.push((left, depth + 1, 'L'));
            }
            if let Some(right) = node.right {
                pending.push((right, depth + 1, 'R'));
            }
        }
        out
    }

    fn replace_left(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        self.detach(child);
        let old = self.slot_mut(parent).left.replace(child);
        self.slot_mut(child).parent = Some(parent);
        if let Some(old) = old {
            self.slot_mut(old).parent = None;
        }
        old
    }

    fn replace_right(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        self.detach(child);
        let old = self.slot_mut(parent).right.replace(child);
        self.slot_mut(child).parent = Some(parent);
        if let Some(old) = old {
            self.slot_mut(old).parent = None;
        }
        old
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("syntax tree node {id} is not live"),
        }
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("syntax tree node {id} is not live"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (SyntaxTree, NodeId) {
        let mut tree = SyntaxTree::new();
        let root = tree.create_op_node("+", 2);
        tree.add_left_node(root, "a");
        let mul = tree.create_op_node("*", 3);
        tree.attach_right(root, mul);
        tree.add_left_node(mul, "b");
        tree.add_right_node(mul, "c");
        tree.set_root(root);
        (tree, root)
    }

    #[test]
    fn test_links_and_parents() {
        let (tree, root) = sample();
        let mul = tree[root].right().unwrap();
        assert_eq!(tree[mul].value(), "*");
        assert_eq!(tree[mul].parent(), Some(root));
        assert_eq!(tree[mul].precedence(), 3);
        let c = tree[mul].right().unwrap();
        assert!(tree[c].is_leaf());
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_free_subtree_counts_each_node_once() {
        let (mut tree, root) = sample();
        let mul = tree[root].right().unwrap();

        assert_eq!(tree.free_subtree(mul), 3);
        assert_eq!(tree[root].right(), None);
        assert_eq!(tree.len(), 2);

        // freeing again is a no-op
        assert_eq!(tree.free_subtree(mul), 0);
        assert_eq!(tree.free_subtree(root), 2);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn test_free_on_empty_tree() {
        let mut tree = SyntaxTree::new();
        assert_eq!(tree.free_subtree(0), 0);
        tree.clear();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_slots_are_recycled() {
        let (mut tree, root) = sample();
        let mul = tree[root].right().unwrap();
        tree.free_subtree(mul);
        let fresh = tree.create_node("x");
        assert!(fresh < 5);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_take_right_detaches() {
        let (mut tree, root) = sample();
        let mul = tree.take_right(root).unwrap();
        assert_eq!(tree[mul].parent(), None);
        assert_eq!(tree[root].right(), None);

        let splice = tree.create_op_node("-", 2);
        tree.attach_left(splice, mul);
        tree.attach_right(root, splice);
        assert_eq!(tree[mul].parent(), Some(splice));
        assert_eq!(tree[splice].parent(), Some(root));
    }

    #[test]
    fn test_deep_chain_teardown() {
        let mut tree = SyntaxTree::new();
        let head = tree.create_node("begin");
        let mut tail = head;
        for i in 0..100_000 {
            tail = tree.add_right_node(tail, format!("_*op1.{i}"));
        }
        assert_eq!(tree.free_subtree(head), 100_001);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_clone_subtree_is_independent() {
        let (mut tree, root) = sample();
        let copy = tree.clone_subtree(root);
        assert_eq!(tree.len(), 10);
        tree.free_subtree(root);
        assert_eq!(tree[copy].value(), "+");
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_clone_long_chain() {
        let mut tree = SyntaxTree::new();
        let head = tree.create_node("0");
        let mut tail = head;
        for i in 1..100_000 {
            tail = tree.add_right_node(tail, i.to_string());
        }

        let copy = tree.clone_subtree(head);
        assert_eq!(tree.len(), 200_000);
        assert_eq!(tree[copy].parent(), None);

        let mut link = Some(copy);
        let mut count = 0;
        while let Some(current) = link {
            assert_eq!(tree[current].value(), count.to_string());
            count += 1;
            link = tree[current].right();
        }
        assert_eq!(count, 100_000);
        assert_eq!(tree.free_subtree(head), 100_000);
    }

    #[test]
    fn test_render_lists_every_node() {
        let (tree, root) = sample();
        let dump = tree.render(root);
        assert_eq!(dump.lines().count(), 5);
        assert!(dump.starts_with("  +"));
    }
}
