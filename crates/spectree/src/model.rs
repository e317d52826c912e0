//! The expanded spec tree: containers, leaves and their opaque bodies.

use std::fmt;
use std::sync::Arc;

use crate::value::{Arguments, Value};

// ============================================================================
// Opaque bodies
// ============================================================================

/// An opaque unit of work attached to a leaf.
///
/// The engine never calls it. Execution collaborators invoke it through
/// [`crate::LeafRef::invoke`], which supplies the leaf's bound arguments.
#[derive(Clone)]
pub struct UnitOfWork(Arc<dyn Fn(&[Value]) + Send + Sync>);

impl UnitOfWork {
    /// Wrap a body that takes no arguments.
    pub fn new(body: impl Fn() + Send + Sync + 'static) -> Self {
        UnitOfWork(Arc::new(move |_: &[Value]| body()))
    }

    /// Wrap a body that receives the bound arguments of its leaf.
    pub fn with_args(body: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
        UnitOfWork(Arc::new(body))
    }

    /// A body that does nothing, for front-ends that only see source text.
    pub fn noop() -> Self {
        UnitOfWork(Arc::new(|_: &[Value]| {}))
    }

    pub fn call(&self, args: &[Value]) {
        (self.0)(args)
    }

    /// Whether two handles share the same underlying body.
    pub fn ptr_eq(&self, other: &UnitOfWork) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnitOfWork(..)")
    }
}

// ============================================================================
// Resolved paths
// ============================================================================

/// The root-to-self label chain of a node.
///
/// Empty until the [`crate::NameResolver`] has run. Empty labels stay as
/// empty segments, so a resolved path always has one segment per level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    segments: Vec<String>,
    rendered: String,
}

impl ResolvedPath {
    pub(crate) fn new(segments: Vec<String>, separator: &str) -> Self {
        let rendered = segments.join(separator);
        ResolvedPath { segments, rendered }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Labels of the proper ancestors, outermost first.
    pub fn ancestors(&self) -> &[String] {
        match self.segments.split_last() {
            Some((_, ancestors)) => ancestors,
            None => &[],
        }
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_resolved(&self) -> bool {
        !self.segments.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Where an expanded node came from: the table label and the entry index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableOrigin {
    pub table: String,
    pub entry: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    Leaf,
}

/// Payload of a node, by kind.
#[derive(Debug, Clone)]
pub enum NodeContent {
    /// A describe/context/when group, or one entry of a subtree table.
    Container { children: Vec<SpecNode> },
    /// An individual test case.
    Leaf {
        body: UnitOfWork,
        /// Entry arguments when the leaf was produced inside a table.
        arguments: Option<Arguments>,
    },
}

/// A node in the expanded spec tree.
///
/// Equality is structural: kinds, labels and child order. Bodies, bound
/// arguments and resolved paths are not compared.
#[derive(Debug, Clone)]
pub struct SpecNode {
    label: String,
    origin: Option<TableOrigin>,
    path: ResolvedPath,
    content: NodeContent,
}

impl SpecNode {
    pub fn container(label: impl Into<String>, children: Vec<SpecNode>) -> Self {
        SpecNode {
            label: label.into(),
            origin: None,
            path: ResolvedPath::default(),
            content: NodeContent::Container { children },
        }
    }

    pub fn leaf(label: impl Into<String>, body: UnitOfWork, arguments: Option<Arguments>) -> Self {
        SpecNode {
            label: label.into(),
            origin: None,
            path: ResolvedPath::default(),
            content: NodeContent::Leaf { body, arguments },
        }
    }

    pub(crate) fn with_origin(mut self, origin: TableOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        match self.content {
            NodeContent::Container { .. } => NodeKind::Container,
            NodeContent::Leaf { .. } => NodeKind::Leaf,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind() == NodeKind::Leaf
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    /// Children in declaration order. Always empty for a leaf.
    pub fn children(&self) -> &[SpecNode] {
        match &self.content {
            NodeContent::Container { children } => children,
            NodeContent::Leaf { .. } => &[],
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub fn child_at(&self, index: usize) -> Option<&SpecNode> {
        self.children().get(index)
    }

    pub fn body(&self) -> Option<&UnitOfWork> {
        match &self.content {
            NodeContent::Leaf { body, .. } => Some(body),
            NodeContent::Container { .. } => None,
        }
    }

    pub fn arguments(&self) -> Option<&Arguments> {
        match &self.content {
            NodeContent::Leaf { arguments, .. } => arguments.as_ref(),
            NodeContent::Container { .. } => None,
        }
    }

    pub fn origin(&self) -> Option<&TableOrigin> {
        self.origin.as_ref()
    }

    pub fn path(&self) -> &ResolvedPath {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: ResolvedPath) {
        self.path = path;
    }

    pub(crate) fn children_mut(&mut self) -> &mut [SpecNode] {
        match &mut self.content {
            NodeContent::Container { children } => children,
            NodeContent::Leaf { .. } => &mut [],
        }
    }

    /// Number of leaves at or below this node.
    pub fn leaf_count(&self) -> usize {
        match &self.content {
            NodeContent::Leaf { .. } => 1,
            NodeContent::Container { children } => children.iter().map(SpecNode::leaf_count).sum(),
        }
    }
}

impl PartialEq for SpecNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.label == other.label
            && self.children() == other.children()
    }
}

/// The built, not yet resolved, forest of one declaration sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecTree {
    roots: Vec<SpecNode>,
}

impl SpecTree {
    pub fn new(roots: Vec<SpecNode>) -> Self {
        SpecTree { roots }
    }

    pub fn roots(&self) -> &[SpecNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.roots.iter().map(SpecNode::leaf_count).sum()
    }

    pub(crate) fn roots_mut(&mut self) -> &mut [SpecNode] {
        &mut self.roots
    }

    pub fn into_roots(self) -> Vec<SpecNode> {
        self.roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str) -> SpecNode {
        SpecNode::leaf(label, UnitOfWork::noop(), None)
    }

    #[test]
    fn test_leaf_has_no_children() {
        let node = leaf("works");
        assert!(node.is_leaf());
        assert_eq!(node.child_count(), 0);
        assert!(node.child_at(0).is_none());
        assert_eq!(node.leaf_count(), 1);
    }

    #[test]
    fn test_child_order_is_preserved() {
        let node = SpecNode::container("outer", vec![leaf("b"), leaf("a"), leaf("c")]);
        let labels: Vec<_> = node.children().iter().map(SpecNode::label).collect();
        assert_eq!(labels, ["b", "a", "c"]);
        assert_eq!(node.child_at(1).map(SpecNode::label), Some("a"));
    }

    #[test]
    fn test_structural_equality_ignores_bodies_and_arguments() {
        let a = SpecNode::container("x", vec![leaf("y")]);
        let b = SpecNode::container(
            "x",
            vec![SpecNode::leaf("y", UnitOfWork::new(|| panic!("never called")), Some(Arguments::new()))],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_structural_equality_sees_order_and_kind() {
        let a = SpecNode::container("x", vec![leaf("1"), leaf("2")]);
        let b = SpecNode::container("x", vec![leaf("2"), leaf("1")]);
        assert_ne!(a, b);
        assert_ne!(SpecNode::container("y", vec![]), leaf("y"));
    }

    #[test]
    fn test_unresolved_path_is_empty() {
        let node = leaf("z");
        assert!(!node.path().is_resolved());
        assert_eq!(node.path().as_str(), "");
        assert!(node.path().ancestors().is_empty());
    }
}
