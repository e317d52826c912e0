//! Read-only traversal of a resolved tree.
//!
//! Leaves come out in declaration order, depth first. Every call walks the
//! tree from the start, so iterating twice yields the same sequence.

use std::fmt;
use std::iter::FusedIterator;
use std::slice;

use crate::model::{NodeContent, ResolvedPath, SpecNode, TableOrigin, UnitOfWork};
use crate::resolve::ResolvedTree;
use crate::value::Arguments;

/// A leaf as seen by an execution or reporting collaborator.
#[derive(Debug, Clone, Copy)]
pub struct LeafRef<'a> {
    node: &'a SpecNode,
    body: &'a UnitOfWork,
    arguments: Option<&'a Arguments>,
}

impl<'a> LeafRef<'a> {
    pub fn label(&self) -> &'a str {
        self.node.label()
    }

    pub fn path(&self) -> &'a ResolvedPath {
        self.node.path()
    }

    /// Entry arguments, when the leaf was produced inside a table.
    pub fn arguments(&self) -> Option<&'a Arguments> {
        self.arguments
    }

    pub fn origin(&self) -> Option<&'a TableOrigin> {
        self.node.origin()
    }

    pub fn body(&self) -> &'a UnitOfWork {
        self.body
    }

    pub fn node(&self) -> &'a SpecNode {
        self.node
    }

    /// Call the body with the bound arguments, or none.
    pub fn invoke(&self) {
        match self.arguments {
            Some(args) => self.body.call(args),
            None => self.body.call(&[]),
        }
    }
}

/// Depth-first iterator over the leaves of a forest.
pub struct Leaves<'a> {
    stack: Vec<slice::Iter<'a, SpecNode>>,
}

impl<'a> Leaves<'a> {
    pub fn new(roots: &'a [SpecNode]) -> Self {
        Leaves {
            stack: vec![roots.iter()],
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = LeafRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                None => {
                    self.stack.pop();
                }
                Some(node) => match node.content() {
                    NodeContent::Leaf { body, arguments } => {
                        return Some(LeafRef {
                            node,
                            body,
                            arguments: arguments.as_ref(),
                        });
                    }
                    NodeContent::Container { children } => self.stack.push(children.iter()),
                },
            }
        }
    }
}

impl FusedIterator for Leaves<'_> {}

impl ResolvedTree {
    /// All leaves in declaration order.
    pub fn all_leaves(&self) -> Leaves<'_> {
        Leaves::new(self.roots())
    }

    /// Total number of leaves.
    pub fn count(&self) -> usize {
        self.all_leaves().count()
    }

    /// Leaves with at least one proper ancestor labelled exactly `label`.
    pub fn filter_by_ancestor_label<'a>(
        &'a self,
        label: &'a str,
    ) -> impl Iterator<Item = LeafRef<'a>> + 'a {
        self.all_leaves()
            .filter(move |leaf| leaf.path().ancestors().iter().any(|a| a == label))
    }

    /// Leaves whose full path contains `pattern`, ignoring case.
    pub fn filter_by_path<'a>(&'a self, pattern: &str) -> impl Iterator<Item = LeafRef<'a>> + 'a {
        let pattern = pattern.to_lowercase();
        self.all_leaves()
            .filter(move |leaf| leaf.path().as_str().to_lowercase().contains(&pattern))
    }
}

/// One resolved leaf path per line.
impl fmt::Display for ResolvedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for leaf in self.all_leaves() {
            writeln!(f, "{}", leaf.path())?;
        }
        Ok(())
    }
}
