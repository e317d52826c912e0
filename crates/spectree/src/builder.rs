//! Tree builder: declaration sequences in, expanded spec trees out.

use tracing::{instrument, trace, warn};

use crate::declaration::Declaration;
use crate::error::{Result, SpecError};
use crate::expander;
use crate::model::{SpecNode, SpecTree};
use crate::value::Arguments;

/// The arguments bound while building one declaration sequence.
///
/// Empty at the top level. A subtree table builds each entry's declarations
/// under that entry's arguments, and every leaf built there records them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings<'a> {
    arguments: Option<&'a Arguments>,
}

impl<'a> Bindings<'a> {
    pub fn empty() -> Self {
        Bindings { arguments: None }
    }

    pub fn bound(arguments: &'a Arguments) -> Self {
        Bindings {
            arguments: Some(arguments),
        }
    }

    pub fn arguments(&self) -> Option<&'a Arguments> {
        self.arguments
    }
}

/// The outcome of a build: everything that could be built, plus the errors
/// of the tables that were dropped.
#[derive(Debug)]
pub struct BuildReport {
    tree: SpecTree,
    errors: Vec<SpecError>,
}

impl BuildReport {
    pub fn tree(&self) -> &SpecTree {
        &self.tree
    }

    pub fn errors(&self) -> &[SpecError] {
        &self.errors
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_parts(self) -> (SpecTree, Vec<SpecError>) {
        (self.tree, self.errors)
    }

    /// The tree if nothing was dropped, otherwise the first error.
    pub fn into_result(self) -> Result<SpecTree> {
        match self.errors.into_iter().next() {
            None => Ok(self.tree),
            Some(err) => Err(err),
        }
    }
}

/// Builds a [`SpecTree`] from raw declarations.
///
/// Declaration order is kept exactly: nothing is reordered, deduplicated or
/// sorted. Tables are expanded in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder
    }

    /// Build everything that can be built and collect the errors of the
    /// tables that could not.
    #[instrument(level = "debug", skip_all, fields(declarations = declarations.len()))]
    pub fn build_report(&self, declarations: Vec<Declaration>) -> BuildReport {
        let mut errors = Vec::new();
        let roots = self.build_sequence(declarations, Bindings::empty(), &mut errors);
        BuildReport {
            tree: SpecTree::new(roots),
            errors,
        }
    }

    /// Build the tree, failing on the first dropped table.
    pub fn build(&self, declarations: Vec<Declaration>) -> Result<SpecTree> {
        self.build_report(declarations).into_result()
    }

    /// Recurses once per nesting level, so depth is bounded by the stack.
    pub(crate) fn build_sequence(
        &self,
        declarations: Vec<Declaration>,
        bindings: Bindings<'_>,
        errors: &mut Vec<SpecError>,
    ) -> Vec<SpecNode> {
        let mut nodes = Vec::with_capacity(declarations.len());

        for declaration in declarations {
            match declaration {
                Declaration::Container { label, body } => {
                    let children = self.build_sequence(body, bindings, errors);
                    trace!(label = %label, children = children.len(), "container");
                    nodes.push(SpecNode::container(label, children));
                }
                Declaration::Leaf { label, body } => {
                    trace!(label = %label, "leaf");
                    nodes.push(SpecNode::leaf(label, body, bindings.arguments().cloned()));
                }
                Declaration::Table(table) => match expander::expand(self, table, errors) {
                    Ok(expanded) => nodes.extend(expanded),
                    Err(err) => {
                        warn!(error = %err, "dropping table");
                        errors.push(err);
                    }
                },
            }
        }

        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, UnitOfWork};
    use crate::table::{Entry, TableBody, TableSpec};
    use crate::{args, declare};

    fn labels(nodes: &[SpecNode]) -> Vec<&str> {
        nodes.iter().map(SpecNode::label).collect()
    }

    #[test]
    fn test_builds_nested_containers() {
        let decls = declare(|ctx| {
            ctx.describe("Nested Structures", |ctx| {
                ctx.context("outer context", |ctx| {
                    ctx.it("test in outer", || {});
                    ctx.when("something happens", |ctx| {
                        ctx.it("test in when", || {});
                        ctx.context("inner context", |ctx| {
                            ctx.it("test in inner", || {});
                        });
                    });
                });
            });
        });

        let tree = TreeBuilder::new().build(decls).unwrap();
        assert_eq!(tree.leaf_count(), 3);
        let outer = tree.roots()[0].child_at(0).unwrap();
        assert_eq!(labels(outer.children()), ["test in outer", "something happens"]);
        assert_eq!(outer.child_at(1).unwrap().kind(), NodeKind::Container);
    }

    #[test]
    fn test_table_leaves_are_spliced_between_siblings() {
        let decls = declare(|ctx| {
            ctx.describe("math", |ctx| {
                ctx.it("before", || {});
                ctx.describe_table("Addition")
                    .arity(3)
                    .entry("1 + 1 = 2", args![1, 1, 2])
                    .entry("2 + 3 = 5", args![2, 3, 5])
                    .run(|_| {});
                ctx.it("after", || {});
            });
        });

        let tree = TreeBuilder::new().build(decls).unwrap();
        let math = &tree.roots()[0];
        assert_eq!(labels(math.children()), ["before", "1 + 1 = 2", "2 + 3 = 5", "after"]);
        assert!(math.children().iter().all(SpecNode::is_leaf));
        assert_eq!(math.child_at(0).unwrap().arguments(), None);
        assert_eq!(math.child_at(2).unwrap().arguments(), Some(&args![2, 3, 5]));
    }

    #[test]
    fn test_failing_table_does_not_abort_siblings() {
        let decls = declare(|ctx| {
            ctx.describe("suite", |ctx| {
                ctx.describe_table("broken")
                    .arity(3)
                    .entry("ok", args![1, 2, 3])
                    .entry("short", args![1, 2])
                    .run(|_| {});
                ctx.it("sibling", || {});
            });
            ctx.it("top level", || {});
        });

        let report = TreeBuilder::new().build_report(decls);
        assert!(!report.is_ok());
        assert_eq!(report.errors().len(), 1);
        assert!(matches!(
            report.errors()[0],
            SpecError::ArityMismatch { index: 1, expected: 3, found: 2, .. }
        ));
        assert_eq!(report.tree().leaf_count(), 2);
        assert_eq!(labels(report.tree().roots()[0].children()), ["sibling"]);
    }

    #[test]
    fn test_build_fails_with_first_error() {
        let table = TableSpec::new("Addition", TableBody::Leaves(UnitOfWork::noop()))
            .with_arity(3)
            .with_entry(Entry::new("two args", args![1, 2]));
        let err = TreeBuilder::new().build(vec![table.into()]).unwrap_err();
        assert!(matches!(err, SpecError::ArityMismatch { .. }));
    }

    #[test]
    fn test_leaves_record_bindings() {
        let bound = args![7];
        let mut errors = Vec::new();
        let nodes = TreeBuilder::new().build_sequence(
            vec![Declaration::leaf("bound", UnitOfWork::noop())],
            Bindings::bound(&bound),
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(nodes[0].arguments(), Some(&bound));
    }

    #[test]
    fn test_deep_nesting_builds_and_resolves() {
        const DEPTH: usize = 500;
        let mut decls = vec![Declaration::leaf("bottom", UnitOfWork::noop())];
        for level in (0..DEPTH).rev() {
            decls = vec![Declaration::container(format!("level {level}"), decls)];
        }

        let tree = TreeBuilder::new().build(decls).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        let resolved = crate::NameResolver::new("/").resolve(tree);
        let leaf = resolved.all_leaves().next().unwrap();
        assert_eq!(leaf.path().depth(), DEPTH + 1);
        assert!(leaf.path().as_str().starts_with("level 0/level 1/"));
        assert!(leaf.path().as_str().ends_with("/level 499/bottom"));
    }

    #[test]
    fn test_empty_sequence_builds_empty_tree() {
        let tree = TreeBuilder::new().build(Vec::new()).unwrap();
        assert!(tree.is_empty());
    }
}
