//! Closure-based declaration API: `Context` and `declare()`.

use crate::declaration::Declaration;
use crate::model::UnitOfWork;
use crate::table::{LeafMode, SubtreeMode, TableBuilder};
use crate::value::Value;

/// Records declarations for one block.
///
/// Every nested block gets its own `Context`, so a body only ever sees the
/// declarations of its own scope. Nothing is shared between sibling blocks
/// or between entries of a subtree table.
///
/// # Example
/// ```rust
/// let decls = spectree::declare(|ctx| {
///     ctx.describe("Calculator", |ctx| {
///         ctx.it("adds", || assert_eq!(2 + 3, 5));
///         ctx.when("dividing", |ctx| {
///             ctx.it("divides evenly", || assert_eq!(10 / 2, 5));
///         });
///     });
/// });
/// assert_eq!(decls.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Context {
    declarations: Vec<Declaration>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    // ---- Describe / Context / When -------------------------------------------

    pub fn describe(&mut self, label: &str, body: impl FnOnce(&mut Context)) {
        let mut child = Context::new();
        body(&mut child);
        self.add(Declaration::container(label, child.declarations));
    }

    pub fn context(&mut self, label: &str, body: impl FnOnce(&mut Context)) {
        self.describe(label, body);
    }

    pub fn when(&mut self, label: &str, body: impl FnOnce(&mut Context)) {
        self.describe(label, body);
    }

    // ---- It / Specify --------------------------------------------------------

    pub fn it(&mut self, label: &str, body: impl Fn() + Send + Sync + 'static) {
        self.add(Declaration::leaf(label, UnitOfWork::new(body)));
    }

    pub fn specify(&mut self, label: &str, body: impl Fn() + Send + Sync + 'static) {
        self.it(label, body);
    }

    /// Like [`it`](Self::it), but the body receives the arguments bound to
    /// the leaf. Inside a subtree table these are the entry's arguments;
    /// elsewhere the slice is empty.
    pub fn it_with_args(&mut self, label: &str, body: impl Fn(&[Value]) + Send + Sync + 'static) {
        self.add(Declaration::leaf(label, UnitOfWork::with_args(body)));
    }

    // ---- Table-driven --------------------------------------------------------

    /// Start a table whose entries each become one leaf.
    pub fn describe_table(&mut self, label: &str) -> TableBuilder<'_, LeafMode> {
        TableBuilder::new(self, label.to_string())
    }

    /// Start a table whose entries each become a container, filled by
    /// calling the body with that entry's arguments.
    ///
    /// ```rust
    /// let decls = spectree::declare(|ctx| {
    ///     ctx.describe_table_subtree("Math Operations")
    ///         .arity(3)
    ///         .entry("small numbers", spectree::args![1, 2, 3])
    ///         .entry("large numbers", spectree::args![100, 200, 300])
    ///         .run(|_args, ctx| {
    ///             ctx.it("adds correctly", || {});
    ///             ctx.it("subtracts correctly", || {});
    ///         });
    /// });
    /// assert_eq!(decls.len(), 1);
    /// ```
    pub fn describe_table_subtree(&mut self, label: &str) -> TableBuilder<'_, SubtreeMode> {
        TableBuilder::new(self, label.to_string())
    }

    // ---- Raw access ----------------------------------------------------------

    pub fn add(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    pub fn extend(&mut self, declarations: impl IntoIterator<Item = Declaration>) {
        self.declarations.extend(declarations);
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn into_declarations(self) -> Vec<Declaration> {
        self.declarations
    }
}

/// Record a declaration sequence with the closure API.
pub fn declare(body: impl FnOnce(&mut Context)) -> Vec<Declaration> {
    let mut ctx = Context::new();
    body(&mut ctx);
    ctx.into_declarations()
}
