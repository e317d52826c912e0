//! Table-driven declarations: parameterized rows over one body.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::context::Context;
use crate::declaration::Declaration;
use crate::model::UnitOfWork;
use crate::value::{Arguments, Value};

/// One row of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub description: String,
    pub arguments: Arguments,
}

impl Entry {
    pub fn new(description: impl Into<String>, arguments: impl Into<Arguments>) -> Self {
        Entry {
            description: description.into(),
            arguments: arguments.into(),
        }
    }

    /// An entry without a description, described as `Entry: <arguments>`.
    pub fn unnamed(arguments: impl Into<Arguments>) -> Self {
        let arguments = arguments.into();
        Entry {
            description: format!("Entry: {arguments}"),
            arguments,
        }
    }
}

/// A body that declares a subtree for one entry's arguments.
#[derive(Clone)]
pub struct SubtreeBody(Arc<dyn Fn(&[Value], &mut Context) + Send + Sync>);

impl SubtreeBody {
    pub fn new(body: impl Fn(&[Value], &mut Context) + Send + Sync + 'static) -> Self {
        SubtreeBody(Arc::new(body))
    }

    /// A body that replays the same declarations for every entry.
    pub fn replay(template: Vec<Declaration>) -> Self {
        SubtreeBody::new(move |_, ctx| ctx.extend(template.iter().cloned()))
    }

    /// Record the subtree for `args` into `ctx`.
    pub fn declare(&self, args: &[Value], ctx: &mut Context) {
        (self.0)(args, ctx)
    }
}

impl fmt::Debug for SubtreeBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubtreeBody(..)")
    }
}

/// The unit of work of a table. The variant decides the expansion mode.
#[derive(Debug, Clone)]
pub enum TableBody {
    /// `DescribeTable`: one leaf per entry.
    Leaves(UnitOfWork),
    /// `DescribeTableSubtree`: one container per entry.
    Subtree(SubtreeBody),
}

/// A table construct prior to expansion.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub label: String,
    /// Parameter count of the body, `None` when it cannot be seen and has
    /// to be inferred from the entries.
    pub arity: Option<usize>,
    pub entries: Vec<Entry>,
    pub body: TableBody,
}

impl TableSpec {
    pub fn new(label: impl Into<String>, body: TableBody) -> Self {
        TableSpec {
            label: label.into(),
            arity: None,
            entries: Vec::new(),
            body,
        }
    }

    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn subtree_mode(&self) -> bool {
        matches!(self.body, TableBody::Subtree(_))
    }
}

// ============================================================================
// Fluent builder
// ============================================================================

/// Marker for [`Context::describe_table`] builders.
pub struct LeafMode;

/// Marker for [`Context::describe_table_subtree`] builders.
pub struct SubtreeMode;

/// Builder for table declarations, returned by [`Context::describe_table`]
/// and [`Context::describe_table_subtree`].
///
/// Nothing is recorded until `.run(...)` is called.
///
/// # Example
///
/// ```rust
/// use spectree::FromValue;
///
/// let decls = spectree::declare(|ctx| {
///     ctx.describe_table("Addition")
///         .arity(3)
///         .entry("1 + 1 = 2", spectree::args![1, 1, 2])
///         .entry("negative numbers", spectree::args![-1, -2, -3])
///         .run(|args| {
///             let sum = i64::from_value(&args[0]).unwrap() + i64::from_value(&args[1]).unwrap();
///             assert_eq!(Some(sum), i64::from_value(&args[2]));
///         });
/// });
/// assert_eq!(decls.len(), 1);
/// ```
#[must_use = "call .run(...) to declare the table"]
pub struct TableBuilder<'c, M> {
    ctx: &'c mut Context,
    label: String,
    arity: Option<usize>,
    entries: Vec<Entry>,
    mode: PhantomData<M>,
}

impl<'c, M> TableBuilder<'c, M> {
    pub(crate) fn new(ctx: &'c mut Context, label: String) -> Self {
        TableBuilder {
            ctx,
            label,
            arity: None,
            entries: Vec::new(),
            mode: PhantomData,
        }
    }

    /// Declare the number of parameters the body takes.
    ///
    /// Without it, arity is inferred from the entries.
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Add a described entry.
    pub fn entry(mut self, description: &str, arguments: impl Into<Arguments>) -> Self {
        self.entries.push(Entry::new(description, arguments));
        self
    }

    /// Add an entry described by its arguments.
    pub fn entry_unnamed(mut self, arguments: impl Into<Arguments>) -> Self {
        self.entries.push(Entry::unnamed(arguments));
        self
    }

    fn finish(self, body: TableBody) {
        let table = TableSpec {
            label: self.label,
            arity: self.arity,
            entries: self.entries,
            body,
        };
        self.ctx.add(Declaration::Table(table));
    }
}

impl TableBuilder<'_, LeafMode> {
    /// Record the table. The body receives one entry's arguments per leaf.
    pub fn run(self, body: impl Fn(&[Value]) + Send + Sync + 'static) {
        self.finish(TableBody::Leaves(UnitOfWork::with_args(body)));
    }
}

impl TableBuilder<'_, SubtreeMode> {
    /// Record the table. The body is called once per entry at build time
    /// and declares that entry's subtree into the given context.
    pub fn run(self, body: impl Fn(&[Value], &mut Context) + Send + Sync + 'static) {
        self.finish(TableBody::Subtree(SubtreeBody::new(body)));
    }
}
