//! # spectree: expands BDD-style spec declarations into a named test tree
//!
//! Declarations (`describe`, `context`, `when`, `it` and the two table
//! forms) go in, a tree of concrete test cases with a resolved path per node
//! comes out. No test body is ever run by the engine.
//!
//! ## Quick example
//!
//! ```rust
//! use spectree::{args, FromValue};
//!
//! let declarations = spectree::declare(|ctx| {
//!     ctx.describe("Math Operations", |ctx| {
//!         ctx.describe_table("Addition")
//!             .arity(3)
//!             .entry("1 + 1 = 2", args![1, 1, 2])
//!             .entry("2 + 3 = 5", args![2, 3, 5])
//!             .run(|args| {
//!                 let a = i64::from_value(&args[0]).unwrap();
//!                 let b = i64::from_value(&args[1]).unwrap();
//!                 assert_eq!(a + b, i64::from_value(&args[2]).unwrap());
//!             });
//!     });
//! });
//!
//! let tree = spectree::TreeBuilder::new().build(declarations).unwrap();
//! let tree = spectree::NameResolver::default().resolve(tree);
//! let paths: Vec<_> = tree.all_leaves().map(|leaf| leaf.path().to_string()).collect();
//! assert_eq!(paths, ["Math Operations > 1 + 1 = 2", "Math Operations > 2 + 3 = 5"]);
//! ```
//!
//! ## Front-ends
//!
//! - [`Context`] / [`declare`]: closure-based declarations.
//! - `declarations!` / `spec_tree!`: the macro DSL (feature `macros`, on by default).
//! - [`ginkgo`]: a static scanner for Go spec files written against Ginkgo v2.

mod builder;
mod context;
mod declaration;
mod error;
mod expander;
pub mod ginkgo;
mod model;
pub mod resolve;
pub mod table;
pub mod traverse;
mod value;

pub use builder::{Bindings, BuildReport, TreeBuilder};
pub use context::{declare, Context};
pub use declaration::Declaration;
pub use error::{Result, SpecError};
pub use expander::validate_arity;
pub use model::{NodeContent, NodeKind, ResolvedPath, SpecNode, SpecTree, TableOrigin, UnitOfWork};
pub use resolve::{NameResolver, ResolvedTree, ResolverConfig};
pub use table::{Entry, LeafMode, SubtreeBody, SubtreeMode, TableBody, TableBuilder, TableSpec};
pub use traverse::{LeafRef, Leaves};
pub use value::{Arguments, FromValue, Value};

/// Re-export of the DSL macros. Available with the `macros` feature.
#[cfg(feature = "macros")]
pub use spectree_macros::{declarations, spec_tree};

/// Build a tree from `declarations` and resolve it with the configured
/// separator (see [`ResolverConfig::from_env`]).
///
/// Fails with the first error of the build.
pub fn build_resolved(declarations: Vec<Declaration>) -> Result<ResolvedTree> {
    let tree = TreeBuilder::new().build(declarations)?;
    Ok(NameResolver::from_config(&ResolverConfig::from_env()).resolve(tree))
}

/// Build an [`Arguments`] list from values convertible into [`Value`].
///
/// ```rust
/// let args = spectree::args![1, "two", 3.0, true];
/// assert_eq!(args.len(), 4);
/// assert_eq!(args.to_string(), "1, two, 3, true");
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Arguments::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Arguments::from(vec![$($crate::Value::from($value)),+])
    };
}
