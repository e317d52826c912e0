//! Table expansion.
//!
//! A leaf-mode table becomes one leaf per entry, spliced into the parent. A
//! subtree-mode table becomes one container per entry, whose children come
//! from calling the subtree body with that entry's arguments and building
//! what it declares.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::debug;

use crate::builder::{Bindings, TreeBuilder};
use crate::context::Context;
use crate::declaration::Declaration;
use crate::error::{Result, SpecError};
use crate::model::{SpecNode, TableOrigin};
use crate::table::{SubtreeBody, TableBody, TableSpec};
use crate::value::Arguments;

/// Check every entry against the table's arity before anything is expanded.
///
/// With a known arity, the first entry of a different length is an
/// [`SpecError::ArityMismatch`]. With an unknown arity, all entries must
/// agree with the first one.
pub fn validate_arity(table: &TableSpec) -> Result<()> {
    match table.arity {
        Some(expected) => {
            let mismatch = table
                .entries
                .iter()
                .enumerate()
                .find(|(_, entry)| entry.arguments.len() != expected);
            if let Some((index, entry)) = mismatch {
                return Err(SpecError::ArityMismatch {
                    table: table.label.clone(),
                    index,
                    expected,
                    found: entry.arguments.len(),
                });
            }
        }
        None => {
            let Some(first) = table.entries.first() else {
                return Ok(());
            };
            let expected = first.arguments.len();
            let mismatch = table
                .entries
                .iter()
                .enumerate()
                .find(|(_, entry)| entry.arguments.len() != expected);
            if let Some((index, entry)) = mismatch {
                return Err(SpecError::structural(
                    format!("table \"{}\"", table.label),
                    format!(
                        "entries have heterogeneous arity: entry 0 supplies {expected} argument(s), entry {index} supplies {}",
                        entry.arguments.len()
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Expand one table into the nodes that replace it.
///
/// Either every entry is expanded or none is. Errors raised by tables nested
/// inside a subtree entry are pushed to `errors` and only drop that nested
/// table.
pub(crate) fn expand(
    builder: &TreeBuilder,
    table: TableSpec,
    errors: &mut Vec<SpecError>,
) -> Result<Vec<SpecNode>> {
    validate_arity(&table)?;
    debug!(
        table = %table.label,
        entries = table.entries.len(),
        subtree = table.subtree_mode(),
        "expanding table"
    );

    let TableSpec {
        label,
        entries,
        body,
        ..
    } = table;

    match body {
        TableBody::Leaves(unit) => Ok(entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                SpecNode::leaf(entry.description, unit.clone(), Some(entry.arguments)).with_origin(
                    TableOrigin {
                        table: label.clone(),
                        entry: index,
                    },
                )
            })
            .collect()),
        TableBody::Subtree(subtree) => {
            let mut nodes = Vec::with_capacity(entries.len());
            let mut nested_errors = Vec::new();

            for (index, entry) in entries.into_iter().enumerate() {
                let declarations = declare_subtree(&subtree, &entry.arguments).map_err(|message| {
                    SpecError::SubtreeBodyPanicked {
                        table: label.clone(),
                        index,
                        message,
                    }
                })?;
                let children = builder.build_sequence(
                    declarations,
                    Bindings::bound(&entry.arguments),
                    &mut nested_errors,
                );
                nodes.push(SpecNode::container(entry.description, children).with_origin(
                    TableOrigin {
                        table: label.clone(),
                        entry: index,
                    },
                ));
            }

            errors.append(&mut nested_errors);
            Ok(nodes)
        }
    }
}

/// Run a subtree body for one entry in a fresh context.
fn declare_subtree(
    body: &SubtreeBody,
    arguments: &Arguments,
) -> std::result::Result<Vec<Declaration>, String> {
    let mut ctx = Context::new();
    catch_unwind(AssertUnwindSafe(|| body.declare(arguments, &mut ctx)))
        .map_err(|payload| panic_message(payload.as_ref()))?;
    Ok(ctx.into_declarations())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::model::UnitOfWork;
    use crate::table::Entry;
    use crate::value::FromValue;

    fn expand_one(table: TableSpec) -> (Result<Vec<SpecNode>>, Vec<SpecError>) {
        let mut errors = Vec::new();
        let result = expand(&TreeBuilder::new(), table, &mut errors);
        (result, errors)
    }

    fn addition() -> TableSpec {
        TableSpec::new("Addition", TableBody::Leaves(UnitOfWork::noop()))
            .with_arity(3)
            .with_entry(Entry::new("1 + 1 = 2", args![1, 1, 2]))
            .with_entry(Entry::new("2 + 3 = 5", args![2, 3, 5]))
            .with_entry(Entry::new("negative numbers", args![-1, -2, -3]))
    }

    #[test]
    fn test_leaf_mode_one_leaf_per_entry() {
        let (result, errors) = expand_one(addition());
        let nodes = result.unwrap();
        assert!(errors.is_empty());
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(SpecNode::is_leaf));
        assert_eq!(nodes[2].label(), "negative numbers");
        assert_eq!(nodes[2].arguments(), Some(&args![-1, -2, -3]));
        assert_eq!(
            nodes[1].origin(),
            Some(&TableOrigin {
                table: "Addition".to_string(),
                entry: 1
            })
        );
    }

    #[test]
    fn test_leaf_mode_shares_one_body() {
        let nodes = expand_one(addition()).0.unwrap();
        let first = nodes[0].body().unwrap();
        assert!(nodes.iter().all(|n| n.body().unwrap().ptr_eq(first)));
    }

    #[test]
    fn test_subtree_mode_one_container_per_entry() {
        let table = TableSpec::new(
            "Math Operations",
            TableBody::Subtree(SubtreeBody::new(|_, ctx| {
                ctx.it("adds correctly", || {});
                ctx.it("subtracts correctly", || {});
            })),
        )
        .with_arity(3)
        .with_entry(Entry::new("small numbers", args![1, 2, 3]))
        .with_entry(Entry::new("large numbers", args![100, 200, 300]));

        let nodes = expand_one(table).0.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].label(), "large numbers");
        assert_eq!(nodes[1].child_count(), 2);
        assert_eq!(nodes[1].child_at(0).unwrap().arguments(), Some(&args![100, 200, 300]));
    }

    #[test]
    fn test_subtree_body_sees_entry_arguments() {
        let table = TableSpec::new(
            "dynamic",
            TableBody::Subtree(SubtreeBody::new(|args, ctx| {
                let n = usize::from_value(&args[0]).unwrap();
                for i in 0..n {
                    ctx.it(&format!("case {i}"), || {});
                }
            })),
        )
        .with_entry(Entry::new("none", args![0]))
        .with_entry(Entry::new("two", args![2]));

        let nodes = expand_one(table).0.unwrap();
        assert_eq!(nodes[0].child_count(), 0);
        assert!(!nodes[0].is_leaf());
        assert_eq!(nodes[1].child_count(), 2);
    }

    #[test]
    fn test_arity_mismatch_reports_first_offending_entry() {
        let table = addition().with_entry(Entry::new("short", args![1, 2]));
        let (result, _) = expand_one(table);
        match result {
            Err(SpecError::ArityMismatch {
                table,
                index,
                expected,
                found,
            }) => {
                assert_eq!(table, "Addition");
                assert_eq!((index, expected, found), (3, 3, 2));
            }
            other => panic!("expected an arity mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_arity_requires_uniform_entries() {
        let table = TableSpec::new("inferred", TableBody::Leaves(UnitOfWork::noop()))
            .with_entry(Entry::new("a", args![1, 2]))
            .with_entry(Entry::new("b", args![1]));
        let (result, _) = expand_one(table);
        assert!(matches!(result, Err(SpecError::Structural { .. })));
    }

    #[test]
    fn test_empty_table_expands_to_nothing() {
        let table = TableSpec::new("empty", TableBody::Leaves(UnitOfWork::noop())).with_arity(2);
        assert!(expand_one(table).0.unwrap().is_empty());
    }

    #[test]
    fn test_panicking_subtree_body_drops_whole_table() {
        let table = TableSpec::new(
            "fragile",
            TableBody::Subtree(SubtreeBody::new(|args, ctx| {
                ctx.it("fine", || {});
                if i64::from_value(&args[0]) == Some(2) {
                    panic!("bad entry");
                }
            })),
        )
        .with_entry(Entry::new("one", args![1]))
        .with_entry(Entry::new("two", args![2]));

        match expand_one(table).0 {
            Err(SpecError::SubtreeBodyPanicked { index, message, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(message, "bad entry");
            }
            other => panic!("expected a panic report, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_table_error_stays_local() {
        let table = TableSpec::new(
            "outer",
            TableBody::Subtree(SubtreeBody::new(|_, ctx| {
                ctx.it("kept", || {});
                ctx.describe_table("inner").arity(2).entry("bad", args![1]).run(|_| {});
            })),
        )
        .with_entry(Entry::new("only", args![1]));

        let (result, errors) = expand_one(table);
        let nodes = result.unwrap();
        assert_eq!(nodes[0].child_count(), 1);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SpecError::ArityMismatch { ref table, .. } if table == "inner"));
    }
}
