//! Property-based tests for tree building and name resolution.

use proptest::prelude::*;

use spectree::{
    args, declare, Declaration, Entry, NameResolver, SubtreeBody, TableBody, TableSpec,
    TreeBuilder, UnitOfWork, Value,
};

/// Labels never contain the separator used below.
fn label_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.-]{0,12}"
}

fn separator_strategy() -> impl Strategy<Value = String> {
    "( > | / |::|>)"
}

/// `labels[0] { labels[1] { ... { it leaf } } }`
fn chain(labels: &[String], leaf: &str) -> Vec<Declaration> {
    match labels.split_first() {
        None => vec![Declaration::leaf(leaf, UnitOfWork::noop())],
        Some((first, rest)) => vec![Declaration::container(first.clone(), chain(rest, leaf))],
    }
}

proptest! {
    #[test]
    fn prop_leaf_path_has_one_segment_per_level(
        labels in prop::collection::vec(label_strategy(), 0..12),
        leaf in label_strategy(),
        separator in separator_strategy(),
    ) {
        let tree = TreeBuilder::new().build(chain(&labels, &leaf)).unwrap();
        let resolved = NameResolver::new(separator.clone()).resolve(tree);

        let only = resolved.all_leaves().next().unwrap();
        prop_assert_eq!(only.path().depth(), labels.len() + 1);

        let mut expected = labels.clone();
        expected.push(leaf.clone());
        prop_assert_eq!(only.path().segments(), expected.as_slice());
        prop_assert_eq!(only.path().as_str(), expected.join(&separator));
    }

    #[test]
    fn prop_leaf_table_yields_one_leaf_per_entry(
        rows in prop::collection::vec((any::<i64>(), label_strategy()), 0..20),
    ) {
        let mut table = TableSpec::new("table", TableBody::Leaves(UnitOfWork::noop())).with_arity(2);
        for (i, (n, s)) in rows.iter().enumerate() {
            table = table.with_entry(Entry::new(format!("row {i}"), args![*n, s.as_str()]));
        }
        let tree = TreeBuilder::new()
            .build(vec![Declaration::container("parent", vec![Declaration::Table(table)])])
            .unwrap();
        let resolved = NameResolver::default().resolve(tree);

        prop_assert_eq!(resolved.count(), rows.len());
        for (leaf, (n, s)) in resolved.all_leaves().zip(&rows) {
            let bound = leaf.arguments().unwrap();
            prop_assert_eq!(&bound[0], &Value::Int(*n));
            prop_assert_eq!(&bound[1], &Value::Str(s.clone()));
            prop_assert_eq!(leaf.path().depth(), 2);
        }
    }

    #[test]
    fn prop_subtree_table_yields_n_containers_of_k_leaves(
        entries in 0usize..12,
        leaves_per_entry in 0usize..6,
    ) {
        let body = SubtreeBody::new(move |_, ctx| {
            for k in 0..leaves_per_entry {
                ctx.it(&format!("leaf {k}"), || {});
            }
        });
        let mut table = TableSpec::new("subtree", TableBody::Subtree(body)).with_arity(1);
        for i in 0..entries {
            table = table.with_entry(Entry::new(format!("entry {i}"), args![i as i64]));
        }
        let tree = TreeBuilder::new().build(vec![Declaration::Table(table)]).unwrap();
        let resolved = NameResolver::default().resolve(tree);

        prop_assert_eq!(resolved.roots().len(), entries);
        prop_assert!(resolved.roots().iter().all(|c| c.child_count() == leaves_per_entry));
        prop_assert_eq!(resolved.count(), entries * leaves_per_entry);
        for (i, container) in resolved.roots().iter().enumerate() {
            let expected = args![i as i64];
            for leaf in container.children() {
                prop_assert_eq!(leaf.arguments(), Some(&expected));
            }
        }
    }

    #[test]
    fn prop_resolution_is_idempotent_and_traversal_restartable(
        labels in prop::collection::vec(label_strategy(), 1..6),
        separator in separator_strategy(),
    ) {
        let decls = declare(|ctx| {
            for (i, label) in labels.iter().enumerate() {
                ctx.describe(label, |ctx| {
                    for j in 0..=i {
                        ctx.it(&format!("case {j}"), || {});
                    }
                });
            }
        });
        let resolver = NameResolver::new(separator);
        let once = resolver.resolve(TreeBuilder::new().build(decls).unwrap());
        let twice = resolver.resolve(once.clone().into_tree());

        let first: Vec<_> = once.all_leaves().map(|l| l.path().clone()).collect();
        let again: Vec<_> = once.all_leaves().map(|l| l.path().clone()).collect();
        let resolved_again: Vec<_> = twice.all_leaves().map(|l| l.path().clone()).collect();
        prop_assert_eq!(&first, &again);
        prop_assert_eq!(&first, &resolved_again);
        prop_assert_eq!(first.len(), labels.len() * (labels.len() + 1) / 2);
    }
}
