//! Proc macros for the `spectree` declaration DSL.

mod codegen;
mod dsl;

/// Declare a spec tree with a BDD-style DSL.
///
/// Expands to a `Vec<spectree::Declaration>`, ready for
/// `spectree::TreeBuilder`. Test bodies are wrapped as opaque units of work
/// and never run by the macro or the builder.
///
/// # Example
///
/// ```text
/// let declarations = spectree::declarations! {
///     describe "Math Operations" {
///         describe_table "Addition" (a: i64, b: i64, expected: i64) [
///             "1 + 1 = 2" (1, 1, 2),
///             "2 + 3 = 5" (2, 3, 5),
///             (-1, -2, -3),
///         ] {
///             assert_eq!(a + b, expected);
///         }
///     }
/// };
/// ```
///
/// # Supported DSL keywords
///
/// ## Containers
/// - `describe "name" { ... }` / `context "name" { ... }` / `when "name" { ... }`
///
/// ## Specs
/// - `it "name" { ... }` / `specify "name" { ... }`
///
/// ## Table-driven specs
/// - `describe_table "name" (a: T, ...) [ rows ] { body }`: one spec per row.
/// - `describe_table_subtree "name" (a: T, ...) [ rows ] { items }`: one
///   container per row holding `items`.
///
/// A row is `"description" (v1, v2, ...)` or just `(v1, v2, ...)`, in which
/// case it is described as `Entry: v1, v2, ...`. Parameters are read from the
/// row with `spectree::FromValue`; the table's arity is the parameter count.
/// Specs inside a subtree table see the subtree's parameters. A table nested
/// in a subtree sees only its own parameters in its body, though its rows may
/// use the outer ones.
#[proc_macro]
pub fn declarations(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let list = syn::parse_macro_input!(input as dsl::DeclarationList);
    codegen::generate_declarations(&list).into()
}

/// Declare, build and resolve a spec tree in one step.
///
/// Same DSL as [`declarations!`]; expands to
/// `spectree::Result<spectree::ResolvedTree>`, resolved with the separator
/// from `SPECTREE_PATH_SEPARATOR` (default `" > "`).
///
/// ```text
/// let tree = spectree::spec_tree! {
///     describe "Calculator" {
///         it "adds" { assert_eq!(2 + 3, 5); }
///     }
/// }?;
/// assert_eq!(tree.count(), 1);
/// ```
#[proc_macro]
pub fn spec_tree(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let list = syn::parse_macro_input!(input as dsl::DeclarationList);
    codegen::generate_spec_tree(&list).into()
}
