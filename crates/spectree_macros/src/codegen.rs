//! Code generation: transforms the DSL AST into `spectree::Declaration` values.

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::LitStr;

use crate::dsl::*;

// ============================================================================
// Public entry points
// ============================================================================

/// `Vec<spectree::Declaration>` for the whole input.
pub fn generate_declarations(list: &DeclarationList) -> TokenStream {
    let items = generate_items(&list.items, None);
    quote! {
        {
            let declarations: ::std::vec::Vec<::spectree::Declaration> = vec![#(#items),*];
            declarations
        }
    }
}

/// `spectree::Result<spectree::ResolvedTree>` for the whole input.
pub fn generate_spec_tree(list: &DeclarationList) -> TokenStream {
    let declarations = generate_declarations(list);
    quote! {
        ::spectree::build_resolved(#declarations)
    }
}

// ============================================================================
// Items
// ============================================================================

/// Parameters of the innermost enclosing subtree table. Leaves declared
/// under it receive that table's entry arguments and rebind them.
#[derive(Clone, Copy)]
struct Scope<'a> {
    table: &'a LitStr,
    params: &'a [TableParam],
}

fn args_ident() -> Ident {
    Ident::new("__spectree_args", Span::call_site())
}

fn generate_items(items: &[DslItem], scope: Option<Scope<'_>>) -> Vec<TokenStream> {
    items
        .iter()
        .map(|item| match item {
            DslItem::Container(block) => generate_container(block, scope),
            DslItem::Leaf(block) => generate_leaf(block, scope),
            DslItem::Table(block) => generate_table(block),
            DslItem::SubtreeTable(block) => generate_subtree_table(block),
        })
        .collect()
}

fn generate_container(block: &ContainerBlock, scope: Option<Scope<'_>>) -> TokenStream {
    let name = &block.name;
    let children = generate_items(&block.items, scope);
    quote! {
        ::spectree::Declaration::container(#name, vec![#(#children),*])
    }
}

fn generate_leaf(block: &LeafBlock, scope: Option<Scope<'_>>) -> TokenStream {
    let name = &block.name;
    let body = &block.body;
    let unit = match scope {
        None => quote! {
            ::spectree::UnitOfWork::new(|| { #body })
        },
        Some(scope) => {
            let args = args_ident();
            let bindings = generate_bindings(scope);
            quote! {
                ::spectree::UnitOfWork::with_args(|#args: &[::spectree::Value]| {
                    #(#bindings)*
                    #body
                })
            }
        }
    };
    quote! {
        ::spectree::Declaration::leaf(#name, #unit)
    }
}

// ============================================================================
// Tables
// ============================================================================

fn generate_table(block: &TableBlock) -> TokenStream {
    let name = &block.name;
    let body = &block.body;
    let args = args_ident();
    let bindings = generate_bindings(Scope {
        table: name,
        params: &block.params,
    });
    let arity = block.params.len();
    let entries = generate_entries(&block.entries);

    quote! {
        ::spectree::Declaration::Table(
            ::spectree::TableSpec::new(
                #name,
                ::spectree::TableBody::Leaves(::spectree::UnitOfWork::with_args(
                    |#args: &[::spectree::Value]| {
                        #(#bindings)*
                        #body
                    },
                )),
            )
            .with_arity(#arity)
            #(#entries)*
        )
    }
}

fn generate_subtree_table(block: &SubtreeTableBlock) -> TokenStream {
    let name = &block.name;
    let scope = Scope {
        table: name,
        params: &block.params,
    };
    let args = args_ident();
    let ctx = Ident::new("__spectree_ctx", Span::call_site());
    let bindings = generate_bindings(scope);
    let children = generate_items(&block.items, Some(scope));
    let arity = block.params.len();
    let entries = generate_entries(&block.entries);

    quote! {
        ::spectree::Declaration::Table(
            ::spectree::TableSpec::new(
                #name,
                ::spectree::TableBody::Subtree(::spectree::SubtreeBody::new(
                    |#args: &[::spectree::Value], #ctx: &mut ::spectree::Context| {
                        #(#bindings)*
                        let children: ::std::vec::Vec<::spectree::Declaration> = vec![#(#children),*];
                        #ctx.extend(children);
                    },
                )),
            )
            .with_arity(#arity)
            #(#entries)*
        )
    }
}

/// `.with_entry(...)` calls, one per row.
fn generate_entries(entries: &[TableEntry]) -> Vec<TokenStream> {
    entries
        .iter()
        .map(|entry| {
            let values = &entry.values;
            let arguments = quote! {
                {
                    let values: ::std::vec::Vec<::spectree::Value> =
                        ::std::vec![#(::spectree::Value::from(#values)),*];
                    ::spectree::Arguments::from(values)
                }
            };
            let constructor = match &entry.label {
                Some(label) => quote! { ::spectree::Entry::new(#label, #arguments) },
                None => quote! { ::spectree::Entry::unnamed(#arguments) },
            };
            quote! { .with_entry(#constructor) }
        })
        .collect()
}

/// `let name: Type = ...;` for each parameter, read from the bound arguments.
fn generate_bindings(scope: Scope<'_>) -> Vec<TokenStream> {
    let args = args_ident();
    let table = scope.table;
    scope
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let param_name = &param.name;
            let param_type = &param.ty;
            let shown_name = param_name.to_string();
            let shown_type = quote!(#param_type).to_string();
            quote! {
                #[allow(unused_variables)]
                let #param_name: #param_type =
                    <#param_type as ::spectree::FromValue>::from_value(&#args[#i])
                        .unwrap_or_else(|| panic!(
                            "table {:?}: argument {} (`{}`) is not a `{}`: {}",
                            #table, #i, #shown_name, #shown_type, #args[#i]
                        ));
            }
        })
        .collect()
}
