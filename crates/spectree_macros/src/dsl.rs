//! DSL AST types and `syn::parse::Parse` implementations.

use proc_macro2::TokenStream;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{braced, bracketed, parenthesized, Expr, Ident, LitStr, Result, Token, Type};

// ============================================================================
// AST types
// ============================================================================

/// Top-level input: a list of DSL items.
#[derive(Debug)]
pub struct DeclarationList {
    pub items: Vec<DslItem>,
}

/// A single DSL node.
#[derive(Debug)]
pub enum DslItem {
    Container(ContainerBlock),
    Leaf(LeafBlock),
    Table(TableBlock),
    SubtreeTable(SubtreeTableBlock),
}

/// `describe "name" { ... }` / `context "name" { ... }` / `when "name" { ... }`
#[derive(Debug)]
pub struct ContainerBlock {
    pub name: LitStr,
    pub items: Vec<DslItem>,
}

/// `it "name" { ... }` / `specify "name" { ... }`
#[derive(Debug)]
pub struct LeafBlock {
    pub name: LitStr,
    pub body: TokenStream,
}

/// `describe_table "name" (a: Type, ...) [ "row" (v1, ...), ... ] { body }`
#[derive(Debug)]
pub struct TableBlock {
    pub name: LitStr,
    pub params: Vec<TableParam>,
    pub entries: Vec<TableEntry>,
    pub body: TokenStream,
}

/// `describe_table_subtree "name" (a: Type, ...) [ ... ] { items... }`
#[derive(Debug)]
pub struct SubtreeTableBlock {
    pub name: LitStr,
    pub params: Vec<TableParam>,
    pub entries: Vec<TableEntry>,
    pub items: Vec<DslItem>,
}

/// A single parameter declaration of a table.
#[derive(Debug)]
pub struct TableParam {
    pub name: Ident,
    pub ty: Type,
}

/// A single entry (row) of a table. Rows without a label are described
/// from their arguments.
#[derive(Debug)]
pub struct TableEntry {
    pub label: Option<LitStr>,
    pub values: Vec<Expr>,
}

// ============================================================================
// Parsing
// ============================================================================

impl Parse for DeclarationList {
    fn parse(input: ParseStream) -> Result<Self> {
        let items = parse_items(input)?;
        Ok(DeclarationList { items })
    }
}

/// Parse a sequence of DSL items until the stream is exhausted.
fn parse_items(input: ParseStream) -> Result<Vec<DslItem>> {
    let mut items = Vec::new();
    while !input.is_empty() {
        items.push(input.parse::<DslItem>()?);
    }
    Ok(items)
}

impl Parse for DslItem {
    fn parse(input: ParseStream) -> Result<Self> {
        let ident: Ident = input.parse()?;
        let name = ident.to_string();

        match name.as_str() {
            "describe" | "context" | "when" => Ok(DslItem::Container(parse_container(input)?)),
            "it" | "specify" => Ok(DslItem::Leaf(parse_leaf(input)?)),
            "describe_table" => Ok(DslItem::Table(parse_table(input)?)),
            "describe_table_subtree" => Ok(DslItem::SubtreeTable(parse_subtree_table(input)?)),
            _ => Err(syn::Error::new(
                ident.span(),
                format!(
                    "unknown DSL keyword `{name}`. Expected one of: \
                     describe, context, when, it, specify, describe_table, \
                     describe_table_subtree"
                ),
            )),
        }
    }
}

// ============================================================================
// Block parsers
// ============================================================================

/// Parse: `"name" { items... }`
fn parse_container(input: ParseStream) -> Result<ContainerBlock> {
    let name: LitStr = input.parse()?;
    let content;
    braced!(content in input);
    let items = parse_items(&content)?;
    Ok(ContainerBlock { name, items })
}

/// Parse: `"name" { body }`
fn parse_leaf(input: ParseStream) -> Result<LeafBlock> {
    let name: LitStr = input.parse()?;
    let content;
    braced!(content in input);
    let body: TokenStream = content.parse()?;
    Ok(LeafBlock { name, body })
}

/// Parse: `"name" (params) [entries] { body }`
fn parse_table(input: ParseStream) -> Result<TableBlock> {
    let name: LitStr = input.parse()?;
    let params = parse_params(input)?;
    let entries = parse_entries(input)?;

    let content;
    braced!(content in input);
    let body: TokenStream = content.parse()?;

    Ok(TableBlock {
        name,
        params,
        entries,
        body,
    })
}

/// Parse: `"name" (params) [entries] { items... }`
fn parse_subtree_table(input: ParseStream) -> Result<SubtreeTableBlock> {
    let name: LitStr = input.parse()?;
    let params = parse_params(input)?;
    let entries = parse_entries(input)?;

    let content;
    braced!(content in input);
    let items = parse_items(&content)?;

    Ok(SubtreeTableBlock {
        name,
        params,
        entries,
        items,
    })
}

/// Parse: `(a: Type, b: Type, ...)`
fn parse_params(input: ParseStream) -> Result<Vec<TableParam>> {
    let content;
    parenthesized!(content in input);
    let mut params = Vec::new();
    while !content.is_empty() {
        let name: Ident = content.parse()?;
        content.parse::<Token![:]>()?;
        let ty: Type = content.parse()?;
        params.push(TableParam { name, ty });
        if !content.is_empty() {
            content.parse::<Token![,]>()?;
        }
    }
    Ok(params)
}

/// Parse: `[ "label" (v1, v2), (v3, v4), ... ]`
fn parse_entries(input: ParseStream) -> Result<Vec<TableEntry>> {
    let content;
    bracketed!(content in input);
    let mut entries = Vec::new();
    while !content.is_empty() {
        let label = if content.peek(LitStr) {
            Some(content.parse::<LitStr>()?)
        } else {
            None
        };
        let values_content;
        parenthesized!(values_content in content);
        let values = Punctuated::<Expr, Token![,]>::parse_terminated(&values_content)?
            .into_iter()
            .collect();
        entries.push(TableEntry { label, values });
        if !content.is_empty() {
            content.parse::<Token![,]>()?;
        }
    }
    Ok(entries)
}
