//! Recognizes Ginkgo DSL calls in a token stream.

use tracing::{debug, trace};

use super::lexer::{Delim, Token, TokenKind};
use crate::declaration::Declaration;
use crate::model::UnitOfWork;
use crate::table::{Entry, SubtreeBody, TableBody, TableSpec};
use crate::value::{Arguments, Value};

const CONTAINERS: &[&str] = &["Describe", "Context", "When"];
const LEAVES: &[&str] = &["It", "Specify"];
const TABLES: &[&str] = &["DescribeTable"];
const SUBTREE_TABLES: &[&str] = &["DescribeTableSubtree"];
const ENTRIES: &[&str] = &["Entry"];

/// Ginkgo decorators. They may appear among call arguments and are never
/// labels, bodies or entry parameters.
const DECORATORS: &[&str] = &[
    "Label",
    "Offset",
    "FlakeAttempts",
    "MustPassRepeatedly",
    "NodeTimeout",
    "SpecTimeout",
    "GracePeriod",
    "Serial",
    "Ordered",
    "ContinueOnFailure",
    "OncePerOrdered",
    "Focus",
    "Pending",
    "SuppressProgressReporting",
    "PollProgressAfter",
    "PollProgressInterval",
    "EntryDescription",
];

/// `Describe`, `FDescribe`, `PDescribe` and `XDescribe` all name the same
/// kind of node. Focus and pending markers are not modelled.
fn base_name(name: &str) -> &str {
    match name.strip_prefix(['F', 'P', 'X']) {
        Some(rest) if rest.starts_with(char::is_uppercase) => rest,
        _ => name,
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// A `func(params) results { body }` literal.
struct FuncLit {
    /// Tokens strictly inside the parameter parens.
    params: Span,
    /// Tokens strictly inside the body braces.
    body: Span,
}

pub(crate) struct Parser<'s> {
    source: &'s str,
    tokens: &'s [Token],
}

impl<'s> Parser<'s> {
    pub(crate) fn new(source: &'s str, tokens: &'s [Token]) -> Self {
        Parser { source, tokens }
    }

    pub(crate) fn parse_file(&self) -> Vec<Declaration> {
        self.scan(Span {
            start: 0,
            end: self.tokens.len(),
        })
    }

    /// Collect the DSL calls in `span`, in source order. Anything else is
    /// stepped over token by token, so calls nested in ordinary Go code
    /// (an `if`, a helper call) are still found.
    fn scan(&self, span: Span) -> Vec<Declaration> {
        let mut declarations = Vec::new();
        let mut i = span.start;

        while i < span.end {
            let Some((name, open)) = self.call_at(i, span.end) else {
                i += 1;
                continue;
            };
            let close = self.partner(open);
            let args = self.split_args(Span {
                start: open + 1,
                end: close,
            });
            let base = base_name(name);

            if CONTAINERS.contains(&base) {
                declarations.push(self.container(&args));
            } else if LEAVES.contains(&base) {
                declarations.push(self.leaf(&args));
            } else if TABLES.contains(&base) {
                declarations.push(self.table(&args, false));
            } else if SUBTREE_TABLES.contains(&base) {
                declarations.push(self.table(&args, true));
            } else if ENTRIES.contains(&base) {
                let token = &self.tokens[i];
                debug!(line = token.line, column = token.column, "ignoring Entry outside a table");
            } else {
                i += 1;
                continue;
            }
            i = close + 1;
        }

        declarations
    }

    /// `Name(` at `i`, possibly qualified as `pkg.Name(`.
    fn call_at(&self, i: usize, end: usize) -> Option<(&'s str, usize)> {
        let token = self.tokens.get(i)?;
        if token.kind != TokenKind::Ident || i + 1 >= end {
            return None;
        }
        let name = self.text(i);
        let base = base_name(name);
        let known = [CONTAINERS, LEAVES, TABLES, SUBTREE_TABLES, ENTRIES]
            .iter()
            .any(|group| group.contains(&base));
        if !known
            || self.tokens[i + 1].kind != TokenKind::Open(Delim::Paren)
            || self.declares_function(i)
        {
            return None;
        }
        Some((name, i + 1))
    }

    /// `func It(` or `func (s *Suite) It(`: a helper declaration, not a call.
    fn declares_function(&self, i: usize) -> bool {
        let Some(prev) = i.checked_sub(1) else {
            return false;
        };
        match self.tokens[prev].kind {
            TokenKind::Ident => self.text(prev) == "func",
            TokenKind::Close(Delim::Paren) => {
                let open = self.partner(prev);
                open > 0 && self.tokens[open - 1].kind == TokenKind::Ident && self.text(open - 1) == "func"
            }
            _ => false,
        }
    }

    // ---- Declarations --------------------------------------------------------

    fn container(&self, args: &[Span]) -> Declaration {
        let label = self.label(args.first());
        let body = args
            .iter()
            .skip(1)
            .find_map(|arg| self.func_lit(*arg))
            .map(|func| self.scan(func.body))
            .unwrap_or_default();
        trace!(label = %label, children = body.len(), "container");
        Declaration::container(label, body)
    }

    fn leaf(&self, args: &[Span]) -> Declaration {
        let label = self.label(args.first());
        trace!(label = %label, "leaf");
        Declaration::leaf(label, UnitOfWork::noop())
    }

    fn table(&self, args: &[Span], subtree: bool) -> Declaration {
        let label = self.label(args.first());
        let rest = args.get(1..).unwrap_or_default();

        let func = rest.iter().find_map(|arg| self.func_lit(*arg));
        let arity = func.as_ref().and_then(|f| self.arity(f.params));

        let entries: Vec<Entry> = rest.iter().filter_map(|arg| self.entry(*arg)).collect();

        let body = if subtree {
            let template = func.map(|f| self.scan(f.body)).unwrap_or_default();
            TableBody::Subtree(SubtreeBody::replay(template))
        } else {
            TableBody::Leaves(UnitOfWork::noop())
        };

        trace!(label = %label, entries = entries.len(), subtree, "table");
        Declaration::Table(TableSpec {
            label,
            arity,
            entries,
            body,
        })
    }

    /// An `Entry(description, args...)` call spanning the whole argument.
    fn entry(&self, arg: Span) -> Option<Entry> {
        let (name, open) = self.call_at(arg.start, arg.end)?;
        let close = self.partner(open);
        if !ENTRIES.contains(&base_name(name)) || close + 1 != arg.end {
            return None;
        }
        let args = self.split_args(Span {
            start: open + 1,
            end: close,
        });
        let (description, params) = args.split_first()?;

        let arguments: Arguments = params
            .iter()
            .filter(|param| !self.is_decorator(**param))
            .map(|param| self.value(*param))
            .collect();

        Some(match self.value(*description) {
            Value::Nil => Entry::unnamed(arguments),
            Value::Str(text) | Value::Expr(text) => Entry::new(text, arguments),
            other => Entry::new(other.to_string(), arguments),
        })
    }

    // ---- Argument helpers ----------------------------------------------------

    fn label(&self, arg: Option<&Span>) -> String {
        match arg.map(|a| self.value(*a)) {
            Some(Value::Str(text)) | Some(Value::Expr(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Parameter count of a func literal, `None` when variadic. A leading
    /// `SpecContext` or `context.Context` is supplied by Ginkgo, not by
    /// entries, and is not counted.
    fn arity(&self, params: Span) -> Option<usize> {
        let pieces = self.split_args(params);
        let variadic = (params.start..params.end).any(|i| self.tokens[i].kind == TokenKind::Ellipsis);
        if variadic {
            return None;
        }
        let interruptible = pieces.first().is_some_and(|first| self.is_context_param(*first));
        Some(pieces.len() - usize::from(interruptible))
    }

    /// `ctx SpecContext`, `ctx ginkgo.SpecContext` or `ctx context.Context`.
    fn is_context_param(&self, param: Span) -> bool {
        if param.len() < 2 {
            return false;
        }
        let ty: String = (param.start + 1..param.end).map(|i| self.text(i)).collect();
        ty == "SpecContext" || ty.ends_with(".SpecContext") || ty == "context.Context"
    }

    fn func_lit(&self, arg: Span) -> Option<FuncLit> {
        if arg.len() < 4 || self.text(arg.start) != "func" {
            return None;
        }
        let params_open = arg.start + 1;
        if self.tokens[params_open].kind != TokenKind::Open(Delim::Paren) {
            return None;
        }
        let params_close = self.partner(params_open);
        let body_close = arg.end - 1;
        if self.tokens[body_close].kind != TokenKind::Close(Delim::Brace) {
            return None;
        }
        let body_open = self.partner(body_close);
        if body_open <= params_close {
            return None;
        }
        Some(FuncLit {
            params: Span {
                start: params_open + 1,
                end: params_close,
            },
            body: Span {
                start: body_open + 1,
                end: body_close,
            },
        })
    }

    fn is_decorator(&self, arg: Span) -> bool {
        if arg.is_empty() || self.tokens[arg.start].kind != TokenKind::Ident {
            return false;
        }
        let name = self.text(arg.start);
        if !DECORATORS.contains(&name) {
            return false;
        }
        // A bare marker (`Serial`) or a call spanning the argument (`Label("x")`).
        arg.len() == 1
            || (self.tokens[arg.start + 1].kind == TokenKind::Open(Delim::Paren)
                && self.partner(arg.start + 1) + 1 == arg.end)
    }

    /// Read an argument as a literal, falling back to its source text.
    fn value(&self, arg: Span) -> Value {
        let tokens = &self.tokens[arg.start..arg.end];
        match tokens {
            [] => Value::Expr(String::new()),
            [single] => self.literal(single, false).unwrap_or_else(|| self.raw(arg)),
            [sign, number] if matches!(sign.kind, TokenKind::Punct('-' | '+')) => {
                let negative = sign.kind == TokenKind::Punct('-');
                self.literal(number, negative)
                    .filter(|v| matches!(v, Value::Int(_) | Value::Float(_)))
                    .unwrap_or_else(|| self.raw(arg))
            }
            _ => self.concatenation(tokens).unwrap_or_else(|| self.raw(arg)),
        }
    }

    fn literal(&self, token: &Token, negative: bool) -> Option<Value> {
        let text = &self.source[token.start..token.end];
        match &token.kind {
            TokenKind::Int => parse_int(text).map(|n| Value::Int(if negative { -n } else { n })),
            TokenKind::Float => text
                .replace('_', "")
                .parse::<f64>()
                .ok()
                .map(|x| Value::Float(if negative { -x } else { x })),
            TokenKind::Str(s) => Some(Value::Str(s.clone())),
            TokenKind::Rune(c) => Some(Value::Int(i64::from(u32::from(*c)))),
            TokenKind::Ident => match text {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                "nil" => Some(Value::Nil),
                _ => None,
            },
            _ => None,
        }
    }

    /// `"a" + "b" + ...`, folded into one string.
    fn concatenation(&self, tokens: &[Token]) -> Option<Value> {
        let mut folded = String::new();
        for (i, token) in tokens.iter().enumerate() {
            match (&token.kind, i % 2) {
                (TokenKind::Str(s), 0) => folded.push_str(s),
                (TokenKind::Punct('+'), 1) => {}
                _ => return None,
            }
        }
        (tokens.len() % 2 == 1).then_some(Value::Str(folded))
    }

    fn raw(&self, arg: Span) -> Value {
        let start = self.tokens[arg.start].start;
        let end = self.tokens[arg.end - 1].end;
        Value::Expr(self.source[start..end].to_string())
    }

    /// Split `span` at top-level commas. A trailing comma adds no argument.
    fn split_args(&self, span: Span) -> Vec<Span> {
        let mut args = Vec::new();
        let mut start = span.start;
        let mut i = span.start;
        while i < span.end {
            match self.tokens[i].kind {
                TokenKind::Open(_) => i = self.partner(i),
                TokenKind::Comma => {
                    args.push(Span { start, end: i });
                    start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        if start < span.end {
            args.push(Span { start, end: span.end });
        }
        args
    }

    fn partner(&self, i: usize) -> usize {
        self.tokens[i].partner.unwrap_or(i)
    }

    fn text(&self, i: usize) -> &'s str {
        let token = &self.tokens[i];
        &self.source[token.start..token.end]
    }
}

/// Go integer literal: decimal, `0x`, `0o`, `0b`, legacy octal, `_` separators.
fn parse_int(text: &str) -> Option<i64> {
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        i64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}
