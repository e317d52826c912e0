//! Go tokenizer, just enough to find spec declarations and read literals.

use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delim {
    Paren,
    Brace,
    Bracket,
}

impl Delim {
    fn open_char(self) -> char {
        match self {
            Delim::Paren => '(',
            Delim::Brace => '{',
            Delim::Bracket => '[',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident,
    Int,
    Float,
    /// Interpreted or raw string, already decoded.
    Str(String),
    Rune(char),
    Open(Delim),
    Close(Delim),
    Comma,
    Ellipsis,
    /// Any other operator or punctuation character.
    Punct(char),
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte range in the source.
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    /// For delimiters, the index of the matching delimiter.
    pub partner: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

struct Lexer<'s> {
    source: &'s str,
    chars: Peekable<CharIndices<'s>>,
    line: usize,
    column: usize,
}

/// Tokenize `source` and pair up its delimiters.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer {
        source,
        chars: source.char_indices().peekable(),
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    pair_delimiters(&mut tokens)?;
    Ok(tokens)
}

fn pair_delimiters(tokens: &mut [Token]) -> Result<(), LexError> {
    let mut open: Vec<(usize, Delim)> = Vec::new();
    for i in 0..tokens.len() {
        match tokens[i].kind {
            TokenKind::Open(delim) => open.push((i, delim)),
            TokenKind::Close(delim) => match open.pop() {
                Some((j, opened)) if opened == delim => {
                    tokens[i].partner = Some(j);
                    tokens[j].partner = Some(i);
                }
                Some((j, opened)) => {
                    return Err(LexError {
                        line: tokens[i].line,
                        column: tokens[i].column,
                        message: format!(
                            "mismatched delimiter: '{}' opened at {}:{} is closed here",
                            opened.open_char(),
                            tokens[j].line,
                            tokens[j].column
                        ),
                    });
                }
                None => {
                    return Err(LexError {
                        line: tokens[i].line,
                        column: tokens[i].column,
                        message: "unbalanced closing delimiter".to_string(),
                    });
                }
            },
            _ => {}
        }
    }
    match open.pop() {
        Some((j, delim)) => Err(LexError {
            line: tokens[j].line,
            column: tokens[j].column,
            message: format!("unclosed '{}'", delim.open_char()),
        }),
        None => Ok(()),
    }
}

impl<'s> Lexer<'s> {
    fn bump(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> LexError {
        LexError {
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some((_, '*')) if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error(line, column, "unterminated block comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let Some((start, c)) = self.bump() else {
            return Ok(None);
        };

        let kind = match c {
            '(' => TokenKind::Open(Delim::Paren),
            '{' => TokenKind::Open(Delim::Brace),
            '[' => TokenKind::Open(Delim::Bracket),
            ')' => TokenKind::Close(Delim::Paren),
            '}' => TokenKind::Close(Delim::Brace),
            ']' => TokenKind::Close(Delim::Bracket),
            ',' => TokenKind::Comma,
            '"' => TokenKind::Str(self.interpreted_string(line, column)?),
            '`' => TokenKind::Str(self.raw_string(line, column)?),
            '\'' => TokenKind::Rune(self.rune(line, column)?),
            '.' if self.peek() == Some('.') && self.peek_second() == Some('.') => {
                self.bump();
                self.bump();
                TokenKind::Ellipsis
            }
            '.' if self.peek().is_some_and(|n| n.is_ascii_digit()) => self.number(c),
            c if c.is_ascii_digit() => self.number(c),
            c if c == '_' || c.is_alphabetic() => {
                while self.peek().is_some_and(|n| n == '_' || n.is_alphanumeric()) {
                    self.bump();
                }
                TokenKind::Ident
            }
            other => TokenKind::Punct(other),
        };

        let end = self.offset();
        Ok(Some(Token {
            kind,
            start,
            end,
            line,
            column,
            partner: None,
        }))
    }

    fn number(&mut self, first: char) -> TokenKind {
        let hex = first == '0' && matches!(self.peek(), Some('x' | 'X'));
        let mut float = first == '.';
        let mut prev = first;
        while let Some(c) = self.peek() {
            let exponent = if hex { matches!(prev, 'p' | 'P') } else { matches!(prev, 'e' | 'E') };
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                if c == '.' {
                    float = true;
                }
                if exponent || (!hex && matches!(c, 'e' | 'E')) || (hex && matches!(c, 'p' | 'P')) {
                    float = true;
                }
            } else if exponent && matches!(c, '+' | '-') {
                float = true;
            } else {
                break;
            }
            prev = c;
            self.bump();
        }
        if float {
            TokenKind::Float
        } else {
            TokenKind::Int
        }
    }

    fn interpreted_string(&mut self, line: usize, column: usize) -> Result<String, LexError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some((_, '"')) => return Ok(value),
                Some((_, '\\')) => value.push(self.escape(line, column, '"')?),
                Some((_, '\n')) | None => return Err(self.error(line, column, "unterminated string literal")),
                Some((_, c)) => value.push(c),
            }
        }
    }

    fn raw_string(&mut self, line: usize, column: usize) -> Result<String, LexError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some((_, '`')) => return Ok(value),
                Some((_, '\r')) => {}
                Some((_, c)) => value.push(c),
                None => return Err(self.error(line, column, "unterminated raw string literal")),
            }
        }
    }

    fn rune(&mut self, line: usize, column: usize) -> Result<char, LexError> {
        let value = match self.bump() {
            Some((_, '\\')) => self.escape(line, column, '\'')?,
            Some((_, '\'')) | Some((_, '\n')) | None => {
                return Err(self.error(line, column, "malformed rune literal"));
            }
            Some((_, c)) => c,
        };
        match self.bump() {
            Some((_, '\'')) => Ok(value),
            _ => Err(self.error(line, column, "malformed rune literal")),
        }
    }

    fn escape(&mut self, line: usize, column: usize, quote: char) -> Result<char, LexError> {
        let Some((_, c)) = self.bump() else {
            return Err(self.error(line, column, "unterminated escape sequence"));
        };
        let simple = match c {
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{0B}'),
            '\\' => Some('\\'),
            c if c == quote => Some(c),
            _ => None,
        };
        if let Some(decoded) = simple {
            return Ok(decoded);
        }
        let (digits, radix) = match c {
            'x' => (2, 16),
            'u' => (4, 16),
            'U' => (8, 16),
            '0'..='7' => (2, 8),
            _ => return Err(self.error(line, column, format!("unknown escape sequence '\\{c}'"))),
        };
        let mut code = if radix == 8 { c.to_digit(8).unwrap_or(0) } else { 0 };
        for _ in 0..digits {
            let digit = self
                .bump()
                .and_then(|(_, d)| d.to_digit(radix))
                .ok_or_else(|| self.error(line, column, "malformed escape sequence"))?;
            code = code * radix + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error(line, column, "escape is not a valid code point"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_call_with_string_and_numbers() {
        assert_eq!(
            kinds(r#"Entry("1 + 1 = 2", -1, 2.5)"#),
            vec![
                TokenKind::Ident,
                TokenKind::Open(Delim::Paren),
                TokenKind::Str("1 + 1 = 2".to_string()),
                TokenKind::Comma,
                TokenKind::Punct('-'),
                TokenKind::Int,
                TokenKind::Comma,
                TokenKind::Float,
                TokenKind::Close(Delim::Paren),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// It(\"hidden\")\n/* Describe(\"also hidden\") */ x";
        assert_eq!(kinds(source), vec![TokenKind::Ident]);
    }

    #[test]
    fn test_string_escapes_and_raw_strings() {
        assert_eq!(
            kinds(r#""a\tb\"c\x41é" `raw\n`"#),
            vec![
                TokenKind::Str("a\tb\"cA\u{e9}".to_string()),
                TokenKind::Str("raw\\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_runes_and_ellipsis() {
        assert_eq!(
            kinds(r"'a' '\n' args..."),
            vec![
                TokenKind::Rune('a'),
                TokenKind::Rune('\n'),
                TokenKind::Ident,
                TokenKind::Ellipsis,
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            kinds("0x1F 1_000 1e9 1e-3 .5 0755"),
            vec![
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Int,
            ]
        );
    }

    #[test]
    fn test_delimiters_are_paired() {
        let tokens = tokenize("f(a, {b}[c])").unwrap();
        assert_eq!(tokens[1].partner, Some(tokens.len() - 1));
        assert_eq!(tokens[4].partner, Some(6));
    }

    #[test]
    fn test_positions_are_tracked() {
        let tokens = tokenize("a\n  b").unwrap();
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
        assert_eq!(tokens[1].start, 4);
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let err = tokenize("It(\"oops\n)").unwrap_err();
        assert_eq!((err.line, err.column), (1, 4));
        assert_eq!(err.message, "unterminated string literal");
    }

    #[test]
    fn test_unbalanced_delimiters_are_errors() {
        assert_eq!(tokenize("f(").unwrap_err().message, "unclosed '('");
        assert_eq!(tokenize("f)").unwrap_err().message, "unbalanced closing delimiter");
        assert!(tokenize("f(]").unwrap_err().message.starts_with("mismatched delimiter"));
    }
}
