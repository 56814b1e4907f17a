use super::{Keyword, LexOutput, Token, TokenKind};
use crate::diagnostics::{DiagnosticSink, FileId, Span};

pub(super) fn run(source: &str) -> LexOutput {
    run_with_file(source, FileId::UNKNOWN)
}

pub(super) fn run_with_file(source: &str, file_id: FileId) -> LexOutput {
    let mut lexer = Lexer::new(source, file_id);
    lexer.lex_all();
    lexer.finish()
}

pub(super) struct Lexer<'a> {
    source: &'a str,
    iter: core::str::CharIndices<'a>,
    lookahead: Option<(usize, char)>,
    tokens: Vec<Token>,
    diagnostics: DiagnosticSink,
    file_id: FileId,
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

impl<'a> Lexer<'a> {
    #[must_use]
    fn new(source: &'a str, file_id: FileId) -> Self {
        let mut iter = source.char_indices();
        let lookahead = iter.next();
        Self {
            source,
            iter,
            lookahead,
            tokens: Vec::new(),
            diagnostics: DiagnosticSink::new("LEX"),
            file_id,
        }
    }

    fn finish(self) -> LexOutput {
        let Lexer {
            tokens,
            diagnostics,
            file_id,
            ..
        } = self;
        LexOutput {
            tokens,
            diagnostics: diagnostics.into_vec(),
            file_id,
        }
    }

    fn lex_all(&mut self) {
        while let Some((start, ch)) = self.lookahead {
            match ch {
                c if c.is_whitespace() => {
                    self.bump();
                }
                c if is_identifier_start(c) => {
                    self.consume_identifier(start);
                }
                c if c.is_ascii_digit() => {
                    self.consume_number(start);
                }
                '"' => {
                    self.consume_string_literal(start);
                }
                '\'' => {
                    self.consume_char_literal(start);
                }
                '/' => {
                    self.consume_slash(start);
                }
                '.' => {
                    if self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                        self.consume_number(start);
                    } else if self.peek_next() == Some('.') && self.peek_at(2) == Some('.') {
                        self.bump();
                        self.bump();
                        self.bump();
                        self.emit(start, start + 3, TokenKind::Operator("..."));
                    } else {
                        self.emit_single(start, ch, TokenKind::Punctuation(ch));
                        self.bump();
                    }
                }
                ':' => {
                    if self.peek_next() == Some(':') {
                        self.bump();
                        self.bump();
                        self.emit(start, start + 2, TokenKind::Operator("::"));
                    } else {
                        self.emit_single(start, ch, TokenKind::Punctuation(ch));
                        self.bump();
                    }
                }
                '{' | '}' | '(' | ')' | '[' | ']' | ';' | ',' | '?' | '@' => {
                    self.emit_single(start, ch, TokenKind::Punctuation(ch));
                    self.bump();
                }
                '=' | '+' | '-' | '*' | '%' | '!' | '<' | '>' | '&' | '|' | '^' | '~' => {
                    self.consume_operator(start, ch);
                }
                _ => {
                    self.emit_single(start, ch, TokenKind::Unknown(ch));
                    self.bump();
                }
            }
        }
    }

    fn bump(&mut self) {
        self.lookahead = self.iter.next();
    }

    fn peek_next(&self) -> Option<char> {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        let (idx, _) = self.lookahead?;
        let mut chars = self.source[idx..].chars();
        chars.nth(offset)
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        &self.source[start..end]
    }

    fn emit(&mut self, start: usize, end: usize, kind: TokenKind) {
        self.tokens.push(Token {
            kind,
            lexeme: self.slice(start, end).to_string(),
            span: Span::in_file(self.file_id, start, end),
        });
    }

    fn emit_single(&mut self, start: usize, ch: char, kind: TokenKind) {
        let end = start + ch.len_utf8();
        self.tokens.push(Token {
            kind,
            lexeme: ch.to_string(),
            span: Span::in_file(self.file_id, start, end),
        });
    }

    fn consume_identifier(&mut self, start: usize) {
        let mut end = start;
        while let Some((idx, ch)) = self.lookahead {
            if is_identifier_continue(ch) {
                end = idx + ch.len_utf8();
                self.bump();
            } else {
                break;
            }
        }
        let text = self.slice(start, end);
        let kind = match Keyword::from_ident(text) {
            Some(keyword) => keyword.token_kind(),
            None => TokenKind::Identifier,
        };
        self.emit(start, end, kind);
    }

    fn consume_number(&mut self, start: usize) {
        // Hex and binary literals: digits then an optional integer suffix.
        if self.current_char() == Some('0')
            && matches!(self.peek_next(), Some('x' | 'X' | 'b' | 'B'))
        {
            self.bump();
            self.bump();
            self.eat_while(|ch| ch.is_ascii_hexdigit() || ch == '_');
            self.eat_if(|ch| matches!(ch, 'l' | 'L'));
            self.emit(start, self.current_offset(), TokenKind::NumberLiteral);
            return;
        }

        self.eat_while(|ch| ch.is_ascii_digit() || ch == '_');
        if self.current_char() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.bump();
            self.eat_while(|ch| ch.is_ascii_digit() || ch == '_');
        }
        if matches!(self.current_char(), Some('e' | 'E')) {
            let after_sign = match self.peek_next() {
                Some('+' | '-') => self.peek_at(2),
                other => other,
            };
            if after_sign.is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                if matches!(self.current_char(), Some('+' | '-')) {
                    self.bump();
                }
                self.eat_while(|ch| ch.is_ascii_digit() || ch == '_');
            }
        }
        self.eat_if(|ch| matches!(ch, 'f' | 'F' | 'd' | 'D' | 'l' | 'L'));
        self.emit(start, self.current_offset(), TokenKind::NumberLiteral);
    }

    fn current_char(&self) -> Option<char> {
        self.lookahead.map(|(_, ch)| ch)
    }

    fn eat_while(&mut self, accept: impl Fn(char) -> bool) {
        while let Some((_, ch)) = self.lookahead {
            if accept(ch) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn eat_if(&mut self, accept: impl Fn(char) -> bool) {
        if let Some((_, ch)) = self.lookahead {
            if accept(ch) {
                self.bump();
            }
        }
    }

    fn consume_string_literal(&mut self, start: usize) {
        // Text block: three quotes up front.
        if self.peek_next() == Some('"') && self.peek_at(2) == Some('"') {
            self.consume_text_block(start);
            return;
        }
        self.bump();
        while let Some((idx, ch)) = self.lookahead {
            match ch {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '"' => {
                    let end = idx + 1;
                    self.bump();
                    self.emit(start, end, TokenKind::StringLiteral);
                    return;
                }
                '\n' => break,
                _ => self.bump(),
            }
        }
        let end = self.current_offset();
        self.diagnostics.push_error(
            "unterminated string literal",
            Some(Span::in_file(self.file_id, start, end)),
        );
        self.emit(start, end, TokenKind::StringLiteral);
    }

    fn consume_text_block(&mut self, start: usize) {
        self.bump();
        self.bump();
        self.bump();
        while let Some((idx, ch)) = self.lookahead {
            if ch == '"' && self.peek_next() == Some('"') && self.peek_at(2) == Some('"') {
                self.bump();
                self.bump();
                self.bump();
                self.emit(start, idx + 3, TokenKind::StringLiteral);
                return;
            }
            self.bump();
        }
        let end = self.current_offset();
        self.diagnostics.push_error(
            "unterminated text block",
            Some(Span::in_file(self.file_id, start, end)),
        );
        self.emit(start, end, TokenKind::StringLiteral);
    }

    fn consume_char_literal(&mut self, start: usize) {
        self.bump();
        while let Some((idx, ch)) = self.lookahead {
            match ch {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '\'' => {
                    let end = idx + 1;
                    self.bump();
                    self.emit(start, end, TokenKind::CharLiteral);
                    return;
                }
                '\n' => break,
                _ => self.bump(),
            }
        }
        let end = self.current_offset();
        self.diagnostics.push_error(
            "unterminated character literal",
            Some(Span::in_file(self.file_id, start, end)),
        );
        self.emit(start, end, TokenKind::CharLiteral);
    }

    fn consume_slash(&mut self, start: usize) {
        match self.peek_next() {
            Some('/') => {
                while let Some((_, ch)) = self.lookahead {
                    if ch == '\n' {
                        break;
                    }
                    self.bump();
                }
            }
            Some('*') => {
                self.bump();
                self.bump();
                let mut closed = false;
                while let Some((_, ch)) = self.lookahead {
                    if ch == '*' && self.peek_next() == Some('/') {
                        self.bump();
                        self.bump();
                        closed = true;
                        break;
                    }
                    self.bump();
                }
                if !closed {
                    let end = self.current_offset();
                    self.diagnostics.push_error(
                        "unterminated block comment",
                        Some(Span::in_file(self.file_id, start, end)),
                    );
                }
            }
            Some('=') => {
                self.bump();
                self.bump();
                self.emit(start, start + 2, TokenKind::Operator("/="));
            }
            _ => {
                self.bump();
                self.emit(start, start + 1, TokenKind::Operator("/"));
            }
        }
    }

    fn consume_operator(&mut self, start: usize, first: char) {
        // Longest match per leading character. `>` never fuses into `>>`
        // so nested generic closers parse cleanly; the expression parser
        // reassembles shifts from adjacent tokens.
        let second = self.peek_next();
        let third = self.peek_at(2);
        let (symbol, len): (&'static str, usize) = match (first, second, third) {
            ('=', Some('='), _) => ("==", 2),
            ('=', _, _) => ("=", 1),
            ('+', Some('+'), _) => ("++", 2),
            ('+', Some('='), _) => ("+=", 2),
            ('+', _, _) => ("+", 1),
            ('-', Some('-'), _) => ("--", 2),
            ('-', Some('='), _) => ("-=", 2),
            ('-', Some('>'), _) => ("->", 2),
            ('-', _, _) => ("-", 1),
            ('*', Some('='), _) => ("*=", 2),
            ('*', _, _) => ("*", 1),
            ('%', Some('='), _) => ("%=", 2),
            ('%', _, _) => ("%", 1),
            ('!', Some('='), _) => ("!=", 2),
            ('!', _, _) => ("!", 1),
            ('<', Some('<'), Some('=')) => ("<<=", 3),
            ('<', Some('<'), _) => ("<<", 2),
            ('<', Some('='), _) => ("<=", 2),
            ('<', _, _) => ("<", 1),
            ('>', Some('='), _) => (">=", 2),
            ('>', _, _) => (">", 1),
            ('&', Some('&'), _) => ("&&", 2),
            ('&', Some('='), _) => ("&=", 2),
            ('&', _, _) => ("&", 1),
            ('|', Some('|'), _) => ("||", 2),
            ('|', Some('='), _) => ("|=", 2),
            ('|', _, _) => ("|", 1),
            ('^', Some('='), _) => ("^=", 2),
            ('^', _, _) => ("^", 1),
            ('~', _, _) => ("~", 1),
            _ => {
                self.emit_single(start, first, TokenKind::Unknown(first));
                self.bump();
                return;
            }
        };
        for _ in 0..len {
            self.bump();
        }
        self.emit(start, start + symbol.len(), TokenKind::Operator(symbol));
    }

    fn current_offset(&self) -> usize {
        self.lookahead
            .map(|(idx, _)| idx)
            .unwrap_or(self.source.len())
    }
}
