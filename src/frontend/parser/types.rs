//! Type expression parsing plus the speculative scanner used to
//! disambiguate declarations, casts, and generic argument lists.

use super::core::is_identifier_token;
use super::*;

parser_impl! {
    pub(super) fn parse_type_expr(&mut self) -> Option<TypeExpr> {
        let start = self.current_start();
        let annotations = self.consume_annotations();

        if let Some(token) = self.peek() {
            if let TokenKind::Keyword(keyword) = token.kind {
                if keyword.is_primitive_type() {
                    let name = token.lexeme.clone();
                    self.advance();
                    let array_dims = self.consume_array_dims();
                    return Some(TypeExpr {
                        primitive: Some(name),
                        array_dims,
                        annotations,
                        span: self.make_span(start),
                        ..TypeExpr::default()
                    });
                }
            }
        }

        let first = self.consume_identifier("expected type name")?;
        let mut segments = vec![first];
        let mut type_args = Vec::new();
        loop {
            if self.check_operator("<") {
                match self.parse_type_args() {
                    Some(args) => type_args.extend(args),
                    None => return None,
                }
            }
            if self.check_punctuation('.') && self.peek_n(1).is_some_and(is_identifier_token) {
                self.advance();
                match self.consume_identifier("expected type name segment") {
                    Some(segment) => segments.push(segment),
                    None => return None,
                }
                continue;
            }
            break;
        }
        let array_dims = self.consume_array_dims();
        Some(TypeExpr {
            segments,
            type_args,
            array_dims,
            annotations,
            span: self.make_span(start),
            ..TypeExpr::default()
        })
    }

    /// `<...>` argument list; the cursor sits on `<`. Handles the diamond.
    pub(super) fn parse_type_args(&mut self) -> Option<Vec<TypeArg>> {
        self.expect_operator("<");
        let mut args = Vec::new();
        if self.consume_operator(">") {
            return Some(args);
        }
        loop {
            let arg = self.parse_type_arg()?;
            args.push(arg);
            if self.consume_punctuation(',') {
                continue;
            }
            if self.consume_operator(">") {
                return Some(args);
            }
            let span = self.peek().map(|token| token.span);
            self.push_error("expected ',' or '>' in type arguments", span);
            return None;
        }
    }

    fn parse_type_arg(&mut self) -> Option<TypeArg> {
        if self.consume_punctuation('?') {
            let bound = if self.match_keyword(Keyword::Extends) {
                Some((WildcardBound::Extends, self.parse_type_expr()?))
            } else if self.peek().is_some_and(|t| t.lexeme == "super") {
                // `super` lexes as an identifier; match it by spelling here.
                self.advance();
                Some((WildcardBound::Super, self.parse_type_expr()?))
            } else {
                None
            };
            return Some(TypeArg::Wildcard { bound });
        }
        Some(TypeArg::Type(self.parse_type_expr()?))
    }

    fn consume_array_dims(&mut self) -> usize {
        let mut dims = 0;
        while self.check_punctuation('[') && self.check_punctuation_n(1, ']') {
            self.advance();
            self.advance();
            dims += 1;
        }
        dims
    }

    /// Speculative scan: if a type reference could start at token `index`,
    /// return the index just past it. Never emits diagnostics.
    pub(super) fn scan_type(&self, index: usize) -> Option<usize> {
        let token = self.tokens.get(index)?;
        let mut index = match &token.kind {
            TokenKind::Keyword(keyword) if keyword.is_primitive_type() => index + 1,
            TokenKind::Identifier => {
                let mut index = index + 1;
                loop {
                    if self.token_is_operator(index, "<") {
                        match self.scan_type_args(index) {
                            Some(next) => index = next,
                            None => break,
                        }
                    }
                    if self.token_is_punctuation(index, '.')
                        && self.tokens.get(index + 1).is_some_and(is_identifier_token)
                    {
                        index += 2;
                        continue;
                    }
                    break;
                }
                index
            }
            _ => return None,
        };
        while self.token_is_punctuation(index, '[') && self.token_is_punctuation(index + 1, ']') {
            index += 2;
        }
        Some(index)
    }

    fn scan_type_args(&self, index: usize) -> Option<usize> {
        debug_assert!(self.token_is_operator(index, "<"));
        let mut index = index + 1;
        if self.token_is_operator(index, ">") {
            return Some(index + 1);
        }
        loop {
            index = self.scan_type_arg(index)?;
            if self.token_is_punctuation(index, ',') {
                index += 1;
                continue;
            }
            if self.token_is_operator(index, ">") {
                return Some(index + 1);
            }
            return None;
        }
    }

    fn scan_type_arg(&self, index: usize) -> Option<usize> {
        if self.token_is_punctuation(index, '?') {
            let mut index = index + 1;
            let extends = self
                .tokens
                .get(index)
                .is_some_and(|t| t.kind == TokenKind::Keyword(Keyword::Extends));
            let super_bound = self.tokens.get(index).is_some_and(|t| t.lexeme == "super");
            if extends || super_bound {
                index += 1;
                return self.scan_type(index);
            }
            return Some(index);
        }
        self.scan_type(index)
    }

    pub(super) fn token_is_punctuation(&self, index: usize, expected: char) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|token| token.kind == TokenKind::Punctuation(expected))
    }

    pub(super) fn token_is_operator(&self, index: usize, expected: &str) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|token| matches!(token.kind, TokenKind::Operator(op) if op == expected))
    }

    pub(super) fn token_is_keyword(&self, index: usize, expected: Keyword) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|token| token.kind == TokenKind::Keyword(expected))
    }
}
