use super::*;

parser_impl! {
    pub(super) fn is_at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    pub(super) fn peek_n(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    pub(super) fn advance(&mut self) -> Option<Token> {
        if self.index < self.tokens.len() {
            let token = self.tokens[self.index].clone();
            self.index += 1;
            self.last_span = Some(token.span);
            Some(token)
        } else {
            None
        }
    }

    /// Current position, for backtracking with `reset`.
    pub(super) fn mark(&self) -> usize {
        self.index
    }

    pub(super) fn reset(&mut self, mark: usize) {
        self.index = mark;
    }

    pub(super) fn check_identifier(&self) -> bool {
        self.peek()
            .is_some_and(|token| matches!(token.kind, TokenKind::Identifier))
    }

    pub(super) fn consume_identifier(&mut self, message: &str) -> Option<String> {
        if let Some(token) = self.peek() {
            if matches!(token.kind, TokenKind::Identifier) {
                let lexeme = token.lexeme.clone();
                self.advance();
                return Some(lexeme);
            }
            let span = token.span;
            self.push_error(message, Some(span));
            self.advance();
            None
        } else {
            self.push_error(message, None);
            None
        }
    }

    pub(super) fn check_punctuation(&self, expected: char) -> bool {
        self.peek()
            .is_some_and(|token| token.kind == TokenKind::Punctuation(expected))
    }

    pub(super) fn check_punctuation_n(&self, offset: usize, expected: char) -> bool {
        self.peek_n(offset)
            .is_some_and(|token| token.kind == TokenKind::Punctuation(expected))
    }

    pub(super) fn consume_punctuation(&mut self, expected: char) -> bool {
        if self.check_punctuation(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect_punctuation(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Punctuation(expected) => {
                self.advance();
                true
            }
            Some(token) => {
                let span = token.span;
                self.push_error(format!("expected '{expected}'"), Some(span));
                false
            }
            None => {
                self.push_error(format!("expected '{expected}'"), None);
                false
            }
        }
    }

    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek()
            .is_some_and(|token| token.kind == TokenKind::Keyword(keyword))
    }

    pub(super) fn check_keyword_n(&self, offset: usize, keyword: Keyword) -> bool {
        self.peek_n(offset)
            .is_some_and(|token| token.kind == TokenKind::Keyword(keyword))
    }

    pub(super) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn check_operator(&self, symbol: &str) -> bool {
        self.peek()
            .is_some_and(|token| matches!(token.kind, TokenKind::Operator(op) if op == symbol))
    }

    pub(super) fn consume_operator(&mut self, symbol: &str) -> bool {
        if self.check_operator(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect_operator(&mut self, symbol: &str) -> bool {
        if self.consume_operator(symbol) {
            true
        } else {
            let span = self.peek().map(|token| token.span);
            self.push_error(format!("expected '{symbol}'"), span);
            false
        }
    }

    /// Two tokens form one symbol only when no trivia separates them.
    pub(super) fn adjacent(&self, offset: usize) -> bool {
        match (self.peek_n(offset), self.peek_n(offset + 1)) {
            (Some(first), Some(second)) => first.span.end == second.span.start,
            _ => false,
        }
    }

    pub(super) fn make_span(&self, start: Option<usize>) -> Option<Span> {
        match (start, self.last_span) {
            (Some(begin), Some(end_span)) if end_span.end >= begin => {
                Some(Span::in_file(end_span.file_id, begin, end_span.end))
            }
            _ => None,
        }
    }

    pub(super) fn current_start(&self) -> Option<usize> {
        self.peek().map(|token| token.span.start)
    }

    pub(super) fn push_error(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.diagnostics.push_error(message, span);
    }

    /// Parse modifier keywords and return the aggregate, leaving the cursor
    /// after the last modifier.
    pub(super) fn consume_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        while let Some(token) = self.peek() {
            let TokenKind::Keyword(keyword) = token.kind else {
                break;
            };
            if !keyword.is_modifier() {
                break;
            }
            match keyword {
                Keyword::Public => modifiers.visibility = Visibility::Public,
                Keyword::Protected => modifiers.visibility = Visibility::Protected,
                Keyword::Private => modifiers.visibility = Visibility::Private,
                Keyword::Static => modifiers.is_static = true,
                Keyword::Abstract => modifiers.is_abstract = true,
                Keyword::Final => modifiers.is_final = true,
                _ => {}
            }
            self.advance();
        }
        modifiers
    }

    /// Parse any leading annotations.
    pub(super) fn consume_annotations(&mut self) -> Vec<Annotation> {
        let mut annotations = Vec::new();
        while self.check_punctuation('@') && !self.check_keyword_n(1, Keyword::Interface) {
            if let Some(annotation) = self.parse_annotation() {
                annotations.push(annotation);
            } else {
                break;
            }
        }
        annotations
    }

    /// Annotations and modifiers may interleave (`@A public @B static`).
    pub(super) fn consume_annotations_and_modifiers(&mut self) -> (Vec<Annotation>, Modifiers) {
        let mut annotations = Vec::new();
        let mut modifiers = Modifiers::default();
        loop {
            if self.check_punctuation('@') && !self.check_keyword_n(1, Keyword::Interface) {
                if let Some(annotation) = self.parse_annotation() {
                    annotations.push(annotation);
                    continue;
                }
                break;
            }
            let before = self.index;
            let parsed = self.consume_modifiers();
            if self.index == before {
                break;
            }
            merge_modifiers(&mut modifiers, parsed);
        }
        (annotations, modifiers)
    }

    pub(super) fn parse_qualified_name(&mut self, message: &str) -> Option<QualifiedName> {
        let start = self.current_start();
        let first = self.consume_identifier(message)?;
        let mut segments = vec![first];
        while self.check_punctuation('.') && self.peek_n(1).is_some_and(is_identifier_token) {
            self.advance();
            if let Some(next) = self.consume_identifier(message) {
                segments.push(next);
            }
        }
        Some(QualifiedName {
            segments,
            span: self.make_span(start),
        })
    }

    /// Skip tokens until one of the given punctuation characters at depth
    /// zero, leaving the cursor on it. Basic recovery for malformed members.
    pub(super) fn skip_until_punctuation(&mut self, stops: &[char]) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Punctuation(ch) if matches!(ch, '(' | '[' | '{') => {
                    depth += 1;
                }
                TokenKind::Punctuation(ch) if matches!(ch, ')' | ']' | '}') => {
                    if depth == 0 && stops.contains(&ch) {
                        return;
                    }
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Punctuation(ch) if depth == 0 && stops.contains(&ch) => {
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }
}

fn merge_modifiers(into: &mut Modifiers, from: Modifiers) {
    if from.visibility != Visibility::Package {
        into.visibility = from.visibility;
    }
    into.is_static |= from.is_static;
    into.is_abstract |= from.is_abstract;
    into.is_final |= from.is_final;
}

pub(super) fn is_identifier_token(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Identifier)
}
