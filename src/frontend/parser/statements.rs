//! Statement parsing, including the declaration-versus-expression
//! disambiguation at statement starts.

use super::core::is_identifier_token;
use super::*;

parser_impl! {
    pub(super) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_start();
        if !self.expect_punctuation('{') {
            return None;
        }
        let mut statements = Vec::new();
        while !self.check_punctuation('}') && !self.is_at_end() {
            let before = self.index;
            match self.parse_statement() {
                Some(statement) => statements.push(statement),
                None => {
                    if self.index == before {
                        let span = self.peek().map(|token| token.span);
                        self.push_error("expected statement", span);
                        self.advance();
                    }
                    self.skip_until_punctuation(&[';', '}']);
                    self.consume_punctuation(';');
                }
            }
        }
        self.expect_punctuation('}');
        Some(Block {
            statements,
            span: self.make_span(start),
        })
    }

    pub(super) fn parse_statement(&mut self) -> Option<Statement> {
        let start = self.current_start();

        if self.check_punctuation('{') {
            let block = self.parse_block()?;
            return Some(Statement::new(self.make_span(start), StatementKind::Block(block)));
        }
        if self.consume_punctuation(';') {
            return Some(Statement::new(self.make_span(start), StatementKind::Empty));
        }

        let leading = self.peek().map(|token| token.kind.clone());
        if let Some(kind) = leading {
            match kind {
                TokenKind::Keyword(Keyword::If) => return self.parse_if_statement(start),
                TokenKind::Keyword(Keyword::While) => return self.parse_while_statement(start),
                TokenKind::Keyword(Keyword::Do) => return self.parse_do_statement(start),
                TokenKind::Keyword(Keyword::For) => return self.parse_for_statement(start),
                TokenKind::Keyword(Keyword::Switch) => return self.parse_switch_statement(start),
                TokenKind::Keyword(Keyword::Try) => return self.parse_try_statement(start),
                TokenKind::Keyword(Keyword::Synchronized) => {
                    return self.parse_synchronized_statement(start);
                }
                TokenKind::Keyword(Keyword::Return) => {
                    self.advance();
                    let expression = if self.check_punctuation(';') {
                        None
                    } else {
                        Some(self.parse_expression()?)
                    };
                    self.expect_punctuation(';');
                    return Some(Statement::new(
                        self.make_span(start),
                        StatementKind::Return { expression },
                    ));
                }
                TokenKind::Keyword(Keyword::Throw) => {
                    self.advance();
                    let expression = self.parse_expression()?;
                    self.expect_punctuation(';');
                    return Some(Statement::new(
                        self.make_span(start),
                        StatementKind::Throw { expression },
                    ));
                }
                TokenKind::Keyword(Keyword::Break) => {
                    self.advance();
                    let label = self.consume_optional_label();
                    self.expect_punctuation(';');
                    return Some(Statement::new(
                        self.make_span(start),
                        StatementKind::Break { label },
                    ));
                }
                TokenKind::Keyword(Keyword::Continue) => {
                    self.advance();
                    let label = self.consume_optional_label();
                    self.expect_punctuation(';');
                    return Some(Statement::new(
                        self.make_span(start),
                        StatementKind::Continue { label },
                    ));
                }
                TokenKind::Keyword(Keyword::Assert) => {
                    self.advance();
                    let condition = self.parse_expression()?;
                    let detail = if self.consume_punctuation(':') {
                        Some(self.parse_expression()?)
                    } else {
                        None
                    };
                    self.expect_punctuation(';');
                    return Some(Statement::new(
                        self.make_span(start),
                        StatementKind::Assert { condition, detail },
                    ));
                }
                _ => {}
            }
        }

        // Local type declarations, possibly behind annotations/modifiers.
        if self.local_type_ahead() {
            let (annotations, modifiers) = self.consume_annotations_and_modifiers();
            let decl = self.parse_type_decl(annotations, modifiers)?;
            return Some(Statement::new(
                self.make_span(start),
                StatementKind::LocalType(decl),
            ));
        }

        // Labeled statement: identifier directly followed by a colon.
        if self.check_identifier() && self.check_punctuation_n(1, ':') {
            let label = self.consume_identifier("expected label")?;
            self.advance();
            let statement = Box::new(self.parse_statement()?);
            return Some(Statement::new(
                self.make_span(start),
                StatementKind::Labeled { label, statement },
            ));
        }

        // Local variable declarations, possibly behind annotations/`final`.
        if self.check_punctuation('@') || self.check_keyword(Keyword::Final) {
            let annotations = self.consume_annotations();
            let is_final = self.match_keyword(Keyword::Final);
            let local = self.parse_local_variable(annotations, is_final)?;
            self.expect_punctuation(';');
            return Some(Statement::new(
                self.make_span(start),
                StatementKind::LocalVariable(local),
            ));
        }
        if self.declaration_ahead(self.index) {
            let local = self.parse_local_variable(Vec::new(), false)?;
            self.expect_punctuation(';');
            return Some(Statement::new(
                self.make_span(start),
                StatementKind::LocalVariable(local),
            ));
        }

        let expression = self.parse_expression()?;
        self.expect_punctuation(';');
        Some(Statement::new(
            self.make_span(start),
            StatementKind::Expression(expression),
        ))
    }

    fn local_type_ahead(&self) -> bool {
        let mut index = self.index;
        // Skip modifier keywords; annotated local classes go through the
        // annotation branch of parse_statement instead.
        while self
            .tokens
            .get(index)
            .is_some_and(|t| matches!(t.kind, TokenKind::Keyword(k) if k.is_modifier()))
        {
            index += 1;
        }
        self.token_is_keyword(index, Keyword::Class)
            || self.token_is_keyword(index, Keyword::Interface)
            || self.token_is_keyword(index, Keyword::Enum)
    }

    fn consume_optional_label(&mut self) -> Option<String> {
        if self.check_identifier() {
            self.advance().map(|token| token.lexeme)
        } else {
            None
        }
    }

    /// True when tokens from `index` read as `Type Identifier` followed by a
    /// declarator continuation.
    pub(super) fn declaration_ahead(&self, index: usize) -> bool {
        let Some(after_type) = self.scan_type(index) else {
            return false;
        };
        if !self.tokens.get(after_type).is_some_and(is_identifier_token) {
            return false;
        }
        let next = after_type + 1;
        self.token_is_operator(next, "=")
            || self.token_is_punctuation(next, ';')
            || self.token_is_punctuation(next, ',')
            || (self.token_is_punctuation(next, '[') && self.token_is_punctuation(next + 1, ']'))
    }

    /// Parse `Type name [= init] (, name [= init])*` without the trailing
    /// semicolon, which differs per context.
    pub(super) fn parse_local_variable(
        &mut self,
        annotations: Vec<Annotation>,
        is_final: bool,
    ) -> Option<LocalVariable> {
        let ty = self.parse_type_expr()?;
        let first = self.consume_identifier("expected variable name")?;
        let declarators = self.parse_declarators(first)?;
        Some(LocalVariable {
            annotations,
            is_final,
            ty,
            declarators,
        })
    }

    fn parse_if_statement(&mut self, start: Option<usize>) -> Option<Statement> {
        self.advance();
        let condition = self.parse_parenthesized_condition()?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_keyword(Keyword::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Some(Statement::new(
            self.make_span(start),
            StatementKind::If(IfStatement {
                condition,
                then_branch,
                else_branch,
            }),
        ))
    }

    fn parse_while_statement(&mut self, start: Option<usize>) -> Option<Statement> {
        self.advance();
        let condition = self.parse_parenthesized_condition()?;
        let body = Box::new(self.parse_statement()?);
        Some(Statement::new(
            self.make_span(start),
            StatementKind::While { condition, body },
        ))
    }

    fn parse_do_statement(&mut self, start: Option<usize>) -> Option<Statement> {
        self.advance();
        let body = Box::new(self.parse_statement()?);
        if !self.match_keyword(Keyword::While) {
            let span = self.peek().map(|token| token.span);
            self.push_error("expected 'while' after do body", span);
            return None;
        }
        let condition = self.parse_parenthesized_condition()?;
        self.expect_punctuation(';');
        Some(Statement::new(
            self.make_span(start),
            StatementKind::DoWhile { body, condition },
        ))
    }

    fn parse_for_statement(&mut self, start: Option<usize>) -> Option<Statement> {
        self.advance();
        if !self.expect_punctuation('(') {
            return None;
        }

        // Enhanced for: `Type name : iterable`.
        let mark = self.mark();
        let _annotations = self.consume_annotations();
        self.match_keyword(Keyword::Final);
        if let Some(after_type) = self.scan_type(self.index) {
            let colon = after_type + 1;
            if self
                .tokens
                .get(after_type)
                .is_some_and(is_identifier_token)
                && self.token_is_punctuation(colon, ':')
            {
                let element_type = self.parse_type_expr()?;
                let element_name = self.consume_identifier("expected loop variable")?;
                self.expect_punctuation(':');
                let iterable = self.parse_expression()?;
                if !self.expect_punctuation(')') {
                    return None;
                }
                let body = Box::new(self.parse_statement()?);
                return Some(Statement::new(
                    self.make_span(start),
                    StatementKind::ForEach(ForEachStatement {
                        element_type,
                        element_name,
                        iterable,
                        body,
                    }),
                ));
            }
        }
        self.reset(mark);

        let init = if self.consume_punctuation(';') {
            None
        } else if self.check_punctuation('@')
            || self.check_keyword(Keyword::Final)
            || self.declaration_ahead(self.index)
        {
            let annotations = self.consume_annotations();
            let is_final = self.match_keyword(Keyword::Final);
            let local = self.parse_local_variable(annotations, is_final)?;
            self.expect_punctuation(';');
            Some(ForInit::Declaration(local))
        } else {
            let mut expressions = vec![self.parse_expression()?];
            while self.consume_punctuation(',') {
                expressions.push(self.parse_expression()?);
            }
            self.expect_punctuation(';');
            Some(ForInit::Expressions(expressions))
        };

        let condition = if self.check_punctuation(';') {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punctuation(';');

        let mut update = Vec::new();
        if !self.check_punctuation(')') {
            update.push(self.parse_expression()?);
            while self.consume_punctuation(',') {
                update.push(self.parse_expression()?);
            }
        }
        if !self.expect_punctuation(')') {
            return None;
        }

        let body = Box::new(self.parse_statement()?);
        Some(Statement::new(
            self.make_span(start),
            StatementKind::For(ForStatement {
                init,
                condition,
                update,
                body,
            }),
        ))
    }

    fn parse_switch_statement(&mut self, start: Option<usize>) -> Option<Statement> {
        self.advance();
        let selector = self.parse_parenthesized_condition()?;
        if !self.expect_punctuation('{') {
            return None;
        }
        let mut sections = Vec::new();
        while !self.check_punctuation('}') && !self.is_at_end() {
            let mut labels = Vec::new();
            loop {
                if self.match_keyword(Keyword::Case) {
                    let value = self.parse_expression()?;
                    self.expect_punctuation(':');
                    labels.push(SwitchLabel::Case(value));
                } else if self.match_keyword(Keyword::Default) {
                    self.expect_punctuation(':');
                    labels.push(SwitchLabel::Default);
                } else {
                    break;
                }
            }
            if labels.is_empty() {
                let span = self.peek().map(|token| token.span);
                self.push_error("expected 'case' or 'default' label", span);
                return None;
            }
            let mut statements = Vec::new();
            while !self.check_punctuation('}')
                && !self.check_keyword(Keyword::Case)
                && !self.check_keyword(Keyword::Default)
                && !self.is_at_end()
            {
                statements.push(self.parse_statement()?);
            }
            sections.push(SwitchSection { labels, statements });
        }
        self.expect_punctuation('}');
        Some(Statement::new(
            self.make_span(start),
            StatementKind::Switch(SwitchStatement { selector, sections }),
        ))
    }

    fn parse_try_statement(&mut self, start: Option<usize>) -> Option<Statement> {
        self.advance();
        let mut resources = Vec::new();
        if self.consume_punctuation('(') {
            loop {
                if self.check_punctuation(')') {
                    break;
                }
                let resource = if self.check_punctuation('@')
                    || self.check_keyword(Keyword::Final)
                    || self.declaration_ahead(self.index)
                {
                    let annotations = self.consume_annotations();
                    let is_final = self.match_keyword(Keyword::Final);
                    TryResource::Declaration(self.parse_local_variable(annotations, is_final)?)
                } else {
                    TryResource::Expression(self.parse_expression()?)
                };
                resources.push(resource);
                if !self.consume_punctuation(';') {
                    break;
                }
            }
            if !self.expect_punctuation(')') {
                return None;
            }
        }

        let body = self.parse_block()?;

        let mut catches = Vec::new();
        while self.match_keyword(Keyword::Catch) {
            if !self.expect_punctuation('(') {
                return None;
            }
            self.consume_annotations();
            self.match_keyword(Keyword::Final);
            let mut types = vec![self.parse_type_expr()?];
            while self.consume_operator("|") {
                types.push(self.parse_type_expr()?);
            }
            let name = self.consume_identifier("expected catch parameter name")?;
            if !self.expect_punctuation(')') {
                return None;
            }
            let body = self.parse_block()?;
            catches.push(CatchClause { types, name, body });
        }

        let finally = if self.match_keyword(Keyword::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if resources.is_empty() && catches.is_empty() && finally.is_none() {
            self.push_error(
                "try statement requires resources, a catch clause, or finally",
                None,
            );
            return None;
        }

        Some(Statement::new(
            self.make_span(start),
            StatementKind::Try(TryStatement {
                resources,
                body,
                catches,
                finally,
            }),
        ))
    }

    fn parse_synchronized_statement(&mut self, start: Option<usize>) -> Option<Statement> {
        self.advance();
        let lock = self.parse_parenthesized_condition()?;
        let body = self.parse_block()?;
        Some(Statement::new(
            self.make_span(start),
            StatementKind::Synchronized { lock, body },
        ))
    }

    fn parse_parenthesized_condition(&mut self) -> Option<Expression> {
        if !self.expect_punctuation('(') {
            return None;
        }
        let expression = self.parse_expression()?;
        if !self.expect_punctuation(')') {
            return None;
        }
        Some(expression)
    }
}
