//! Expression parsing via precedence climbing.
//!
//! `>`-heavy operators are reassembled from adjacent single tokens because
//! the lexer never fuses them (generic argument lists would break).

use super::core::is_identifier_token;
use super::*;

parser_impl! {
    pub(super) fn parse_expression(&mut self) -> Option<Expression> {
        if self.check_identifier() && self.token_is_operator(self.index + 1, "->") {
            let name = self.consume_identifier("expected lambda parameter")?;
            self.advance();
            let body = self.parse_lambda_body()?;
            return Some(Expression::Lambda(LambdaExpr {
                params: vec![LambdaParam { ty: None, name }],
                body,
            }));
        }
        if self.check_punctuation('(') && self.lambda_ahead() {
            return self.parse_lambda();
        }
        self.parse_assignment()
    }

    pub(super) fn parse_call_args(&mut self) -> Option<Vec<Expression>> {
        if !self.expect_punctuation('(') {
            return None;
        }
        let mut args = Vec::new();
        if self.consume_punctuation(')') {
            return Some(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.consume_punctuation(',') {
                continue;
            }
            if !self.expect_punctuation(')') {
                return None;
            }
            return Some(args);
        }
    }

    /// Initializer position admits bare `{...}` aggregates.
    pub(super) fn parse_variable_initializer(&mut self) -> Option<Expression> {
        if self.check_punctuation('{') {
            return self.parse_array_initializer();
        }
        self.parse_expression()
    }

    fn parse_array_initializer(&mut self) -> Option<Expression> {
        self.expect_punctuation('{');
        let mut values = Vec::new();
        while !self.check_punctuation('}') && !self.is_at_end() {
            values.push(self.parse_variable_initializer()?);
            if !self.consume_punctuation(',') {
                break;
            }
        }
        self.expect_punctuation('}');
        Some(Expression::ArrayInit(values))
    }

    fn parse_assignment(&mut self) -> Option<Expression> {
        let target = self.parse_conditional()?;
        let op: Option<(&'static str, usize)> = if let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Operator(op)
                    if matches!(
                        op,
                        "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "&=" | "|=" | "^=" | "<<="
                    ) =>
                {
                    Some((op, 1))
                }
                TokenKind::Operator(">")
                    if self.adjacent(0) && self.token_is_operator(self.index + 1, ">=") =>
                {
                    Some((">>=", 2))
                }
                TokenKind::Operator(">")
                    if self.adjacent(0)
                        && self.token_is_operator(self.index + 1, ">")
                        && self.adjacent(1)
                        && self.token_is_operator(self.index + 2, ">=") =>
                {
                    Some((">>>=", 3))
                }
                _ => None,
            }
        } else {
            None
        };
        if let Some((op, tokens)) = op {
            for _ in 0..tokens {
                self.advance();
            }
            let value = self.parse_expression()?;
            return Some(Expression::Assign {
                target: Box::new(target),
                op,
                value: Box::new(value),
            });
        }
        Some(target)
    }

    fn parse_conditional(&mut self) -> Option<Expression> {
        let condition = self.parse_or()?;
        if self.consume_punctuation('?') {
            let then_branch = self.parse_expression()?;
            self.expect_punctuation(':');
            let else_branch = self.parse_expression()?;
            return Some(Expression::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }
        Some(condition)
    }

    fn parse_or(&mut self) -> Option<Expression> {
        let mut left = self.parse_and()?;
        while self.consume_operator("||") {
            let right = self.parse_and()?;
            left = binary("||", left, right);
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Expression> {
        let mut left = self.parse_bit_or()?;
        while self.consume_operator("&&") {
            let right = self.parse_bit_or()?;
            left = binary("&&", left, right);
        }
        Some(left)
    }

    fn parse_bit_or(&mut self) -> Option<Expression> {
        let mut left = self.parse_bit_xor()?;
        while self.consume_operator("|") {
            let right = self.parse_bit_xor()?;
            left = binary("|", left, right);
        }
        Some(left)
    }

    fn parse_bit_xor(&mut self) -> Option<Expression> {
        let mut left = self.parse_bit_and()?;
        while self.consume_operator("^") {
            let right = self.parse_bit_and()?;
            left = binary("^", left, right);
        }
        Some(left)
    }

    fn parse_bit_and(&mut self) -> Option<Expression> {
        let mut left = self.parse_equality()?;
        while self.consume_operator("&") {
            let right = self.parse_equality()?;
            left = binary("&", left, right);
        }
        Some(left)
    }

    fn parse_equality(&mut self) -> Option<Expression> {
        let mut left = self.parse_relational()?;
        loop {
            let op = if self.consume_operator("==") {
                "=="
            } else if self.consume_operator("!=") {
                "!="
            } else {
                return Some(left);
            };
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }
    }

    fn parse_relational(&mut self) -> Option<Expression> {
        let mut left = self.parse_shift()?;
        loop {
            if self.match_keyword(Keyword::Instanceof) {
                let ty = self.parse_type_expr()?;
                let binding = if self.check_identifier() {
                    self.advance().map(|token| token.lexeme)
                } else {
                    None
                };
                left = Expression::InstanceOf {
                    expr: Box::new(left),
                    ty,
                    binding,
                };
                continue;
            }
            let op = if self.consume_operator("<=") {
                "<="
            } else if self.consume_operator(">=") {
                ">="
            } else if self.check_operator("<") {
                self.advance();
                "<"
            } else if self.check_operator(">") && !self.greater_starts_compound() {
                self.advance();
                ">"
            } else {
                return Some(left);
            };
            let right = self.parse_shift()?;
            left = binary(op, left, right);
        }
    }

    /// `>` directly followed by `>` or `>=` belongs to a shift or a
    /// compound assignment, not to a comparison.
    fn greater_starts_compound(&self) -> bool {
        self.adjacent(0)
            && (self.token_is_operator(self.index + 1, ">")
                || self.token_is_operator(self.index + 1, ">="))
    }

    fn parse_shift(&mut self) -> Option<Expression> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.consume_operator("<<") {
                "<<"
            } else if self.check_operator(">")
                && self.adjacent(0)
                && self.token_is_operator(self.index + 1, ">")
            {
                if self.adjacent(1) && self.token_is_operator(self.index + 2, ">") {
                    self.advance();
                    self.advance();
                    self.advance();
                    ">>>"
                } else if self.token_is_operator(self.index + 2, ">=") {
                    // `>>=` handled by assignment parsing.
                    return Some(left);
                } else {
                    self.advance();
                    self.advance();
                    ">>"
                }
            } else {
                return Some(left);
            };
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Option<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.consume_operator("+") {
                "+"
            } else if self.consume_operator("-") {
                "-"
            } else {
                return Some(left);
            };
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Option<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.consume_operator("*") {
                "*"
            } else if self.consume_operator("/") {
                "/"
            } else if self.consume_operator("%") {
                "%"
            } else {
                return Some(left);
            };
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Option<Expression> {
        for op in ["++", "--", "+", "-", "!", "~"] {
            if self.consume_operator(op) {
                let expr = self.parse_unary()?;
                return Some(Expression::Unary {
                    op,
                    expr: Box::new(expr),
                    postfix: false,
                });
            }
        }
        if self.cast_ahead() {
            self.advance();
            let ty = self.parse_type_expr()?;
            self.expect_punctuation(')');
            // The operand may itself be a lambda (`(Runnable) () -> {}`).
            let lambda_operand = (self.check_identifier()
                && self.token_is_operator(self.index + 1, "->"))
                || (self.check_punctuation('(') && self.lambda_ahead());
            let expr = if lambda_operand {
                self.parse_expression()?
            } else {
                self.parse_unary()?
            };
            return Some(Expression::Cast {
                ty,
                expr: Box::new(expr),
            });
        }
        self.parse_postfix()
    }

    /// `( Type )` followed by a token that can begin a cast operand.
    fn cast_ahead(&self) -> bool {
        if !self.check_punctuation('(') {
            return false;
        }
        let inner = self.index + 1;
        let Some(after_type) = self.scan_type(inner) else {
            return false;
        };
        if after_type == inner || !self.token_is_punctuation(after_type, ')') {
            return false;
        }
        let primitive = self
            .tokens
            .get(inner)
            .is_some_and(|t| matches!(t.kind, TokenKind::Keyword(k) if k.is_primitive_type()));
        if primitive {
            return true;
        }
        match self.tokens.get(after_type + 1).map(|t| &t.kind) {
            Some(TokenKind::Identifier)
            | Some(TokenKind::NumberLiteral)
            | Some(TokenKind::StringLiteral)
            | Some(TokenKind::CharLiteral)
            | Some(TokenKind::Punctuation('(')) => true,
            Some(TokenKind::Keyword(k)) => {
                matches!(k, Keyword::New | Keyword::True | Keyword::False | Keyword::Null)
            }
            Some(TokenKind::Operator(op)) => matches!(*op, "!" | "~"),
            _ => false,
        }
    }

    fn parse_postfix(&mut self) -> Option<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check_punctuation('.') {
                self.advance();
                if self.check_operator("<") {
                    let witnesses = self
                        .parse_type_args()?
                        .into_iter()
                        .filter_map(|arg| match arg {
                            TypeArg::Type(ty) => Some(ty),
                            TypeArg::Wildcard { .. } => None,
                        })
                        .collect();
                    let name = self.consume_identifier("expected method name")?;
                    let args = self.parse_call_args()?;
                    expr = Expression::MethodCall {
                        callee: Box::new(Expression::FieldAccess {
                            base: Box::new(expr),
                            name,
                        }),
                        type_witnesses: witnesses,
                        args,
                    };
                    continue;
                }
                if self.match_keyword(Keyword::Class) {
                    expr = Expression::FieldAccess {
                        base: Box::new(expr),
                        name: "class".to_string(),
                    };
                    continue;
                }
                if self.match_keyword(Keyword::New) {
                    // Qualified creation `outer.new Inner(...)`: the inner
                    // name resolves through the outer value, never lexically.
                    let ty = self.parse_type_expr()?;
                    let args = self.parse_call_args()?;
                    let name = ty.simple_name().unwrap_or_default().to_string();
                    expr = Expression::MethodCall {
                        callee: Box::new(Expression::FieldAccess {
                            base: Box::new(expr),
                            name,
                        }),
                        type_witnesses: Vec::new(),
                        args,
                    };
                    continue;
                }
                let name = self.consume_identifier("expected member name")?;
                if self.check_punctuation('(') {
                    let args = self.parse_call_args()?;
                    expr = Expression::MethodCall {
                        callee: Box::new(Expression::FieldAccess {
                            base: Box::new(expr),
                            name,
                        }),
                        type_witnesses: Vec::new(),
                        args,
                    };
                } else {
                    expr = Expression::FieldAccess {
                        base: Box::new(expr),
                        name,
                    };
                }
                continue;
            }
            if self.check_punctuation('(')
                && matches!(expr, Expression::Name { .. } | Expression::FieldAccess { .. })
            {
                let args = self.parse_call_args()?;
                expr = Expression::MethodCall {
                    callee: Box::new(expr),
                    type_witnesses: Vec::new(),
                    args,
                };
                continue;
            }
            if self.check_punctuation('[') && !self.check_punctuation_n(1, ']') {
                self.advance();
                let index = self.parse_expression()?;
                self.expect_punctuation(']');
                expr = Expression::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                };
                continue;
            }
            if self.check_operator("::") {
                self.advance();
                let name = if self.match_keyword(Keyword::New) {
                    "new".to_string()
                } else {
                    self.consume_identifier("expected method reference name")?
                };
                expr = Expression::MethodRef {
                    qualifier: Box::new(expr),
                    name,
                };
                continue;
            }
            if self.consume_operator("++") {
                expr = Expression::Unary {
                    op: "++",
                    expr: Box::new(expr),
                    postfix: true,
                };
                continue;
            }
            if self.consume_operator("--") {
                expr = Expression::Unary {
                    op: "--",
                    expr: Box::new(expr),
                    postfix: true,
                };
                continue;
            }
            return Some(expr);
        }
    }

    fn parse_primary(&mut self) -> Option<Expression> {
        let Some(token) = self.peek().cloned() else {
            self.push_error("expected expression", None);
            return None;
        };
        match token.kind {
            TokenKind::NumberLiteral => {
                self.advance();
                Some(Expression::Literal(Literal::Number(token.lexeme)))
            }
            TokenKind::StringLiteral => {
                self.advance();
                Some(Expression::Literal(Literal::Str(token.lexeme)))
            }
            TokenKind::CharLiteral => {
                self.advance();
                Some(Expression::Literal(Literal::Char(token.lexeme)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Some(Expression::Literal(Literal::Bool(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Some(Expression::Literal(Literal::Bool(false)))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Some(Expression::Literal(Literal::Null))
            }
            TokenKind::Identifier => {
                self.advance();
                Some(Expression::Name {
                    name: token.lexeme,
                    span: Some(token.span),
                })
            }
            TokenKind::Punctuation('(') => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_punctuation(')');
                Some(Expression::Parenthesized(Box::new(inner)))
            }
            TokenKind::Keyword(Keyword::New) => {
                self.advance();
                self.parse_creation()
            }
            TokenKind::Keyword(keyword) if keyword.is_primitive_type() => {
                // Primitive class literal: `int.class`, `boolean[].class`.
                let ty = self.parse_type_expr()?;
                if self.consume_punctuation('.') && self.match_keyword(Keyword::Class) {
                    Some(Expression::ClassLiteral(ty))
                } else {
                    self.push_error("expected '.class' after primitive type", Some(token.span));
                    None
                }
            }
            _ => {
                self.push_error(
                    format!("unexpected token '{}' in expression", token.lexeme),
                    Some(token.span),
                );
                None
            }
        }
    }

    fn parse_creation(&mut self) -> Option<Expression> {
        let ty = self.parse_type_expr()?;
        if ty.array_dims > 0 {
            // `new T[] {...}` — dimensions came from the type itself.
            let initializer = match self.parse_array_initializer()? {
                Expression::ArrayInit(values) => Some(values),
                _ => None,
            };
            return Some(Expression::NewArray {
                ty,
                dims: Vec::new(),
                initializer,
            });
        }
        if self.check_punctuation('[') {
            let mut dims = Vec::new();
            while self.consume_punctuation('[') {
                if self.consume_punctuation(']') {
                    dims.push(None);
                } else {
                    dims.push(Some(self.parse_expression()?));
                    self.expect_punctuation(']');
                }
            }
            let initializer = if self.check_punctuation('{') {
                match self.parse_array_initializer()? {
                    Expression::ArrayInit(values) => Some(values),
                    _ => None,
                }
            } else {
                None
            };
            return Some(Expression::NewArray {
                ty,
                dims,
                initializer,
            });
        }
        let args = self.parse_call_args()?;
        let body = if self.check_punctuation('{') {
            let anon_name = ty.simple_name().unwrap_or_default().to_string();
            Some(self.parse_class_body(&anon_name)?)
        } else {
            None
        };
        Some(Expression::New(NewExpr { ty, args, body }))
    }

    /// Balanced-paren lookahead for `(...) ->`.
    fn lambda_ahead(&self) -> bool {
        let mut depth = 0usize;
        let mut index = self.index;
        while let Some(token) = self.tokens.get(index) {
            match token.kind {
                TokenKind::Punctuation('(') => depth += 1,
                TokenKind::Punctuation(')') => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.token_is_operator(index + 1, "->");
                    }
                }
                // A lambda parameter list never contains these.
                TokenKind::Punctuation('{') | TokenKind::Punctuation(';') => return false,
                _ => {}
            }
            index += 1;
        }
        false
    }

    fn parse_lambda(&mut self) -> Option<Expression> {
        self.expect_punctuation('(');
        let mut params = Vec::new();
        if !self.check_punctuation(')') {
            loop {
                let typed = self.scan_type(self.index).is_some_and(|after| {
                    self.tokens.get(after).is_some_and(is_identifier_token)
                        && (self.token_is_punctuation(after + 1, ',')
                            || self.token_is_punctuation(after + 1, ')'))
                });
                let param = if typed {
                    let ty = self.parse_type_expr()?;
                    let name = self.consume_identifier("expected lambda parameter")?;
                    LambdaParam { ty: Some(ty), name }
                } else {
                    let name = self.consume_identifier("expected lambda parameter")?;
                    LambdaParam { ty: None, name }
                };
                params.push(param);
                if !self.consume_punctuation(',') {
                    break;
                }
            }
        }
        self.expect_punctuation(')');
        self.expect_operator("->");
        let body = self.parse_lambda_body()?;
        Some(Expression::Lambda(LambdaExpr { params, body }))
    }

    fn parse_lambda_body(&mut self) -> Option<LambdaBody> {
        if self.check_punctuation('{') {
            Some(LambdaBody::Block(self.parse_block()?))
        } else {
            Some(LambdaBody::Expression(Box::new(self.parse_expression()?)))
        }
    }
}

fn binary(op: &'static str, left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
