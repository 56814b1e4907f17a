//! Compilation unit and declaration parsing: package, imports, type
//! declarations, members, annotations, and generic parameter lists.

use super::*;

parser_impl! {
    pub(super) fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let mut unit = CompilationUnit::default();

        if self.check_keyword(Keyword::Package) {
            self.advance();
            unit.package = self.parse_qualified_name("expected package name");
            self.expect_punctuation(';');
        }

        while self.check_keyword(Keyword::Import) {
            if let Some(import) = self.parse_import() {
                unit.imports.push(import);
            }
        }

        while !self.is_at_end() {
            if self.consume_punctuation(';') {
                continue;
            }
            let before = self.index;
            let (annotations, modifiers) = self.consume_annotations_and_modifiers();
            match self.parse_type_decl(annotations, modifiers) {
                Some(decl) => unit.types.push(decl),
                None => {
                    if self.index == before {
                        let span = self.peek().map(|token| token.span);
                        self.push_error("expected type declaration", span);
                        self.advance();
                    }
                    self.skip_until_punctuation(&[';', '}']);
                    self.advance();
                }
            }
        }

        unit
    }

    fn parse_import(&mut self) -> Option<ImportDecl> {
        let start = self.current_start();
        self.advance();
        let is_static = self.match_keyword(Keyword::Static);
        let path = self.parse_qualified_name("expected import path")?;
        let mut is_wildcard = false;
        if self.check_punctuation('.') && self.token_is_operator(self.index + 1, "*") {
            self.advance();
            self.advance();
            is_wildcard = true;
        }
        self.expect_punctuation(';');
        Some(ImportDecl {
            path,
            is_static,
            is_wildcard,
            span: self.make_span(start),
        })
    }

    pub(super) fn parse_type_decl(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Modifiers,
    ) -> Option<TypeDecl> {
        let start = self.current_start();
        let kind = if self.match_keyword(Keyword::Class) {
            TypeKind::Class
        } else if self.match_keyword(Keyword::Interface) {
            TypeKind::Interface
        } else if self.match_keyword(Keyword::Enum) {
            TypeKind::Enum
        } else if self.check_punctuation('@') && self.check_keyword_n(1, Keyword::Interface) {
            self.advance();
            self.advance();
            TypeKind::Annotation
        } else {
            return None;
        };

        let name = self.consume_identifier("expected type name")?;
        let type_params = if self.check_operator("<") {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        let mut superclass = None;
        let mut interfaces = Vec::new();
        if self.match_keyword(Keyword::Extends) {
            if kind == TypeKind::Interface {
                // Interface inheritance lists behave like implements clauses.
                interfaces.push(self.parse_type_expr()?);
                while self.consume_punctuation(',') {
                    interfaces.push(self.parse_type_expr()?);
                }
            } else {
                superclass = Some(self.parse_type_expr()?);
            }
        }
        if self.match_keyword(Keyword::Implements) {
            interfaces.push(self.parse_type_expr()?);
            while self.consume_punctuation(',') {
                interfaces.push(self.parse_type_expr()?);
            }
        }

        let mut enum_constants = Vec::new();
        let members = if kind == TypeKind::Enum {
            let (constants, members) = self.parse_enum_body(&name)?;
            enum_constants = constants;
            members
        } else {
            self.parse_class_body(&name)?
        };

        Some(TypeDecl {
            kind,
            name,
            modifiers,
            annotations,
            type_params,
            superclass,
            interfaces,
            enum_constants,
            members,
            span: self.make_span(start),
        })
    }

    pub(super) fn parse_class_body(&mut self, type_name: &str) -> Option<Vec<Member>> {
        if !self.expect_punctuation('{') {
            return None;
        }
        let mut members = Vec::new();
        while !self.check_punctuation('}') && !self.is_at_end() {
            if self.consume_punctuation(';') {
                continue;
            }
            let before = self.index;
            match self.parse_member(type_name) {
                Some(member) => members.push(member),
                None => {
                    if self.index == before {
                        let span = self.peek().map(|token| token.span);
                        self.push_error("expected class member", span);
                        self.advance();
                    }
                    self.skip_until_punctuation(&[';', '}']);
                    self.consume_punctuation(';');
                }
            }
        }
        self.expect_punctuation('}');
        Some(members)
    }

    fn parse_member(&mut self, type_name: &str) -> Option<Member> {
        let (annotations, modifiers) = self.consume_annotations_and_modifiers();

        if self.check_punctuation('{') {
            let body = self.parse_block()?;
            return Some(Member::Initializer(InitializerBlock {
                is_static: modifiers.is_static,
                body,
            }));
        }

        if self.check_keyword(Keyword::Class)
            || self.check_keyword(Keyword::Interface)
            || self.check_keyword(Keyword::Enum)
            || (self.check_punctuation('@') && self.check_keyword_n(1, Keyword::Interface))
        {
            return self.parse_type_decl(annotations, modifiers).map(Member::Type);
        }

        let type_params = if self.check_operator("<") {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        // Constructor: the class name directly followed by a parameter list.
        if self.check_identifier()
            && self.peek().is_some_and(|t| t.lexeme == type_name)
            && self.check_punctuation_n(1, '(')
        {
            let name = self.consume_identifier("expected constructor name")?;
            return self
                .parse_method_rest(annotations, modifiers, type_params, None, name, true)
                .map(Member::Method);
        }

        let ty = self.parse_type_expr()?;
        let name = self.consume_identifier("expected member name")?;

        if self.check_punctuation('(') {
            self.parse_method_rest(annotations, modifiers, type_params, Some(ty), name, false)
                .map(Member::Method)
        } else {
            self.parse_field_rest(annotations, modifiers, ty, name)
                .map(Member::Field)
        }
    }

    fn parse_method_rest(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Modifiers,
        type_params: Vec<TypeParam>,
        return_type: Option<TypeExpr>,
        name: String,
        is_constructor: bool,
    ) -> Option<MethodDecl> {
        let params = self.parse_params()?;
        // Trailing dims on the signature are folded into the return type.
        let mut return_type = return_type;
        let extra_dims = self.consume_trailing_dims();
        if extra_dims > 0 {
            if let Some(ty) = return_type.as_mut() {
                ty.array_dims += extra_dims;
            }
        }

        let mut throws = Vec::new();
        if self.match_keyword(Keyword::Throws) {
            throws.push(self.parse_type_expr()?);
            while self.consume_punctuation(',') {
                throws.push(self.parse_type_expr()?);
            }
        }

        let mut default_value = None;
        let body = if self.check_punctuation('{') {
            Some(self.parse_block()?)
        } else {
            if self.match_keyword(Keyword::Default) {
                default_value = Some(self.parse_annotation_value()?);
            }
            self.expect_punctuation(';');
            None
        };

        Some(MethodDecl {
            modifiers,
            annotations,
            type_params,
            return_type,
            name,
            params,
            throws,
            body,
            is_constructor,
            default_value,
        })
    }

    fn parse_field_rest(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Modifiers,
        ty: TypeExpr,
        first_name: String,
    ) -> Option<FieldDecl> {
        let declarators = self.parse_declarators(first_name)?;
        self.expect_punctuation(';');
        Some(FieldDecl {
            modifiers,
            annotations,
            ty,
            declarators,
        })
    }

    /// Declarator list starting from an already-consumed first name.
    pub(super) fn parse_declarators(&mut self, first_name: String) -> Option<Vec<VariableDeclarator>> {
        let mut declarators = Vec::new();
        let mut name = first_name;
        loop {
            let extra_dims = self.consume_trailing_dims();
            let initializer = if self.consume_operator("=") {
                Some(self.parse_variable_initializer()?)
            } else {
                None
            };
            declarators.push(VariableDeclarator {
                name,
                extra_dims,
                initializer,
            });
            if self.consume_punctuation(',') {
                name = self.consume_identifier("expected declarator name")?;
                continue;
            }
            return Some(declarators);
        }
    }

    fn consume_trailing_dims(&mut self) -> usize {
        let mut dims = 0;
        while self.check_punctuation('[') && self.check_punctuation_n(1, ']') {
            self.advance();
            self.advance();
            dims += 1;
        }
        dims
    }

    fn parse_params(&mut self) -> Option<Vec<Parameter>> {
        if !self.expect_punctuation('(') {
            return None;
        }
        let mut params = Vec::new();
        if self.consume_punctuation(')') {
            return Some(params);
        }
        loop {
            let annotations = self.consume_annotations();
            self.match_keyword(Keyword::Final);
            let mut ty = self.parse_type_expr()?;
            let is_varargs = self.consume_operator("...");
            let name = self.consume_identifier("expected parameter name")?;
            ty.array_dims += self.consume_trailing_dims();
            params.push(Parameter {
                annotations,
                ty,
                name,
                is_varargs,
            });
            if self.consume_punctuation(',') {
                continue;
            }
            if !self.expect_punctuation(')') {
                return None;
            }
            return Some(params);
        }
    }

    pub(super) fn parse_type_params(&mut self) -> Option<Vec<TypeParam>> {
        self.expect_operator("<");
        let mut params = Vec::new();
        loop {
            self.consume_annotations();
            let name = self.consume_identifier("expected type parameter name")?;
            let mut bounds = Vec::new();
            if self.match_keyword(Keyword::Extends) {
                bounds.push(self.parse_type_expr()?);
                while self.consume_operator("&") {
                    bounds.push(self.parse_type_expr()?);
                }
            }
            params.push(TypeParam { name, bounds });
            if self.consume_punctuation(',') {
                continue;
            }
            if self.consume_operator(">") {
                return Some(params);
            }
            let span = self.peek().map(|token| token.span);
            self.push_error("expected ',' or '>' in type parameters", span);
            return None;
        }
    }

    fn parse_enum_body(&mut self, type_name: &str) -> Option<(Vec<EnumConstant>, Vec<Member>)> {
        if !self.expect_punctuation('{') {
            return None;
        }
        let mut constants = Vec::new();
        let mut members = Vec::new();

        while self.check_punctuation('@') || self.check_identifier() {
            let annotations = self.consume_annotations();
            let name = self.consume_identifier("expected enum constant name")?;
            let args = if self.check_punctuation('(') {
                self.parse_call_args()?
            } else {
                Vec::new()
            };
            let body = if self.check_punctuation('{') {
                Some(self.parse_class_body(type_name)?)
            } else {
                None
            };
            constants.push(EnumConstant {
                name,
                annotations,
                args,
                body,
            });
            if !self.consume_punctuation(',') {
                break;
            }
        }

        if self.consume_punctuation(';') {
            while !self.check_punctuation('}') && !self.is_at_end() {
                if self.consume_punctuation(';') {
                    continue;
                }
                let before = self.index;
                match self.parse_member(type_name) {
                    Some(member) => members.push(member),
                    None => {
                        if self.index == before {
                            let span = self.peek().map(|token| token.span);
                            self.push_error("expected enum member", span);
                            self.advance();
                        }
                        self.skip_until_punctuation(&[';', '}']);
                        self.consume_punctuation(';');
                    }
                }
            }
        }
        self.expect_punctuation('}');
        Some((constants, members))
    }

    pub(super) fn parse_annotation(&mut self) -> Option<Annotation> {
        if !self.expect_punctuation('@') {
            return None;
        }
        let name = self.parse_qualified_name("expected annotation name")?;
        let mut args = Vec::new();
        if self.consume_punctuation('(') {
            if !self.check_punctuation(')') {
                args = self.parse_annotation_args()?;
            }
            self.expect_punctuation(')');
        }
        Some(Annotation { name, args })
    }

    fn parse_annotation_args(&mut self) -> Option<Vec<AnnotationArg>> {
        let mut args = Vec::new();
        let named = self.check_identifier() && self.token_is_operator(self.index + 1, "=");
        if named {
            loop {
                let name = self.consume_identifier("expected annotation element name")?;
                self.expect_operator("=");
                let value = self.parse_annotation_value()?;
                args.push(AnnotationArg::Named { name, value });
                if !self.consume_punctuation(',') {
                    break;
                }
            }
        } else {
            args.push(AnnotationArg::Positional(self.parse_annotation_value()?));
        }
        Some(args)
    }

    pub(super) fn parse_annotation_value(&mut self) -> Option<Expression> {
        if self.check_punctuation('@') {
            let annotation = self.parse_annotation()?;
            return Some(Expression::Annotation(Box::new(annotation)));
        }
        if self.check_punctuation('{') {
            self.advance();
            let mut values = Vec::new();
            while !self.check_punctuation('}') && !self.is_at_end() {
                values.push(self.parse_annotation_value()?);
                if !self.consume_punctuation(',') {
                    break;
                }
            }
            self.expect_punctuation('}');
            return Some(Expression::ArrayInit(values));
        }
        self.parse_expression()
    }
}
