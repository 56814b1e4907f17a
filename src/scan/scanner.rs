use std::collections::HashSet;

use tracing::debug;

use super::entity::{ClassEntity, Entity, MemberEntity};
use super::extender::{ClassExtender, Extension, OrphanClass};
use super::hierarchy::ClassHierarchy;
use super::identifier::Identifier;
use super::scope::Scope;
use super::selector::Selector;
use super::{CancellationToken, ScanResult};
use crate::error::{Error, Result};
use crate::frontend::ast::{
    Annotation, Block, CompilationUnit, EnumConstant, Expression, ForInit, LambdaBody,
    LocalVariable, Member, MethodDecl, Statement, StatementKind, SwitchLabel, TryResource,
    TypeArg, TypeDecl, TypeExpr, Visibility,
};

/// Single-pass, scope-stack traversal of a compilation unit that collects
/// every identifier with no visible declaration at its use site.
///
/// Class scopes close through an in-file extension walk: residuals of a
/// class whose whole superclass chain lives in the file bubble outwards as
/// usual; a chain that escapes the file seals them into an [`OrphanClass`].
pub struct UnresolvedIdentifierScanner<'a> {
    scopes: Vec<Scope>,
    class_path: Vec<String>,
    orphans: Vec<OrphanClass>,
    in_file: ClassHierarchy,
    cancel: &'a CancellationToken,
}

impl<'a> UnresolvedIdentifierScanner<'a> {
    #[must_use]
    pub fn new(cancel: &'a CancellationToken) -> Self {
        Self {
            scopes: Vec::new(),
            class_path: Vec::new(),
            orphans: Vec::new(),
            in_file: ClassHierarchy::new(),
            cancel,
        }
    }

    pub fn scan(mut self, unit: &CompilationUnit) -> Result<ScanResult> {
        let mut path = Vec::new();
        for decl in &unit.types {
            self.register_in_file(decl, &mut path)?;
        }

        self.open_scope()?;
        for import in &unit.imports {
            self.declare_import(import);
        }
        for decl in &unit.types {
            self.declare(Entity::Class(ClassEntity::from_decl(decl)));
        }
        for decl in &unit.types {
            self.visit_type_decl(decl)?;
        }

        let mut package_scope = self
            .scopes
            .pop()
            .ok_or_else(|| Error::internal("scope stack underflow closing the package scope"))?;
        let mut unresolved = package_scope.take_unresolved();
        unresolved.retain(|name| !package_scope.declares(name.as_str()));
        debug!(
            unresolved = unresolved.len(),
            orphans = self.orphans.len(),
            "scan complete"
        );
        Ok(ScanResult {
            package_scope,
            unresolved,
            orphans: self.orphans,
        })
    }

    /// Register every type declaration under its nested path, so superclass
    /// links between classes of this file resolve regardless of their
    /// textual order.
    fn register_in_file(&mut self, decl: &TypeDecl, path: &mut Vec<String>) -> Result<()> {
        path.push(decl.name.clone());
        let selector = Selector::of(path.iter().cloned())
            .ok_or_else(|| Error::internal("empty path registering a class"))?;
        self.in_file.insert(&selector, ClassEntity::from_decl(decl));
        for member in &decl.members {
            if let Member::Type(nested) = member {
                self.register_in_file(nested, path)?;
            }
        }
        path.pop();
        Ok(())
    }

    fn declare_import(&mut self, import: &crate::frontend::ast::ImportDecl) {
        let Some(simple) = import.simple_name() else {
            return;
        };
        let entity = if import.is_static {
            Entity::Variable(MemberEntity::new(simple, Visibility::Public, true))
        } else {
            Entity::Class(ClassEntity::new(simple, None, HashSet::new()))
        };
        self.declare(entity);
    }

    fn open_scope(&mut self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.scopes.push(Scope::new());
        Ok(())
    }

    fn close_scope(&mut self) -> Result<()> {
        let mut scope = self
            .scopes
            .pop()
            .ok_or_else(|| Error::internal("scope stack underflow"))?;
        let residuals = scope.take_unresolved();
        self.bubble(residuals);
        Ok(())
    }

    /// Attribute residuals of a popped scope to the surviving stack: a name
    /// an outer binding satisfies is consumed, the rest move one scope out.
    fn bubble(&mut self, residuals: HashSet<Identifier>) {
        for name in residuals {
            if !self.resolves(name.as_str()) {
                if let Some(top) = self.scopes.last_mut() {
                    top.record_unresolved(name);
                }
            }
        }
    }

    fn resolves(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.declares(name))
    }

    fn resolve_or_record(&mut self, name: &str) {
        if !self.resolves(name) {
            if let Some(top) = self.scopes.last_mut() {
                top.record_unresolved(Identifier::new(name));
            }
        }
    }

    fn declare(&mut self, entity: Entity) {
        if let Some(top) = self.scopes.last_mut() {
            top.declare(entity);
        }
    }

    fn visit_type_decl(&mut self, decl: &TypeDecl) -> Result<()> {
        self.declare(Entity::Class(ClassEntity::from_decl(decl)));
        for annotation in &decl.annotations {
            self.visit_annotation(annotation)?;
        }

        self.class_path.push(decl.name.clone());
        self.open_scope()?;
        for type_param in &decl.type_params {
            self.declare(Entity::type_parameter(type_param.name.clone()));
            for bound in &type_param.bounds {
                self.visit_type(bound);
            }
        }
        if let Some(superclass) = &decl.superclass {
            self.visit_type(superclass);
        }
        for interface in &decl.interfaces {
            self.visit_type(interface);
        }
        self.predeclare_members(&decl.members, &decl.enum_constants);

        for constant in &decl.enum_constants {
            for annotation in &constant.annotations {
                self.visit_annotation(annotation)?;
            }
            for arg in &constant.args {
                self.visit_expr(arg)?;
            }
            if let Some(body) = &constant.body {
                // A constant body subclasses the enum itself; its members
                // and the enum's are both visible inside.
                self.open_scope()?;
                self.predeclare_members(body, &[]);
                for member in body {
                    self.visit_member(member)?;
                }
                self.close_scope()?;
            }
        }
        for member in &decl.members {
            self.visit_member(member)?;
        }

        self.leave_class_body(decl.superclass.as_ref())?;
        self.class_path.pop();
        Ok(())
    }

    /// Pop the class scope. A class with no superclass, or one whose whole
    /// chain lives in this file, bubbles its residuals; any chain escaping
    /// the file seals them into an orphan instead, because inherited members
    /// may legitimately satisfy those references.
    fn leave_class_body(&mut self, superclass: Option<&TypeExpr>) -> Result<()> {
        let mut scope = self
            .scopes
            .pop()
            .ok_or_else(|| Error::internal("scope stack underflow closing a class scope"))?;
        let residuals = scope.take_unresolved();

        let Some(next) = superclass.and_then(Selector::from_type) else {
            self.bubble(residuals);
            return Ok(());
        };
        let selector = Selector::of(self.class_path.iter().cloned())
            .ok_or_else(|| Error::internal("class path empty at class scope close"))?;
        let contexts = selector.prefixes();
        let mut extender = ClassExtender::for_class(selector, residuals, Some(next));
        extender.extend_within(&self.in_file, &contexts, self.cancel)?;
        match extender.finish() {
            Extension::Complete(rest) => self.bubble(rest),
            Extension::Orphaned(orphan) => {
                debug!(class = %orphan.selector(), next = %orphan.next_superclass(), "sealed orphan class");
                self.orphans.push(orphan);
            }
        }
        Ok(())
    }

    fn predeclare_members(&mut self, members: &[Member], constants: &[EnumConstant]) {
        for constant in constants {
            self.declare(Entity::Variable(MemberEntity::new(
                constant.name.clone(),
                Visibility::Public,
                true,
            )));
        }
        for member in members {
            match member {
                Member::Field(field) => {
                    for declarator in &field.declarators {
                        self.declare(Entity::variable(declarator.name.clone(), &field.modifiers));
                    }
                }
                Member::Method(method) => {
                    if !method.is_constructor {
                        self.declare(Entity::method(method.name.clone(), &method.modifiers));
                    }
                }
                Member::Type(nested) => {
                    self.declare(Entity::Class(ClassEntity::from_decl(nested)));
                }
                Member::Initializer(_) => {}
            }
        }
    }

    fn visit_member(&mut self, member: &Member) -> Result<()> {
        match member {
            Member::Field(field) => {
                for annotation in &field.annotations {
                    self.visit_annotation(annotation)?;
                }
                self.visit_type(&field.ty);
                for declarator in &field.declarators {
                    if let Some(initializer) = &declarator.initializer {
                        self.visit_expr(initializer)?;
                    }
                }
                Ok(())
            }
            Member::Method(method) => self.visit_method(method),
            Member::Type(nested) => self.visit_type_decl(nested),
            Member::Initializer(initializer) => self.visit_block(&initializer.body),
        }
    }

    fn visit_method(&mut self, method: &MethodDecl) -> Result<()> {
        for annotation in &method.annotations {
            self.visit_annotation(annotation)?;
        }
        self.open_scope()?;
        for type_param in &method.type_params {
            self.declare(Entity::type_parameter(type_param.name.clone()));
            for bound in &type_param.bounds {
                self.visit_type(bound);
            }
        }
        if let Some(return_type) = &method.return_type {
            self.visit_type(return_type);
        }
        for param in &method.params {
            for annotation in &param.annotations {
                self.visit_annotation(annotation)?;
            }
            self.visit_type(&param.ty);
            self.declare(Entity::local(param.name.clone()));
        }
        for thrown in &method.throws {
            self.visit_type(thrown);
        }
        if let Some(default_value) = &method.default_value {
            self.visit_expr(default_value)?;
        }
        if let Some(body) = &method.body {
            self.visit_block(body)?;
        }
        self.close_scope()
    }

    fn visit_block(&mut self, block: &Block) -> Result<()> {
        self.open_scope()?;
        for statement in &block.statements {
            self.visit_statement(statement)?;
        }
        self.close_scope()
    }

    fn visit_scoped_statement(&mut self, statement: &Statement) -> Result<()> {
        self.open_scope()?;
        self.visit_statement(statement)?;
        self.close_scope()
    }

    fn visit_statement(&mut self, statement: &Statement) -> Result<()> {
        match &statement.kind {
            StatementKind::Block(block) => self.visit_block(block),
            StatementKind::Empty => Ok(()),
            StatementKind::LocalVariable(local) => self.visit_local_variable(local),
            StatementKind::LocalType(decl) => self.visit_type_decl(decl),
            StatementKind::Expression(expression) => self.visit_expr(expression),
            StatementKind::If(if_statement) => {
                self.visit_expr(&if_statement.condition)?;
                self.visit_scoped_statement(&if_statement.then_branch)?;
                if let Some(else_branch) = &if_statement.else_branch {
                    self.visit_scoped_statement(else_branch)?;
                }
                Ok(())
            }
            StatementKind::While { condition, body } => {
                self.visit_expr(condition)?;
                self.visit_scoped_statement(body)
            }
            StatementKind::DoWhile { body, condition } => {
                self.visit_scoped_statement(body)?;
                self.visit_expr(condition)
            }
            StatementKind::For(for_statement) => {
                self.open_scope()?;
                match &for_statement.init {
                    Some(ForInit::Declaration(local)) => self.visit_local_variable(local)?,
                    Some(ForInit::Expressions(expressions)) => {
                        for expression in expressions {
                            self.visit_expr(expression)?;
                        }
                    }
                    None => {}
                }
                if let Some(condition) = &for_statement.condition {
                    self.visit_expr(condition)?;
                }
                for update in &for_statement.update {
                    self.visit_expr(update)?;
                }
                self.visit_statement(&for_statement.body)?;
                self.close_scope()
            }
            StatementKind::ForEach(for_each) => {
                self.open_scope()?;
                self.visit_type(&for_each.element_type);
                self.declare(Entity::local(for_each.element_name.clone()));
                self.visit_expr(&for_each.iterable)?;
                self.visit_statement(&for_each.body)?;
                self.close_scope()
            }
            StatementKind::Switch(switch) => {
                self.visit_expr(&switch.selector)?;
                // One scope for the whole body: a local under one label is
                // visible under the next, gone after the switch.
                self.open_scope()?;
                for section in &switch.sections {
                    for label in &section.labels {
                        if let SwitchLabel::Case(value) = label {
                            self.visit_expr(value)?;
                        }
                    }
                    for inner in &section.statements {
                        self.visit_statement(inner)?;
                    }
                }
                self.close_scope()
            }
            StatementKind::Try(try_statement) => {
                if try_statement.resources.is_empty() {
                    self.visit_block(&try_statement.body)?;
                } else {
                    // Resources bind within the try block only.
                    self.open_scope()?;
                    for resource in &try_statement.resources {
                        match resource {
                            TryResource::Declaration(local) => self.visit_local_variable(local)?,
                            TryResource::Expression(expression) => self.visit_expr(expression)?,
                        }
                    }
                    self.visit_block(&try_statement.body)?;
                    self.close_scope()?;
                }
                for catch in &try_statement.catches {
                    self.open_scope()?;
                    for ty in &catch.types {
                        self.visit_type(ty);
                    }
                    self.declare(Entity::local(catch.name.clone()));
                    self.visit_block(&catch.body)?;
                    self.close_scope()?;
                }
                if let Some(finally) = &try_statement.finally {
                    self.visit_block(finally)?;
                }
                Ok(())
            }
            StatementKind::Synchronized { lock, body } => {
                self.visit_expr(lock)?;
                self.visit_block(body)
            }
            StatementKind::Return { expression } => {
                if let Some(expression) = expression {
                    self.visit_expr(expression)?;
                }
                Ok(())
            }
            StatementKind::Throw { expression } => self.visit_expr(expression),
            StatementKind::Break { .. } | StatementKind::Continue { .. } => Ok(()),
            StatementKind::Labeled { statement, .. } => self.visit_statement(statement),
            StatementKind::Assert { condition, detail } => {
                self.visit_expr(condition)?;
                if let Some(detail) = detail {
                    self.visit_expr(detail)?;
                }
                Ok(())
            }
        }
    }

    fn visit_local_variable(&mut self, local: &LocalVariable) -> Result<()> {
        for annotation in &local.annotations {
            self.visit_annotation(annotation)?;
        }
        self.visit_type(&local.ty);
        for declarator in &local.declarators {
            self.declare(Entity::local(declarator.name.clone()));
            if let Some(initializer) = &declarator.initializer {
                self.visit_expr(initializer)?;
            }
        }
        Ok(())
    }

    fn visit_expr(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::Literal(_) => Ok(()),
            Expression::Name { name, .. } => {
                self.resolve_or_record(name);
                Ok(())
            }
            Expression::FieldAccess { base, .. } => self.visit_expr(base),
            Expression::MethodCall {
                callee,
                type_witnesses,
                args,
            } => {
                self.visit_expr(callee)?;
                for witness in type_witnesses {
                    self.visit_type(witness);
                }
                for arg in args {
                    self.visit_expr(arg)?;
                }
                Ok(())
            }
            Expression::New(new_expr) => {
                self.visit_type(&new_expr.ty);
                for arg in &new_expr.args {
                    self.visit_expr(arg)?;
                }
                if let Some(body) = &new_expr.body {
                    self.visit_anonymous_body(&new_expr.ty, body)?;
                }
                Ok(())
            }
            Expression::NewArray {
                ty,
                dims,
                initializer,
            } => {
                self.visit_type(ty);
                for dim in dims.iter().flatten() {
                    self.visit_expr(dim)?;
                }
                if let Some(values) = initializer {
                    for value in values {
                        self.visit_expr(value)?;
                    }
                }
                Ok(())
            }
            Expression::ArrayInit(values) => {
                for value in values {
                    self.visit_expr(value)?;
                }
                Ok(())
            }
            Expression::Lambda(lambda) => {
                self.open_scope()?;
                for param in &lambda.params {
                    if let Some(ty) = &param.ty {
                        self.visit_type(ty);
                    }
                    self.declare(Entity::local(param.name.clone()));
                }
                match &lambda.body {
                    LambdaBody::Expression(body) => self.visit_expr(body)?,
                    LambdaBody::Block(body) => self.visit_block(body)?,
                }
                self.close_scope()
            }
            Expression::MethodRef { qualifier, .. } => self.visit_expr(qualifier),
            Expression::Cast { ty, expr } => {
                self.visit_type(ty);
                self.visit_expr(expr)
            }
            Expression::InstanceOf { expr, ty, binding } => {
                self.visit_expr(expr)?;
                self.visit_type(ty);
                if let Some(binding) = binding {
                    self.declare(Entity::local(binding.clone()));
                }
                Ok(())
            }
            Expression::Unary { expr, .. } => self.visit_expr(expr),
            Expression::Binary { left, right, .. } => {
                self.visit_expr(left)?;
                self.visit_expr(right)
            }
            Expression::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(condition)?;
                self.visit_expr(then_branch)?;
                self.visit_expr(else_branch)
            }
            Expression::Assign { target, value, .. } => {
                self.visit_expr(target)?;
                self.visit_expr(value)
            }
            Expression::Index { base, index } => {
                self.visit_expr(base)?;
                self.visit_expr(index)
            }
            Expression::Parenthesized(inner) => self.visit_expr(inner),
            Expression::ClassLiteral(ty) => {
                self.visit_type(ty);
                Ok(())
            }
            Expression::Annotation(annotation) => self.visit_annotation(annotation),
        }
    }

    /// An anonymous class body subclasses the constructed type; its scope
    /// closes exactly like a named class's.
    fn visit_anonymous_body(&mut self, ty: &TypeExpr, members: &[Member]) -> Result<()> {
        let Some(simple) = ty.simple_name() else {
            return Ok(());
        };
        self.class_path.push(simple.to_string());
        self.open_scope()?;
        self.predeclare_members(members, &[]);
        for member in members {
            self.visit_member(member)?;
        }
        self.leave_class_body(Some(ty))?;
        self.class_path.pop();
        Ok(())
    }

    fn visit_type(&mut self, ty: &TypeExpr) {
        if let Some(head) = ty.head() {
            self.resolve_or_record(head);
        }
        for arg in &ty.type_args {
            match arg {
                TypeArg::Type(inner) => self.visit_type(inner),
                TypeArg::Wildcard { bound } => {
                    if let Some((_, inner)) = bound {
                        self.visit_type(inner);
                    }
                }
            }
        }
    }

    fn visit_annotation(&mut self, annotation: &Annotation) -> Result<()> {
        if let Some(head) = annotation.name.segments.first() {
            self.resolve_or_record(head);
        }
        for arg in &annotation.args {
            match arg {
                crate::frontend::ast::AnnotationArg::Positional(value) => self.visit_expr(value)?,
                crate::frontend::ast::AnnotationArg::Named { value, .. } => {
                    self.visit_expr(value)?;
                }
            }
        }
        Ok(())
    }
}
