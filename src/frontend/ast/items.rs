use std::fmt;

use super::expressions::{Block, Expression, VariableDeclarator};
use super::types::TypeExpr;
use crate::diagnostics::Span;

/// One parsed source file: package declaration, imports, and types.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub package: Option<QualifiedName>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

impl CompilationUnit {
    /// The package name as dotted text, empty for the default package.
    #[must_use]
    pub fn package_name(&self) -> String {
        self.package
            .as_ref()
            .map(QualifiedName::to_string)
            .unwrap_or_default()
    }
}

/// Dotted name as written in source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifiedName {
    pub segments: Vec<String>,
    pub span: Option<Span>,
}

impl QualifiedName {
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self {
            segments,
            span: None,
        }
    }

    #[must_use]
    pub fn simple_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// `import a.b.C;`, `import static a.b.C.d;`, `import a.b.*;`
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: QualifiedName,
    pub is_static: bool,
    pub is_wildcard: bool,
    pub span: Option<Span>,
}

impl ImportDecl {
    /// The simple name an import binds, absent for wildcards.
    #[must_use]
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_wildcard {
            None
        } else {
            self.path.simple_name()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

/// Class, interface, enum, or annotation type declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    pub superclass: Option<TypeExpr>,
    pub interfaces: Vec<TypeExpr>,
    pub enum_constants: Vec<EnumConstant>,
    pub members: Vec<Member>,
    pub span: Option<Span>,
}

#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub args: Vec<Expression>,
    pub body: Option<Vec<Member>>,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Type(TypeDecl),
    Initializer(InitializerBlock),
}

#[derive(Debug, Clone)]
pub struct InitializerBlock {
    pub is_static: bool,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub ty: TypeExpr,
    pub declarators: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    /// Absent for constructors.
    pub return_type: Option<TypeExpr>,
    pub name: String,
    pub params: Vec<Parameter>,
    pub throws: Vec<TypeExpr>,
    pub body: Option<Block>,
    pub is_constructor: bool,
    /// `default` value of an annotation type element.
    pub default_value: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub annotations: Vec<Annotation>,
    pub ty: TypeExpr,
    pub name: String,
    pub is_varargs: bool,
}

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub name: String,
    pub bounds: Vec<TypeExpr>,
}

/// Declared visibility, package-private being the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

impl Visibility {
    /// Members below this visibility are hidden from subclasses.
    #[must_use]
    pub fn visible_to_subclasses(self) -> bool {
        !matches!(self, Visibility::Private)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

/// `@Name` or `@Name(args)`.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub name: QualifiedName,
    pub args: Vec<AnnotationArg>,
}

#[derive(Debug, Clone)]
pub enum AnnotationArg {
    Positional(Expression),
    Named { name: String, value: Expression },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_simple_name_skips_wildcards() {
        let single = ImportDecl {
            path: QualifiedName::new(vec!["java".into(), "util".into(), "List".into()]),
            is_static: false,
            is_wildcard: false,
            span: None,
        };
        assert_eq!(single.simple_name(), Some("List"));

        let wildcard = ImportDecl {
            path: QualifiedName::new(vec!["java".into(), "util".into()]),
            is_static: false,
            is_wildcard: true,
            span: None,
        };
        assert_eq!(wildcard.simple_name(), None);
    }

    #[test]
    fn visibility_hides_private_members_only() {
        assert!(Visibility::Public.visible_to_subclasses());
        assert!(Visibility::Protected.visible_to_subclasses());
        assert!(Visibility::Package.visible_to_subclasses());
        assert!(!Visibility::Private.visible_to_subclasses());
    }
}
