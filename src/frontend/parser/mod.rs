use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

pub use crate::frontend::ast::{
    Annotation, AnnotationArg, Block, CatchClause, CompilationUnit, EnumConstant, Expression,
    FieldDecl, ForEachStatement, ForInit, ForStatement, IfStatement, ImportDecl, InitializerBlock,
    LambdaBody, LambdaExpr, LambdaParam, Literal, LocalVariable, Member, MethodDecl, Modifiers,
    NewExpr, Parameter, QualifiedName, Statement, StatementKind, SwitchLabel, SwitchSection,
    SwitchStatement, TryResource, TryStatement, TypeArg, TypeDecl, TypeExpr, TypeKind, TypeParam,
    VariableDeclarator, Visibility, WildcardBound,
};
use crate::diagnostics::{Diagnostic, DiagnosticSink, FileCache, FileId, Span};
use crate::frontend::lexer::{Keyword, LexOutput, Token, TokenKind};

// Helper macro for parser submodules: wrap new methods in `parser_impl! { ... }`
// instead of spelling out `impl Parser` everywhere.
macro_rules! parser_impl {
    ($($items:tt)*) => {
        impl Parser {
            $($items)*
        }
    };
}

mod core;
mod expressions;
mod items;
mod statements;
mod types;

/// Resulting AST and diagnostics from parsing.
#[derive(Debug)]
pub struct ParseResult {
    pub unit: CompilationUnit,
    pub file_id: FileId,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fatal parse error preventing any scan of the unit.
#[derive(Debug)]
pub struct ParseError {
    message: String,
    diagnostics: Vec<Diagnostic>,
    files: FileCache,
}

impl ParseError {
    pub fn new(message: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            message: message.into(),
            diagnostics,
            files: FileCache::default(),
        }
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn files(&self) -> &FileCache {
        &self.files
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        let mut files = FileCache::default();
        let file_id = files.add_file(path, source);
        for diagnostic in &mut self.diagnostics {
            if let Some(label) = diagnostic.primary_label.as_mut() {
                label.span = label.span.with_file(file_id);
            }
        }
        self.files = files;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for ParseError {}

/// Parse a source string into a compilation unit.
///
/// # Errors
/// Returns an error when lexical or syntactic issues prevent construction of
/// a usable unit; the scanner never receives a partial AST.
pub fn parse_unit(source: &str) -> Result<ParseResult, ParseError> {
    parse_unit_in_file(source, FileId::UNKNOWN)
}

/// Parse a compilation unit using a specific file id (for source-mapped
/// diagnostics).
pub fn parse_unit_in_file(source: &str, file_id: FileId) -> Result<ParseResult, ParseError> {
    let lex_output = crate::frontend::lexer::lex_with_file(source, file_id);
    parse_unit_from_lex(lex_output)
}

fn parse_unit_from_lex(lex_output: LexOutput) -> Result<ParseResult, ParseError> {
    let file_id = lex_output.file_id;
    let mut parser = Parser::new(lex_output);
    let unit = parser.parse_compilation_unit();
    let diagnostics = parser.finish();
    if diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity.is_error())
    {
        Err(ParseError::new(
            "encountered errors while parsing",
            diagnostics,
        ))
    } else {
        Ok(ParseResult {
            unit,
            file_id,
            diagnostics,
        })
    }
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    last_span: Option<Span>,
    diagnostics: DiagnosticSink,
}

impl Parser {
    fn new(lex_output: LexOutput) -> Self {
        let LexOutput {
            tokens,
            diagnostics,
            ..
        } = lex_output;
        let mut sink = DiagnosticSink::new("PARSE");
        for diagnostic in diagnostics {
            sink.push(diagnostic);
        }
        Self {
            tokens,
            index: 0,
            last_span: None,
            diagnostics: sink,
        }
    }

    fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics.into_vec()
    }
}

#[cfg(test)]
mod tests;
