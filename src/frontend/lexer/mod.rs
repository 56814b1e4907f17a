use crate::diagnostics::{Diagnostic, FileId, Span};

mod state;

pub use keyword::Keyword;
pub use token::{Token, TokenKind};

mod keyword {
    use super::TokenKind;

    /// Reserved words recognised by the lexer.
    ///
    /// `this` and `super` are deliberately absent: they lex as plain
    /// identifiers so the scanner can surface them in its unresolved set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Keyword {
        Abstract,
        Assert,
        Boolean,
        Break,
        Byte,
        Case,
        Catch,
        Char,
        Class,
        Const,
        Continue,
        Default,
        Do,
        Double,
        Else,
        Enum,
        Extends,
        False,
        Final,
        Finally,
        Float,
        For,
        Goto,
        If,
        Implements,
        Import,
        Instanceof,
        Int,
        Interface,
        Long,
        Native,
        New,
        Null,
        Package,
        Private,
        Protected,
        Public,
        Return,
        Short,
        Static,
        Strictfp,
        Switch,
        Synchronized,
        Throw,
        Throws,
        Transient,
        True,
        Try,
        Void,
        Volatile,
        While,
    }

    impl Keyword {
        #[must_use]
        pub fn from_ident(ident: &str) -> Option<Self> {
            KEYWORDS
                .iter()
                .find_map(|(name, keyword)| (*name == ident).then_some(*keyword))
        }

        pub fn token_kind(self) -> TokenKind {
            TokenKind::Keyword(self)
        }

        /// True for the primitive type names (including `void`).
        #[must_use]
        pub fn is_primitive_type(self) -> bool {
            matches!(
                self,
                Keyword::Boolean
                    | Keyword::Byte
                    | Keyword::Char
                    | Keyword::Double
                    | Keyword::Float
                    | Keyword::Int
                    | Keyword::Long
                    | Keyword::Short
                    | Keyword::Void
            )
        }

        /// True for declaration modifiers (`public`, `static`, ...).
        #[must_use]
        pub fn is_modifier(self) -> bool {
            matches!(
                self,
                Keyword::Abstract
                    | Keyword::Final
                    | Keyword::Native
                    | Keyword::Private
                    | Keyword::Protected
                    | Keyword::Public
                    | Keyword::Static
                    | Keyword::Strictfp
                    | Keyword::Synchronized
                    | Keyword::Transient
                    | Keyword::Volatile
                    | Keyword::Default
            )
        }
    }

    const KEYWORDS: &[(&str, Keyword)] = &[
        ("abstract", Keyword::Abstract),
        ("assert", Keyword::Assert),
        ("boolean", Keyword::Boolean),
        ("break", Keyword::Break),
        ("byte", Keyword::Byte),
        ("case", Keyword::Case),
        ("catch", Keyword::Catch),
        ("char", Keyword::Char),
        ("class", Keyword::Class),
        ("const", Keyword::Const),
        ("continue", Keyword::Continue),
        ("default", Keyword::Default),
        ("do", Keyword::Do),
        ("double", Keyword::Double),
        ("else", Keyword::Else),
        ("enum", Keyword::Enum),
        ("extends", Keyword::Extends),
        ("false", Keyword::False),
        ("final", Keyword::Final),
        ("finally", Keyword::Finally),
        ("float", Keyword::Float),
        ("for", Keyword::For),
        ("goto", Keyword::Goto),
        ("if", Keyword::If),
        ("implements", Keyword::Implements),
        ("import", Keyword::Import),
        ("instanceof", Keyword::Instanceof),
        ("int", Keyword::Int),
        ("interface", Keyword::Interface),
        ("long", Keyword::Long),
        ("native", Keyword::Native),
        ("new", Keyword::New),
        ("null", Keyword::Null),
        ("package", Keyword::Package),
        ("private", Keyword::Private),
        ("protected", Keyword::Protected),
        ("public", Keyword::Public),
        ("return", Keyword::Return),
        ("short", Keyword::Short),
        ("static", Keyword::Static),
        ("strictfp", Keyword::Strictfp),
        ("switch", Keyword::Switch),
        ("synchronized", Keyword::Synchronized),
        ("throw", Keyword::Throw),
        ("throws", Keyword::Throws),
        ("transient", Keyword::Transient),
        ("true", Keyword::True),
        ("try", Keyword::Try),
        ("void", Keyword::Void),
        ("volatile", Keyword::Volatile),
        ("while", Keyword::While),
    ];
}

mod token {
    use super::keyword::Keyword;

    /// Token emitted by the lexer.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Token {
        pub kind: TokenKind,
        pub lexeme: String,
        pub span: super::Span,
    }

    /// Token categories understood by the parser.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum TokenKind {
        Identifier,
        NumberLiteral,
        StringLiteral,
        CharLiteral,
        Keyword(Keyword),
        Punctuation(char),
        Operator(&'static str),
        Unknown(char),
    }
}

/// Result of lexing a source string.
#[derive(Debug, Default)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
    pub file_id: FileId,
}

/// Lex an entire source string.
#[must_use]
pub fn lex(source: &str) -> LexOutput {
    state::run(source)
}

/// Lex an entire source string with a known file id.
#[must_use]
pub fn lex_with_file(source: &str, file_id: FileId) -> LexOutput {
    state::run_with_file(source, file_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_identifier_sequence() {
        let output = lex("alpha beta");
        let idents: Vec<_> = output
            .tokens
            .iter()
            .filter(|token| matches!(token.kind, TokenKind::Identifier))
            .collect();
        assert_eq!(idents.len(), 2);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn this_and_super_lex_as_identifiers() {
        let output = lex("this super");
        assert!(
            output
                .tokens
                .iter()
                .all(|token| matches!(token.kind, TokenKind::Identifier)),
            "this/super must stay identifiers, got {:?}",
            output.tokens
        );
    }

    #[test]
    fn primitive_names_are_keywords() {
        assert_eq!(
            kinds("int boolean void"),
            vec![
                TokenKind::Keyword(Keyword::Int),
                TokenKind::Keyword(Keyword::Boolean),
                TokenKind::Keyword(Keyword::Void),
            ]
        );
    }

    #[test]
    fn dollar_and_underscore_are_identifier_characters() {
        let output = lex("$value _private x$1");
        let idents: Vec<_> = output
            .tokens
            .iter()
            .map(|token| token.lexeme.as_str())
            .collect();
        assert_eq!(idents, ["$value", "_private", "x$1"]);
    }

    #[test]
    fn comments_are_trivia() {
        let output = lex("a // line\n/* block\n still */ b /** doc */ c");
        let idents: Vec<_> = output
            .tokens
            .iter()
            .map(|token| token.lexeme.as_str())
            .collect();
        assert_eq!(idents, ["a", "b", "c"]);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn closing_angle_brackets_lex_individually() {
        let output = lex("Map<String, List<Integer>> m");
        let closers = output
            .tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Operator(">"))
            .count();
        assert_eq!(closers, 2, "no shift token inside generics");
    }

    #[test]
    fn shift_assign_still_reachable_via_adjacency() {
        let output = lex("x >>= 2");
        let kinds: Vec<_> = output.tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Operator(">"),
                TokenKind::Operator(">="),
                TokenKind::NumberLiteral,
            ]
        );
    }

    #[test]
    fn string_and_char_literals() {
        let output = lex(r#"String s = "a \"quoted\" value"; char c = '\n';"#);
        assert!(
            output
                .tokens
                .iter()
                .any(|t| t.kind == TokenKind::StringLiteral)
        );
        assert!(
            output
                .tokens
                .iter()
                .any(|t| t.kind == TokenKind::CharLiteral)
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn unterminated_string_reports_diagnostic() {
        let output = lex("String s = \"oops");
        assert!(
            output
                .diagnostics
                .iter()
                .any(|d| d.message.contains("unterminated string")),
            "expected unterminated string diagnostic, got {:?}",
            output.diagnostics
        );
    }

    #[test]
    fn number_literal_forms() {
        let output = lex("0 10 0x1F 0b101 1_000 3.14 1e10 2.5f 7L 0.7d");
        let numbers = output
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::NumberLiteral)
            .count();
        assert_eq!(numbers, 10);
    }

    #[test]
    fn ellipsis_and_method_reference_operators() {
        let output = lex("f(int... args) { this::get; }");
        assert!(
            output
                .tokens
                .iter()
                .any(|t| t.kind == TokenKind::Operator("..."))
        );
        assert!(
            output
                .tokens
                .iter()
                .any(|t| t.kind == TokenKind::Operator("::"))
        );
    }
}
