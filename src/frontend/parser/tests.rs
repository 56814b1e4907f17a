use super::*;

fn parse_ok(source: &str) -> CompilationUnit {
    match parse_unit(source) {
        Ok(result) => result.unit,
        Err(err) => panic!("parse failed: {err}: {:?}", err.diagnostics()),
    }
}

#[test]
fn parses_package_and_imports() {
    let unit = parse_ok(
        "package com.pkg.test;\n\
         import java.util.List;\n\
         import static com.google.common.base.Preconditions.checkNotNull;\n\
         import java.util.*;\n\
         class Test {}\n",
    );
    assert_eq!(unit.package_name(), "com.pkg.test");
    assert_eq!(unit.imports.len(), 3);
    assert_eq!(unit.imports[0].simple_name(), Some("List"));
    assert!(unit.imports[1].is_static);
    assert_eq!(unit.imports[1].simple_name(), Some("checkNotNull"));
    assert!(unit.imports[2].is_wildcard);
    assert_eq!(unit.imports[2].simple_name(), None);
    assert_eq!(unit.types.len(), 1);
}

#[test]
fn parses_class_members() {
    let unit = parse_ok(
        "class Test {\n\
           private static final int LIMIT = 10;\n\
           protected String name, alias;\n\
           Test(int seed) { this.name = String.valueOf(seed); }\n\
           public int f(int a) { int b = 2; return a + b; }\n\
           static class Nested extends Test {}\n\
         }\n",
    );
    let decl = &unit.types[0];
    assert_eq!(decl.name, "Test");
    assert_eq!(decl.members.len(), 5);
    match &decl.members[0] {
        Member::Field(field) => {
            assert_eq!(field.modifiers.visibility, Visibility::Private);
            assert!(field.modifiers.is_static);
            assert_eq!(field.declarators.len(), 1);
        }
        other => panic!("expected field, found {other:?}"),
    }
    match &decl.members[1] {
        Member::Field(field) => assert_eq!(field.declarators.len(), 2),
        other => panic!("expected field, found {other:?}"),
    }
    match &decl.members[2] {
        Member::Method(method) => {
            assert!(method.is_constructor);
            assert_eq!(method.params.len(), 1);
        }
        other => panic!("expected constructor, found {other:?}"),
    }
    match &decl.members[4] {
        Member::Type(nested) => {
            assert_eq!(nested.name, "Nested");
            let superclass = nested.superclass.as_ref().expect("superclass");
            assert_eq!(superclass.simple_name(), Some("Test"));
        }
        other => panic!("expected nested type, found {other:?}"),
    }
}

#[test]
fn parses_control_flow_statements() {
    let unit = parse_ok(
        "class Test {\n\
           void f() {\n\
             for (int i = 0; i < 10; i++) { g(i); }\n\
             for (boolean d : flags) { boolean e = d; }\n\
             while (true) { int a = 2; }\n\
             do { int a = 2; } while (true);\n\
             synchronized (this) { int a = 2; }\n\
             switch (x) { case 1: int b = 2; break; default: break; }\n\
             try (Closeable r = open()) { use(r); } catch (IOException | RuntimeException e) { log(e); } finally { close(); }\n\
           }\n\
         }\n",
    );
    let Member::Method(method) = &unit.types[0].members[0] else {
        panic!("expected method");
    };
    let body = method.body.as_ref().expect("body");
    assert_eq!(body.statements.len(), 7);
    assert!(matches!(body.statements[0].kind, StatementKind::For(_)));
    assert!(matches!(body.statements[1].kind, StatementKind::ForEach(_)));
    assert!(matches!(body.statements[2].kind, StatementKind::While { .. }));
    assert!(matches!(
        body.statements[3].kind,
        StatementKind::DoWhile { .. }
    ));
    assert!(matches!(
        body.statements[4].kind,
        StatementKind::Synchronized { .. }
    ));
    match &body.statements[6].kind {
        StatementKind::Try(try_statement) => {
            assert_eq!(try_statement.resources.len(), 1);
            assert_eq!(try_statement.catches.len(), 1);
            assert_eq!(try_statement.catches[0].types.len(), 2);
            assert!(try_statement.finally.is_some());
        }
        other => panic!("expected try, found {other:?}"),
    }
}

#[test]
fn parses_generics_and_lambdas() {
    let unit = parse_ok(
        "class Test<R> {\n\
           static <T> T f(T t) { R var = null; return t; }\n\
           void g() {\n\
             BiFunction<Integer, Integer, Integer> f = (b, c) -> b + c;\n\
             Runnable r = () -> {};\n\
             Supplier<int[]> s = Test::make;\n\
           }\n\
         }\n",
    );
    let decl = &unit.types[0];
    assert_eq!(decl.type_params.len(), 1);
    let Member::Method(method) = &decl.members[0] else {
        panic!("expected method");
    };
    assert_eq!(method.type_params.len(), 1);

    let Member::Method(g) = &decl.members[1] else {
        panic!("expected method g");
    };
    let body = g.body.as_ref().expect("body");
    let StatementKind::LocalVariable(local) = &body.statements[0].kind else {
        panic!("expected local declaration");
    };
    assert_eq!(local.ty.segments, vec!["BiFunction".to_string()]);
    assert_eq!(local.ty.type_args.len(), 3);
    let initializer = local.declarators[0].initializer.as_ref().expect("init");
    assert!(matches!(initializer, Expression::Lambda(_)));
}

#[test]
fn parses_enum_and_annotation_types() {
    let unit = parse_ok(
        "enum Color {\n\
           RED(0xff0000), GREEN(0x00ff00) { void shade() {} };\n\
           private final int rgb;\n\
           Color(int rgb) { this.rgb = rgb; }\n\
           Color() { this(0); }\n\
         }\n\
         @interface Marker {\n\
           String value() default \"\";\n\
         }\n",
    );
    assert_eq!(unit.types.len(), 2);
    let color = &unit.types[0];
    assert_eq!(color.kind, TypeKind::Enum);
    assert_eq!(color.enum_constants.len(), 2);
    assert!(color.enum_constants[1].body.is_some());
    assert_eq!(color.members.len(), 3);

    let marker = &unit.types[1];
    assert_eq!(marker.kind, TypeKind::Annotation);
    let Member::Method(element) = &marker.members[0] else {
        panic!("expected annotation element");
    };
    assert!(element.default_value.is_some());
}

#[test]
fn parses_annotations_with_arguments() {
    let unit = parse_ok(
        "@Annotation(a = \"value\")\n\
         class Test {\n\
           @Function\n\
           @GwtCompatible(serializable = true, emulated = true)\n\
           public void f() { return; }\n\
         }\n",
    );
    let decl = &unit.types[0];
    assert_eq!(decl.annotations.len(), 1);
    assert_eq!(decl.annotations[0].name.to_string(), "Annotation");
    let Member::Method(method) = &decl.members[0] else {
        panic!("expected method");
    };
    assert_eq!(method.annotations.len(), 2);
    assert_eq!(method.annotations[1].args.len(), 2);
}

#[test]
fn parses_anonymous_class_creation() {
    let unit = parse_ok(
        "class Test {\n\
           Iterator<E> iterator() {\n\
             return new UnmodifiableIterator<E>() {\n\
               public boolean hasNext() { return false; }\n\
             };\n\
           }\n\
         }\n",
    );
    let Member::Method(method) = &unit.types[0].members[0] else {
        panic!("expected method");
    };
    let body = method.body.as_ref().expect("body");
    let StatementKind::Return {
        expression: Some(expression),
    } = &body.statements[0].kind
    else {
        panic!("expected return");
    };
    let Expression::New(new_expr) = expression else {
        panic!("expected creation, found {expression:?}");
    };
    assert_eq!(new_expr.ty.simple_name(), Some("UnmodifiableIterator"));
    assert_eq!(new_expr.body.as_ref().map(Vec::len), Some(1));
}

#[test]
fn distinguishes_casts_from_parenthesized_expressions() {
    let unit = parse_ok(
        "class Test {\n\
           Object f(Object[] elements, int n) {\n\
             Object a = (Object) elements[0];\n\
             int b = (n) + 1;\n\
             return (elements.length > 0) ? a : null;\n\
           }\n\
         }\n",
    );
    let Member::Method(method) = &unit.types[0].members[0] else {
        panic!("expected method");
    };
    let body = method.body.as_ref().expect("body");
    let StatementKind::LocalVariable(first) = &body.statements[0].kind else {
        panic!("expected declaration");
    };
    assert!(matches!(
        first.declarators[0].initializer,
        Some(Expression::Cast { .. })
    ));
    let StatementKind::LocalVariable(second) = &body.statements[1].kind else {
        panic!("expected declaration");
    };
    assert!(matches!(
        second.declarators[0].initializer,
        Some(Expression::Binary { .. })
    ));
}

#[test]
fn array_declarations_and_initializers() {
    let unit = parse_ok(
        "class Test {\n\
           void f() {\n\
             boolean[] c = {true, false};\n\
             int matrix[][] = new int[2][3];\n\
             Object[] elements = new Object[n + 1];\n\
           }\n\
         }\n",
    );
    let Member::Method(method) = &unit.types[0].members[0] else {
        panic!("expected method");
    };
    let body = method.body.as_ref().expect("body");
    let StatementKind::LocalVariable(first) = &body.statements[0].kind else {
        panic!("expected declaration");
    };
    assert_eq!(first.ty.array_dims, 1);
    assert!(matches!(
        first.declarators[0].initializer,
        Some(Expression::ArrayInit(_))
    ));
    let StatementKind::LocalVariable(second) = &body.statements[1].kind else {
        panic!("expected declaration");
    };
    assert_eq!(second.declarators[0].extra_dims, 2);
}

#[test]
fn parse_failure_carries_diagnostics() {
    let err = parse_unit("class {").expect_err("missing class name must fail");
    assert!(!err.diagnostics().is_empty());
    assert!(
        err.diagnostics()
            .iter()
            .any(|d| d.severity == crate::diagnostics::Severity::Error)
    );
}

#[test]
fn unterminated_literal_fails_the_parse() {
    let err = parse_unit("class Test { String s = \"oops; }").expect_err("lex error must fail");
    assert!(
        err.diagnostics()
            .iter()
            .any(|d| d.message.contains("unterminated")),
        "expected lexer diagnostic, got {:?}",
        err.diagnostics()
    );
}

#[test]
fn this_and_super_parse_as_names() {
    let unit = parse_ok(
        "class Test extends Base {\n\
           Test() { super(); }\n\
           void f() { this.g(); super.g(); }\n\
         }\n",
    );
    let Member::Method(constructor) = &unit.types[0].members[0] else {
        panic!("expected constructor");
    };
    let body = constructor.body.as_ref().expect("body");
    let StatementKind::Expression(Expression::MethodCall { callee, .. }) = &body.statements[0].kind
    else {
        panic!("expected super call");
    };
    assert!(
        matches!(&**callee, Expression::Name { name, .. } if name == "super"),
        "super() resolves through a plain name"
    );
}
