use serde::Serialize;

use super::{Diagnostic, DiagnosticCode, FileCache, LineCol, Severity, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorFormat {
    Human,
    Json,
    Short,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    pub format: ErrorFormat,
    pub color: ColorMode,
    pub is_terminal: bool,
}

impl FormatOptions {
    #[must_use]
    pub fn use_color(self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => self.is_terminal,
        }
    }
}

/// Render a collection of diagnostics to a single string.
#[must_use]
pub fn format_diagnostics(
    diagnostics: &[Diagnostic],
    files: &FileCache,
    options: FormatOptions,
) -> String {
    let mut rendered = String::new();
    let use_color = options.use_color();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if index > 0 {
            rendered.push('\n');
        }
        let chunk = match options.format {
            ErrorFormat::Human => render_human(diagnostic, files, use_color),
            ErrorFormat::Short => render_short(diagnostic, files),
            ErrorFormat::Json => render_json(diagnostic, files),
        };
        rendered.push_str(&chunk);
    }
    rendered
}

fn render_human(diagnostic: &Diagnostic, files: &FileCache, color: bool) -> String {
    let mut out = String::new();
    let (path, location) = locate_primary(diagnostic, files);
    out.push_str(&format_header(diagnostic, color));
    out.push('\n');
    out.push_str(&format_location_arrow(&path, location.as_ref()));
    if let Some(label) = diagnostic.primary_label.as_ref() {
        out.push_str(&render_snippet(label.span, &label.message, files));
    }
    for note in &diagnostic.notes {
        out.push_str(&format!("\nnote: {note}"));
    }
    out
}

fn render_short(diagnostic: &Diagnostic, files: &FileCache) -> String {
    let (path, location) = locate_primary(diagnostic, files);
    let severity = diagnostic.severity.as_str();
    let code = diagnostic
        .code
        .as_ref()
        .map(|c| c.code.as_str())
        .unwrap_or("UNKNOWN");
    let (line, column) = location
        .map(|loc| (loc.line.to_string(), loc.column.to_string()))
        .unwrap_or_else(|| ("?".into(), "?".into()));
    format!(
        "{}:{}:{}: {}[{code}]: {}",
        path, line, column, severity, diagnostic.message
    )
}

fn render_json(diagnostic: &Diagnostic, files: &FileCache) -> String {
    let primary_span = diagnostic
        .primary_label
        .as_ref()
        .and_then(|label| JsonSpan::from_span(label.span, files));
    let payload = JsonDiagnostic {
        severity: diagnostic.severity.as_str().to_string(),
        code: diagnostic.code.clone(),
        message: diagnostic.message.clone(),
        primary_span,
        notes: diagnostic.notes.clone(),
    };
    serde_json::to_string(&payload).unwrap_or_else(|_| "{}".into())
}

fn format_header(diagnostic: &Diagnostic, color: bool) -> String {
    let severity = diagnostic.severity.as_str();
    let code = diagnostic
        .code
        .as_ref()
        .map(|c| c.code.as_str())
        .unwrap_or("UNKNOWN");
    let prefix = if color {
        colorize(severity, severity_color(diagnostic.severity))
    } else {
        severity.to_string()
    };
    format!("{prefix}[{code}]: {}", diagnostic.message)
}

fn format_location_arrow(path: &str, loc: Option<&LineCol>) -> String {
    match loc {
        Some(loc) => format!("  --> {path}:{}:{}\n", loc.line, loc.column),
        None => format!("  --> {path}\n"),
    }
}

fn render_snippet(span: Span, message: &str, files: &FileCache) -> String {
    let Some(loc) = files.line_col(span.file_id, span.start) else {
        return String::new();
    };
    let Some(file) = files.get(span.file_id) else {
        return String::new();
    };
    let Some(line_text) = file.line(loc.line) else {
        return String::new();
    };
    let trimmed = line_text.trim_end_matches('\n');
    let width = (span.end.saturating_sub(span.start)).max(1);
    let mut out = String::new();
    out.push_str(&format!("   |\n{:>3}| {trimmed}\n", loc.line));
    out.push_str(&format!(
        "   | {}{}",
        " ".repeat(loc.column.saturating_sub(1)),
        "^".repeat(width.min(trimmed.len().max(1)))
    ));
    if !message.is_empty() {
        out.push(' ');
        out.push_str(message);
    }
    out.push('\n');
    out
}

fn locate_primary(diagnostic: &Diagnostic, files: &FileCache) -> (String, Option<LineCol>) {
    let Some(label) = diagnostic.primary_label.as_ref() else {
        return ("<unknown>".to_string(), None);
    };
    let path = files
        .path(label.span.file_id)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
    let loc = files.line_col(label.span.file_id, label.span.start);
    (path, loc)
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "31",
        Severity::Warning => "33",
        Severity::Note => "36",
    }
}

fn colorize(text: &str, code: &str) -> String {
    format!("\u{1b}[{code}m{text}\u{1b}[0m")
}

#[derive(Serialize)]
struct JsonDiagnostic {
    severity: String,
    code: Option<DiagnosticCode>,
    message: String,
    primary_span: Option<JsonSpan>,
    notes: Vec<String>,
}

#[derive(Serialize)]
struct JsonSpan {
    path: String,
    start: usize,
    end: usize,
    line: usize,
    column: usize,
}

impl JsonSpan {
    fn from_span(span: Span, files: &FileCache) -> Option<Self> {
        let loc = files.line_col(span.file_id, span.start)?;
        let path = files.path(span.file_id)?.display().to_string();
        Some(Self {
            path,
            start: span.start,
            end: span.end,
            line: loc.line,
            column: loc.column,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Label;

    fn sample(files: &mut FileCache) -> Diagnostic {
        let file_id = files.add_file("Test.java", "class Test {\n  int x = y;\n}\n");
        let mut diagnostic = Diagnostic::error("cannot resolve `y`", None)
            .with_code(DiagnosticCode::new("SCAN00042", Some("scan".into())));
        diagnostic.primary_label = Some(Label::new(Span::in_file(file_id, 23, 24), "undeclared"));
        diagnostic
    }

    #[test]
    fn short_format_is_single_line() {
        let mut files = FileCache::default();
        let diagnostic = sample(&mut files);
        let options = FormatOptions {
            format: ErrorFormat::Short,
            color: ColorMode::Never,
            is_terminal: false,
        };
        let rendered = format_diagnostics(&[diagnostic], &files, options);
        assert_eq!(
            rendered,
            "Test.java:2:11: error[SCAN00042]: cannot resolve `y`"
        );
    }

    #[test]
    fn human_format_includes_snippet_line() {
        let mut files = FileCache::default();
        let diagnostic = sample(&mut files);
        let options = FormatOptions {
            format: ErrorFormat::Human,
            color: ColorMode::Never,
            is_terminal: false,
        };
        let rendered = format_diagnostics(&[diagnostic], &files, options);
        assert!(rendered.contains("error[SCAN00042]: cannot resolve `y`"));
        assert!(rendered.contains("--> Test.java:2:11"));
        assert!(rendered.contains("int x = y;"));
    }

    #[test]
    fn json_format_is_parseable() {
        let mut files = FileCache::default();
        let diagnostic = sample(&mut files);
        let options = FormatOptions {
            format: ErrorFormat::Json,
            color: ColorMode::Never,
            is_terminal: false,
        };
        let rendered = format_diagnostics(&[diagnostic], &files, options);
        let value: serde_json::Value =
            serde_json::from_str(&rendered).expect("json diagnostics parse");
        assert_eq!(value["severity"], "error");
        assert_eq!(value["primary_span"]["line"], 2);
    }
}
