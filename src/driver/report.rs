use std::fmt;
use std::path::PathBuf;

use crate::diagnostics::Diagnostic;

/// One import declaration the driver adds or removes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImportLine {
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
}

impl ImportLine {
    #[must_use]
    pub fn single(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_static: false,
            is_wildcard: false,
        }
    }
}

impl fmt::Display for ImportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import ")?;
        if self.is_static {
            write!(f, "static ")?;
        }
        write!(f, "{}", self.path)?;
        if self.is_wildcard {
            write!(f, ".*")?;
        }
        write!(f, ";")
    }
}

/// Outcome of fixing one file's imports.
#[derive(Debug)]
pub struct FixReport {
    pub file: PathBuf,
    /// Imports the file needs but does not declare.
    pub added: Vec<ImportLine>,
    /// Declared single-type imports nothing references.
    pub removed: Vec<ImportLine>,
    /// Unresolved identifiers with no known candidate anywhere.
    pub unresolvable: Vec<String>,
    /// The source with its import block rewritten.
    pub rewritten: String,
    /// Environment problems encountered along the way.
    pub diagnostics: Vec<Diagnostic>,
}

impl FixReport {
    /// True when the file's imports already match its references.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// One-line summary for logs and the `check` command.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: +{} -{} imports, {} unresolvable",
            self.file.display(),
            self.added.len(),
            self.removed.len(),
            self.unresolvable.len()
        )
    }
}
